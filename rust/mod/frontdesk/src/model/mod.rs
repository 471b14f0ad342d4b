pub mod accommodation;
pub mod account;
pub mod reservation;

pub use accommodation::{Accommodation, AccommodationStatus, AccommodationType};
pub use account::{Account, AccountRole};
pub use reservation::{BusinessIdClaim, QrData, Reservation, ReservationStatus, RoomRef};
