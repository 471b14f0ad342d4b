use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reservation status.
///
/// Only `Confirmed → CheckedIn` and `Pending | Confirmed → Cancelled` are
/// performed here; confirming a pending booking happens elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReservationStatus {
    Pending,
    /// Also the reading of records written before statuses existed.
    #[default]
    Confirmed,
    Cancelled,
    CheckedIn,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::CheckedIn => "checked-in",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "checked-in" => Ok(ReservationStatus::CheckedIn),
            other => Err(format!("unknown reservation status '{}'", other)),
        }
    }
}

/// QR metadata written when the reservation's code is issued.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QrData {
    /// Canonical location of the verification code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The booked room or cottage, denormalized onto the reservation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    /// Numeric in older records, string in newer ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Reservation — one guest booking.
///
/// `id` is the storage key; `reservation_id` is the business identifier
/// printed in the guest's QR code.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Storage-assigned record key.
    #[serde(default)]
    pub id: String,

    /// Business identifier, unique among stored reservations.
    pub reservation_id: String,

    #[serde(default)]
    pub status: ReservationStatus,

    /// Mirror of `status == checked-in` kept for older readers.
    #[serde(default)]
    pub checked_in: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_data: Option<QrData>,

    /// Legacy flat copy of the verification code. Read, never written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_verification_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_full_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guests: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_period: Option<String>,

    #[serde(default)]
    pub is_whole_resort: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Fields this service does not model; preserved on every write.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reserves a business id for one record. Stored under the business id,
/// so a second reservation with the same id cannot be inserted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessIdClaim {
    pub reservation_id: String,
    pub record_id: String,
}

impl Reservation {
    /// The stored verification code: nested field first, then the legacy
    /// flat field. Empty strings count as absent.
    pub fn stored_verification_code(&self) -> Option<&str> {
        let nested = self
            .qr_data
            .as_ref()
            .and_then(|q| q.verification_code.as_deref())
            .filter(|c| !c.is_empty());
        nested.or_else(|| {
            self.qr_verification_code
                .as_deref()
                .filter(|c| !c.is_empty())
        })
    }

    /// True if either the status or the legacy flag says checked in.
    pub fn is_checked_in(&self) -> bool {
        self.status == ReservationStatus::CheckedIn || self.checked_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ReservationStatus::CheckedIn).unwrap(),
            "\"checked-in\""
        );
        assert_eq!(
            "checked-in".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::CheckedIn
        );
        assert!("arrived".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn decodes_console_document() {
        let doc = serde_json::json!({
            "id": "doc1",
            "reservationId": "R-1001",
            "status": "confirmed",
            "qrData": {"verificationCode": "AB12CD", "generatedAt": "2024-05-01"},
            "userFullName": "Ana Cruz",
            "guests": 4,
            "room": {"id": 22, "name": "Whole Resort", "type": "whole_resort"},
            "totalAmount": 12500.0,
            "promoCode": "SUMMER"
        });
        let r: Reservation = serde_json::from_value(doc).unwrap();
        assert_eq!(r.reservation_id, "R-1001");
        assert_eq!(r.stored_verification_code(), Some("AB12CD"));
        assert_eq!(r.room.as_ref().unwrap().id, Some(serde_json::json!(22)));
        assert_eq!(r.extra.get("promoCode"), Some(&serde_json::json!("SUMMER")));

        // Unknown fields survive a write.
        let back = serde_json::to_value(&r).unwrap();
        assert_eq!(back["promoCode"], "SUMMER");
        assert_eq!(back["qrData"]["generatedAt"], "2024-05-01");
    }

    #[test]
    fn missing_status_reads_as_confirmed() {
        let r: Reservation = serde_json::from_str(r#"{"reservationId":"R-1"}"#).unwrap();
        assert_eq!(r.status, ReservationStatus::Confirmed);
        assert!(!r.is_checked_in());
    }

    #[test]
    fn code_resolution_prefers_nested() {
        let mut r = Reservation {
            qr_verification_code: Some("LEGACY".into()),
            ..Default::default()
        };
        assert_eq!(r.stored_verification_code(), Some("LEGACY"));

        r.qr_data = Some(QrData {
            verification_code: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(r.stored_verification_code(), Some("LEGACY"));

        r.qr_data = Some(QrData {
            verification_code: Some("NESTED".into()),
            ..Default::default()
        });
        assert_eq!(r.stored_verification_code(), Some("NESTED"));

        r.qr_data = None;
        r.qr_verification_code = Some(String::new());
        assert_eq!(r.stored_verification_code(), None);
    }

    #[test]
    fn checked_in_flag_alone_counts() {
        let r = Reservation {
            status: ReservationStatus::Confirmed,
            checked_in: true,
            ..Default::default()
        };
        assert!(r.is_checked_in());
    }
}
