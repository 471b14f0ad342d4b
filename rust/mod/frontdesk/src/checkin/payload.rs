use serde_json::Value;

use super::outcome::CheckInError;

/// Decoded QR payload: `{"reservationId": "...", "verificationCode": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPayload {
    pub reservation_id: String,
    pub verification_code: String,
}

impl ScanPayload {
    /// Parse raw scanner text. Any valid JSON passes the first gate; the
    /// two fields must then be present, strings, and non-empty.
    pub fn parse(raw: &str) -> Result<Self, CheckInError> {
        let value: Value = serde_json::from_str(raw).map_err(|_| CheckInError::InvalidFormat)?;

        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match (field("reservationId"), field("verificationCode")) {
            (Some(reservation_id), Some(verification_code)) => Ok(Self {
                reservation_id,
                verification_code,
            }),
            _ => Err(CheckInError::MissingFields),
        }
    }

    /// The payload text a QR code for this reservation should carry.
    pub fn encode(&self) -> String {
        serde_json::json!({
            "reservationId": self.reservation_id,
            "verificationCode": self.verification_code,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_payload() {
        let p = ScanPayload::parse(r#"{"reservationId":"R-1001","verificationCode":"AB12CD","v":2}"#)
            .unwrap();
        assert_eq!(p.reservation_id, "R-1001");
        assert_eq!(p.verification_code, "AB12CD");
        assert_eq!(ScanPayload::parse(&p.encode()).unwrap(), p);
    }

    #[test]
    fn non_json_is_invalid_format() {
        for raw in ["", "R-1001", "{reservationId: R-1001}", "https://resort.test/r/1"] {
            assert!(matches!(ScanPayload::parse(raw), Err(CheckInError::InvalidFormat)), "{raw}");
        }
    }

    #[test]
    fn json_without_fields_is_missing_fields() {
        for raw in [
            "null",
            "42",
            "[]",
            r#"{"reservationId":"R-1001"}"#,
            r#"{"reservationId":"","verificationCode":"AB12CD"}"#,
            r#"{"reservationId":1001,"verificationCode":"AB12CD"}"#,
        ] {
            assert!(matches!(ScanPayload::parse(raw), Err(CheckInError::MissingFields)), "{raw}");
        }
    }
}
