//! `resortd scan`: a terminal scanning session. Each stdin line is one
//! scanned payload; each outcome is printed as one JSON line.

use futures::stream;
use frontdesk::checkin::{CheckInVerifier, ScanSession, VerificationOutcome};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{info, warn};

pub async fn run<R>(verifier: &CheckInVerifier, input: R) -> anyhow::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let lines = BufReader::new(input).lines();
    let payloads = Box::pin(stream::unfold(lines, |mut lines| async move {
        match lines.next_line().await {
            Ok(Some(line)) => Some((line, lines)),
            Ok(None) => None,
            Err(e) => {
                warn!("scanner input closed: {}", e);
                None
            }
        }
    }));

    let count = ScanSession::new(verifier)
        .run(payloads, |_, outcome| println!("{}", render(&outcome)))
        .await;
    info!("scan session ended after {} payload(s)", count);
    Ok(count)
}

fn render(outcome: &VerificationOutcome) -> String {
    serde_json::to_string(outcome)
        .unwrap_or_else(|e| format!(r#"{{"ok":false,"message":"unrenderable outcome: {}"}}"#, e))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use frontdesk::checkin::{OutcomeKind, RetryPolicy};
    use frontdesk::model::{QrData, Reservation};
    use frontdesk::service::{FrontDeskConfig, FrontDeskService};

    use super::*;

    #[tokio::test]
    async fn reads_one_payload_per_line() {
        let kv: Arc<dyn resort_kv::KVStore> = Arc::new(resort_kv::MemoryStore::new());
        let service = FrontDeskService::new(
            kv,
            FrontDeskConfig {
                retry: RetryPolicy { attempts: 1, delay: Duration::ZERO },
                ..Default::default()
            },
        );
        service
            .create_reservation(Reservation {
                id: "doc1".into(),
                reservation_id: "R-1001".into(),
                qr_data: Some(QrData {
                    verification_code: Some("AB12CD".into()),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .unwrap();

        let input = concat!(
            r#"{"reservationId":"R-1001","verificationCode":"AB12CD"}"#,
            "\n\n",
            r#"{"reservationId":"R-1001","verificationCode":"AB12CD"}"#,
            "\n"
        );
        let count = run(service.verifier(), input.as_bytes()).await.unwrap();
        assert_eq!(count, 2);
        assert!(service.get_reservation("doc1").unwrap().is_checked_in());
    }

    #[test]
    fn render_failure_shape() {
        let outcome = VerificationOutcome::from(Err(frontdesk::checkin::CheckInError::NotFound));
        let line = render(&outcome);
        assert!(line.contains("\"kind\":\"NotFound\""));
        assert_eq!(outcome.kind, Some(OutcomeKind::NotFound));
    }
}
