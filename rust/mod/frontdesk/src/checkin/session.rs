use futures::{Stream, StreamExt};
use tracing::debug;

use super::{CheckInVerifier, VerificationOutcome};

/// A scanning session: drains a scanner's payload stream through the
/// verifier, strictly one payload at a time.
pub struct ScanSession<'a> {
    verifier: &'a CheckInVerifier,
}

impl<'a> ScanSession<'a> {
    pub fn new(verifier: &'a CheckInVerifier) -> Self {
        Self { verifier }
    }

    /// Run until the input ends. The next payload is not pulled until the
    /// previous outcome has been handed to `sink`.
    ///
    /// Returns the number of payloads verified (blank ones are skipped).
    pub async fn run<S, F>(&self, mut input: S, mut sink: F) -> usize
    where
        S: Stream<Item = String> + Unpin,
        F: FnMut(&str, VerificationOutcome),
    {
        let mut processed = 0;
        while let Some(raw) = input.next().await {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let outcome = self.verifier.verify_outcome(raw).await;
            processed += 1;
            debug!("scan #{} -> ok={}", processed, outcome.ok);
            sink(raw, outcome);
        }
        processed
    }
}
