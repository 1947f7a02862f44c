//! Test doubles shared by the unit tests.

use std::future::Future;
use std::pin::Pin;

use flux_telegram::{ChatTransport, TransportError};
use parking_lot::Mutex;

/// Records every message and optionally fails.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(i64, String)>>,
    failure: Mutex<Option<TransportError>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later send fail with a clone of `error`.
    pub fn fail_with(&self, error: TransportError) {
        *self.failure.lock() = Some(error);
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().clone()
    }
}

fn clone_error(error: &TransportError) -> TransportError {
    match error {
        TransportError::Api { code, description } => TransportError::Api {
            code: *code,
            description: description.clone(),
        },
        other => TransportError::Request(other.to_string()),
    }
}

impl ChatTransport for RecordingTransport {
    fn send_message<'a>(
        &'a self,
        chat_id: i64,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = flux_telegram::Result<()>> + Send + 'a>> {
        let result = match self.failure.lock().as_ref() {
            Some(error) => Err(clone_error(error)),
            None => {
                self.sent.lock().push((chat_id, text.to_string()));
                Ok(())
            }
        };
        Box::pin(async move { result })
    }
}
