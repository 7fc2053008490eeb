//! Host channel handle
//!
//! Pages never talk to the hosting chat application directly. They hold a
//! `HostHandle`, which serializes a typed `HostPayload` once and forwards
//! the JSON string to whatever implementation the embedder provides.
//! Delivery is fire-and-forget: no acknowledgment is awaited.

use crate::errors::AppError;
use crate::payload::HostPayload;
use std::sync::Arc;

/// Handle for the outbound host channel
#[derive(Clone)]
pub struct HostHandle {
    inner: Arc<dyn HostChannelImpl>,
}

impl HostHandle {
    /// Create a new HostHandle with the given implementation
    pub fn new(inner: Arc<dyn HostChannelImpl>) -> Self {
        Self { inner }
    }

    /// Serialize and hand a payload to the host
    pub fn send(&self, payload: &HostPayload) -> Result<(), AppError> {
        let data = payload.to_json()?;
        self.inner.send_data(&data)
    }
}

impl std::fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandle").finish_non_exhaustive()
    }
}

/// Trait for host channel implementation (to be implemented by the embedder)
pub trait HostChannelImpl: Send + Sync {
    /// Deliver one JSON-encoded payload
    fn send_data(&self, data: &str) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Capture(Mutex<Vec<String>>);

    impl HostChannelImpl for Capture {
        fn send_data(&self, data: &str) -> Result<(), AppError> {
            self.0
                .lock()
                .map_err(|e| AppError::HostChannel(e.to_string()))?
                .push(data.to_string());
            Ok(())
        }
    }

    struct Refuse;

    impl HostChannelImpl for Refuse {
        fn send_data(&self, _data: &str) -> Result<(), AppError> {
            Err(AppError::HostChannel("closed".to_string()))
        }
    }

    #[test]
    fn test_send_serializes_once() {
        let capture = Arc::new(Capture(Mutex::new(Vec::new())));
        let handle = HostHandle::new(Arc::clone(&capture) as Arc<dyn HostChannelImpl>);

        handle
            .send(&HostPayload::ShareInstitution {
                id: 1,
                name: "a".to_string(),
            })
            .unwrap();

        let sent = capture.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], r#"{"action":"share_institution","id":1,"name":"a"}"#);
    }

    #[test]
    fn test_send_propagates_channel_errors() {
        let handle = HostHandle::new(Arc::new(Refuse));
        let result = handle.send(&HostPayload::ShareInstitution {
            id: 1,
            name: "a".to_string(),
        });
        assert!(matches!(result, Err(AppError::HostChannel(_))));
    }
}
