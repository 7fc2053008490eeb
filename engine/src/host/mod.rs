//! Host channel implementations
//!
//! - [`MemoryHost`] keeps every payload in memory; the bot inbox and the
//!   tests read them back.
//! - [`WriterHost`] writes one JSON line per payload, which is how the CLI
//!   hands payloads to whatever process is driving it.

use sdk::errors::AppError;
use sdk::host::{HostChannelImpl, HostHandle};
use sdk::payload::HostPayload;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Host channel recording payloads in memory
#[derive(Debug, Default)]
pub struct MemoryHost {
    sent: Mutex<Vec<String>>,
}

impl MemoryHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Wrap a shared MemoryHost in a handle usable by the pages
    pub fn handle(self: &Arc<Self>) -> HostHandle {
        HostHandle::new(Arc::clone(self) as Arc<dyn HostChannelImpl>)
    }

    /// Raw JSON strings, in send order
    pub fn raw(&self) -> Vec<String> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// Decoded payloads, in send order
    pub fn payloads(&self) -> Result<Vec<HostPayload>, AppError> {
        self.raw()
            .iter()
            .map(|data| HostPayload::from_json(data))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HostChannelImpl for MemoryHost {
    fn send_data(&self, data: &str) -> Result<(), AppError> {
        self.sent
            .lock()
            .map_err(|e| AppError::HostChannel(format!("host buffer poisoned: {}", e)))?
            .push(data.to_string());
        Ok(())
    }
}

/// Host channel writing newline-delimited JSON
pub struct WriterHost<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterHost<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> Result<W, AppError> {
        self.writer
            .into_inner()
            .map_err(|e| AppError::HostChannel(format!("writer poisoned: {}", e)))
    }
}

impl WriterHost<std::io::Stdout> {
    /// Host channel on standard output
    pub fn stdout() -> HostHandle {
        HostHandle::new(Arc::new(Self::new(std::io::stdout())))
    }
}

impl<W: Write + Send> HostChannelImpl for WriterHost<W> {
    fn send_data(&self, data: &str) -> Result<(), AppError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| AppError::HostChannel(format!("writer poisoned: {}", e)))?;
        writeln!(writer, "{}", data)?;
        writer.flush()?;
        info!("Payload handed to host ({} bytes)", data.len());
        Ok(())
    }
}
