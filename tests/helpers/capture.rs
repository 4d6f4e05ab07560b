use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::Dispatch;

use crate::logging::Diagnostics;

/// Log lines emitted through a [`Diagnostics`] handle built by [`capture`].
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }
}

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn capture() -> (Diagnostics, CapturedLogs) {
    let logs = CapturedLogs::default();
    let buf = Arc::clone(&logs.buf);
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || CaptureWriter(Arc::clone(&buf)))
        .finish();
    (Diagnostics::new(Dispatch::new(subscriber)), logs)
}
