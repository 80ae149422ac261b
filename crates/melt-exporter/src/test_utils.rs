//! Utilities/mocks for testing.

use std::{
    io,
    sync::{Arc, Mutex},
};

use reqwest::header::{HeaderMap, HeaderValue};
use tracing_subscriber::fmt::MakeWriter;

use crate::{
    transport::{HttpPost, HttpStatusError, PostOptions, TRACE_RESPONSE_HEADER},
    Error,
};

/// A post the mock received.
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub path: String,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

/// Mock for the ingestion endpoint.
pub struct MockHttpPost {
    pub calls: Mutex<Vec<RecordedPost>>,
    /// When set, every post fails with this status.
    pub fail_with_status: Option<u16>,
    pub response_headers: HeaderMap,
}

impl MockHttpPost {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_with_status: None,
            response_headers: HeaderMap::new(),
        }
    }

    pub fn failing(status_code: u16) -> Self {
        Self {
            fail_with_status: Some(status_code),
            ..Self::new()
        }
    }

    pub fn with_trace_response(mut self, value: &'static str) -> Self {
        self.response_headers
            .append(TRACE_RESPONSE_HEADER, HeaderValue::from_static(value));
        self
    }

    pub fn calls(&self) -> Vec<RecordedPost> {
        self.calls
            .lock()
            .expect("Lock should not be poisoned")
            .clone()
    }
}

impl HttpPost for MockHttpPost {
    async fn post(
        &self,
        path: &str,
        body: Vec<u8>,
        options: &mut PostOptions,
    ) -> Result<(), Error> {
        self.calls
            .lock()
            .expect("Lock should not be poisoned")
            .push(RecordedPost {
                path: path.to_owned(),
                body,
                headers: options.headers.clone(),
            });
        if let Some(status_code) = self.fail_with_status {
            return Err(HttpStatusError {
                status_code,
                body: "intentional failure".to_owned(),
            }
            .into());
        }
        options.response_headers = self.response_headers.clone();
        Ok(())
    }
}

/// Collects formatted `tracing` output for the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Routes this thread's events into the capture until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("Lock should not be poisoned")).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("Lock should not be poisoned")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
