//! Fetcher test utilities

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use update_siren::check::error::FetchError;
use update_siren::check::fetcher::Fetcher;

enum Response {
    Body(String),
    NoData,
    InvalidUrl,
}

/// Fetcher that returns a canned response and counts calls
pub struct StubFetcher {
    response: Mutex<Response>,
    calls: AtomicUsize,
}

impl StubFetcher {
    fn with_response(response: Response) -> Self {
        Self {
            response: Mutex::new(response),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn body(body: &str) -> Self {
        Self::with_response(Response::Body(body.to_string()))
    }

    pub fn no_data() -> Self {
        Self::with_response(Response::NoData)
    }

    pub fn failing() -> Self {
        Self::with_response(Response::InvalidUrl)
    }

    /// Replace the body returned by later fetches
    pub fn set_body(&self, body: &str) {
        *self.response.lock().unwrap() = Response::Body(body.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &*self.response.lock().unwrap() {
            Response::Body(body) => Ok(Some(body.clone())),
            Response::NoData => Ok(None),
            Response::InvalidUrl => Err(FetchError::InvalidUrl(url.to_string())),
        }
    }
}
