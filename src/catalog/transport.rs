// HTTP transport for catalog requests. The client builds fully-formed URLs
// and hands them here; this layer only performs the GET, checks the status
// and returns the raw body.

use super::CatalogError;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("neteflix-cli/", env!("CARGO_PKG_VERSION"));

/// Performs a GET and returns the body of a successful response.
#[cfg_attr(test, mockall::automock)]
pub trait CatalogTransport {
    fn get(&self, url: &Url) -> Result<Vec<u8>, CatalogError>;
}

/// Blocking reqwest transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(map_transport_error)?;
        Ok(Self { client })
    }
}

impl CatalogTransport for HttpTransport {
    fn get(&self, url: &Url) -> Result<Vec<u8>, CatalogError> {
        let res = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .map_err(map_transport_error)?;

        let status = res.status();
        let body = res.bytes().map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        Ok(body.to_vec())
    }
}

fn map_transport_error(error: reqwest::Error) -> CatalogError {
    // reqwest includes the request URL in its message, and our URLs carry
    // the api key.
    let error = error.without_url();
    if error.is_timeout() {
        CatalogError::Timeout(error.to_string())
    } else {
        CatalogError::Transport(error.to_string())
    }
}

pub(crate) fn map_status_error(status: StatusCode, body: &[u8]) -> CatalogError {
    CatalogError::Status {
        status: status.as_u16(),
        body: body_preview(body),
    }
}

/// The catalog reports failures as `{"status_code": .., "status_message": ..}`.
#[derive(Deserialize)]
struct StatusBody {
    status_message: String,
}

/// Short, single-line description of an error body: the catalog's
/// `status_message` when present, otherwise the first characters of the
/// body with whitespace collapsed.
fn body_preview(body: &[u8]) -> String {
    const BODY_PREVIEW_CHARS: usize = 160;

    if let Ok(status) = serde_json::from_slice::<StatusBody>(body) {
        return status.status_message;
    }
    let text = String::from_utf8_lossy(body);
    let compact = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match compact.char_indices().nth(BODY_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &compact[..cut]),
        None => compact,
    }
}
