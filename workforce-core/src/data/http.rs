//! Shared blocking HTTP client setup.

use super::provider::DataError;
use reqwest::blocking::Client;
use std::time::Duration;

const USER_AGENT: &str = concat!("workforce/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn blocking_client() -> Result<Client, DataError> {
    Client::builder()
        .timeout(TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| DataError::NetworkUnreachable(format!("failed to build HTTP client: {e}")))
}

/// Map a transport-level failure (no HTTP status available).
pub(crate) fn send_error(url: &str, err: reqwest::Error) -> DataError {
    if err.is_timeout() {
        DataError::NetworkUnreachable(format!("timed out requesting {url}"))
    } else {
        DataError::NetworkUnreachable(format!("{url}: {err}"))
    }
}
