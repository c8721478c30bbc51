//! Shared plumbing for the OpenAI-compatible HTTP gateways.

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

use docqa_core::{Error, Result};

pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {}", e)))
}

/// Classifies a transport-level failure. Anything that may succeed on a
/// second attempt is transient; a response we cannot decode is not.
pub fn transport_error(service: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::unavailable(format!("{} request timed out: {}", service, err), true)
    } else if err.is_decode() {
        Error::unavailable(format!("{} returned an unreadable response: {}", service, err), false)
    } else if err.is_builder() {
        Error::unavailable(format!("{} request could not be built: {}", service, err), false)
    } else {
        Error::unavailable(format!("{} request failed: {}", service, err), true)
    }
}

/// POSTs `body` as JSON with bearer auth and decodes a JSON reply.
pub async fn post_json<B, R>(client: &Client, url: &str, api_key: &str, body: &B, service: &str) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(body)
        .send()
        .await
        .map_err(|e| transport_error(service, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read response body".to_string());
        return Err(Error::from_status(status.as_u16(), body));
    }

    response.json::<R>().await.map_err(|e| transport_error(service, e))
}

pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
