//! Small helpers around `reqwest` for JSON APIs.

use {reqwest::StatusCode, serde::de::DeserializeOwned};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {0}: {1}")]
    Status(StatusCode, String),
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sends the request and parses the JSON response body. The raw bodies are
/// logged at trace level.
pub async fn roundtrip<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, Error> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    tracing::trace!(%status, %body, "received response");
    if !status.is_success() {
        return Err(Error::Status(status, body));
    }
    Ok(serde_json::from_str(&body)?)
}
