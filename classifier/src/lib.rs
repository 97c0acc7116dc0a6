//! HTTP client for the remote digit classifier.
//!
//! The classifier is an opaque collaborator reached with one request per
//! snapshot:
//!
//! ```text
//! POST <base URL>/predict
//! Content-Type: multipart/form-data  (field "file" = PNG)
//!
//! 200 OK
//! { "probabilities": [10 numbers], "prediction": 0-9 }
//! ```
//!
//! # Error Handling
//!
//! Every failure is returned as a [`PredictError`]. The caller shows a single
//! generic notification for all of them; the variants exist for logging.
//! There is no retry: each snapshot is an independent attempt.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use thiserror::Error;

use digitpad_config::ClassifierEndpoint;
use digitpad_types::{
    PredictionResult, PredictionShapeError, RawPrediction, Snapshot, SnapshotDecodeError,
};

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";
/// File name attached to the uploaded part.
pub const FILE_NAME: &str = "digit.png";
/// Header echoing the request generation, for correlating logs on both ends.
pub const REQUEST_ID_HEADER: &str = "x-digitpad-request";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 4;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("snapshot could not be decoded: {0}")]
    Decode(#[from] SnapshotDecodeError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("classifier returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("response has an unexpected shape: {0}")]
    InvalidShape(#[from] PredictionShapeError),
}

impl PredictError {
    /// Whether the endpoint answered but the body was unusable.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::InvalidJson(_) | Self::InvalidShape(_))
    }
}

fn base_client_builder() -> reqwest::ClientBuilder {
    // Plain http is allowed: the default endpoint is a local development server.
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .user_agent(concat!("digitpad/", env!("CARGO_PKG_VERSION")))
}

/// Read at most [`MAX_ERROR_BODY_BYTES`] of an error response for diagnostics.
pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

/// Client bound to one classifier endpoint. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http: reqwest::Client,
    predict_url: reqwest::Url,
}

impl ClassifierClient {
    pub fn new(endpoint: &ClassifierEndpoint, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = base_client_builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            predict_url: endpoint.predict_url(),
        })
    }

    #[must_use]
    pub fn predict_url(&self) -> &reqwest::Url {
        &self.predict_url
    }

    /// Send one snapshot and parse the classifier's answer.
    ///
    /// `generation` is attached as [`REQUEST_ID_HEADER`]; it carries no
    /// meaning for the endpoint.
    pub async fn predict(
        &self,
        snapshot: &Snapshot,
        generation: u64,
    ) -> Result<PredictionResult, PredictError> {
        let png = snapshot.decode()?;
        let png_len = png.len();
        let part = Part::bytes(png)
            .file_name(FILE_NAME)
            .mime_str("image/png")?;
        let form = Form::new().part(FILE_FIELD, part);

        tracing::debug!(
            generation,
            png_bytes = png_len,
            url = %self.predict_url,
            "Sending prediction request"
        );

        let response = self
            .http
            .post(self.predict_url.clone())
            .header(REQUEST_ID_HEADER, generation.to_string())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            return Err(PredictError::Status { status, body });
        }

        let body = response.bytes().await?;
        let raw: RawPrediction = serde_json::from_slice(&body)?;
        let result = PredictionResult::try_from(raw)?;

        tracing::debug!(
            generation,
            prediction = ?result.prediction(),
            "Prediction received"
        );
        Ok(result)
    }
}
