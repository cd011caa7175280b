use super::error::ClientError;
use super::models::{CorrectionRequest, CorrectionResult};
use tracing::{debug, error};

/// Boundary to the remote grammar-correction service.
///
/// Implementations block the calling thread until the call settles. The
/// runtime always calls this from a worker thread, never from the loop that
/// owns the conversation state.
pub trait CorrectionService: Send + Sync {
    fn fetch(&self, request: &CorrectionRequest) -> Result<CorrectionResult, ClientError>;
}

/// Form-encoded `POST` to a fixed endpoint, JSON back.
#[derive(Clone)]
pub struct HttpCorrectionClient {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpCorrectionClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        // No timeouts and no retry: a hung service keeps the turn busy.
        let agent = ureq::builder().build();
        Self {
            endpoint: endpoint.into(),
            agent,
        }
    }
}

impl CorrectionService for HttpCorrectionClient {
    fn fetch(&self, request: &CorrectionRequest) -> Result<CorrectionResult, ClientError> {
        debug!(
            "POST {} (language={}, {} chars)",
            self.endpoint,
            request.language,
            request.text.chars().count()
        );

        let resp = self
            .agent
            .post(&self.endpoint)
            .send_form(&[
                ("text", request.text.as_str()),
                ("language", request.language.as_str()),
            ])
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => {
                    error!("Correction service returned HTTP {}", code);
                    ClientError::Status(code)
                }
                ureq::Error::Transport(t) => {
                    error!("Correction request failed: {}", t);
                    ClientError::Transport(t.to_string())
                }
            })?;

        let body = resp
            .into_string()
            .map_err(|e| ClientError::Transport(format!("Failed to read response body: {}", e)))?;

        parse_correction(&body, &request.text).map_err(|e| {
            error!("{}", e);
            e
        })
    }
}

/// Parse a service body into a [`CorrectionResult`].
///
/// `corrected` is the only field the service must send, and it must be a
/// non-empty string; `original` falls back to the submitted text.
pub fn parse_correction(body: &str, submitted: &str) -> Result<CorrectionResult, ClientError> {
    let json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ClientError::MalformedResponse(format!("body is not JSON: {}", e)))?;

    if json["corrected"].as_str().map_or(true, str::is_empty) {
        return Err(ClientError::MalformedResponse(
            "missing `corrected` field".to_string(),
        ));
    }

    let mut result: CorrectionResult = serde_json::from_value(json)
        .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
    if result.original.is_empty() {
        result.original = submitted.to_string();
    }
    Ok(result)
}
