use serde_json::Value as JsonValue;

use crate::error::SdkError;
use crate::resources::responses::Responses;
use crate::types::Response;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Thin HTTP client for the stateful Responses API.
///
/// Holds nothing but connection details; all chaining/compression/retry
/// policy lives one layer up, in the adapter itself.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Client {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn responses(&self) -> Responses<'_> {
        Responses::new(self)
    }

    pub(crate) async fn post_response(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<Response, SdkError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;
        Self::into_response(response).await
    }

    pub(crate) async fn get_response(&self, path: &str) -> Result<Response, SdkError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(url).bearer_auth(&self.api_key).send().await?;
        Self::into_response(response).await
    }

    async fn into_response(response: reqwest::Response) -> Result<Response, SdkError> {
        let status = response.status();
        let retry_after = header_value(&response, "retry-after");
        let ratelimit_reset = header_value(&response, "x-ratelimit-reset")
            .or_else(|| header_value(&response, "ratelimit-reset"));

        if status.is_success() {
            let body: Response = response.json().await?;
            return Ok(body);
        }

        let body_text = response.text().await.unwrap_or_default();
        let (code, message) = parse_error_body(&body_text);
        Err(SdkError::Api {
            status: status.as_u16(),
            code,
            message,
            body: body_text,
            retry_after,
            ratelimit_reset,
        })
    }
}

fn header_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Best-effort extraction of `{"error": {"code", "message"}}` from a
/// non-2xx body. Falls back to the raw body text when it isn't JSON or
/// doesn't carry the expected shape, so a malformed error body never
/// becomes a decode failure in its own right.
fn parse_error_body(body: &str) -> (Option<String>, String) {
    match serde_json::from_str::<JsonValue>(body) {
        Ok(value) => {
            let error = &value["error"];
            let message = error["message"]
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| body.to_string());
            let code = error["code"].as_str().map(|s| s.to_string());
            (code, message)
        }
        Err(_) => (None, body.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_error_body() {
        let body = r#"{"error":{"code":"context_length_exceeded","message":"too long"}}"#;
        let (code, message) = parse_error_body(body);
        assert_eq!(code.as_deref(), Some("context_length_exceeded"));
        assert_eq!(message, "too long");
    }

    #[test]
    fn falls_back_to_raw_body_when_not_json() {
        let (code, message) = parse_error_body("gateway timeout");
        assert_eq!(code, None);
        assert_eq!(message, "gateway timeout");
    }
}
