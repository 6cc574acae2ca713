//! Responses resource: the two endpoints this API exposes.

use crate::client::Client;
use crate::error::SdkError;
use crate::types::Response;
use crate::types::ResponseCreateParams;

/// Responses resource for creating and polling response objects.
pub struct Responses<'a> {
    client: &'a Client,
}

impl<'a> Responses<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Create a response. Always non-streaming; the returned object may
    /// already be `completed` or may still be `queued`/`in_progress`, in
    /// which case the caller is expected to poll via [`Self::retrieve`].
    ///
    /// # Example
    ///
    /// ```ignore
    /// use responses_sdk::{Client, ResponseCreateParams, InputItem, Role};
    ///
    /// let client = Client::new("sk-...");
    /// let params = ResponseCreateParams::new(
    ///     "gpt-5-codex",
    ///     vec![InputItem::message(Role::User, "hello")],
    /// );
    /// let response = client.responses().create(params).await?;
    /// ```
    pub async fn create(&self, params: ResponseCreateParams) -> Result<Response, SdkError> {
        self.client.post_response("/responses", &params).await
    }

    /// Fetch the current state of a response by id.
    pub async fn retrieve(&self, response_id: impl AsRef<str>) -> Result<Response, SdkError> {
        let path = format!("/responses/{}", response_id.as_ref());
        self.client.get_response(&path).await
    }
}
