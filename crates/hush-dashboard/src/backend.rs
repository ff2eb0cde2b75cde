use futures_util::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use hush_types::api::{
    AcceptMessagesRequest, ApiResponse, SafeModeRequest, SignInRequest, SignInResponse,
};

use crate::ClientError;
use crate::dashboard::Session;

/// The REST calls the dashboard makes on behalf of the signed-in user.
pub trait DashboardBackend: Send + Sync {
    fn accept_messages(&self) -> BoxFuture<'_, Result<ApiResponse, ClientError>>;
    fn set_accept_messages(&self, value: bool) -> BoxFuture<'_, Result<ApiResponse, ClientError>>;
    fn safe_mode(&self) -> BoxFuture<'_, Result<ApiResponse, ClientError>>;
    fn set_safe_mode(&self, value: bool) -> BoxFuture<'_, Result<ApiResponse, ClientError>>;
    fn messages(&self) -> BoxFuture<'_, Result<ApiResponse, ClientError>>;
    fn delete_message(&self, id: Uuid) -> BoxFuture<'_, Result<ApiResponse, ClientError>>;
}

/// [`DashboardBackend`] over HTTP with a bearer session token.
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
    token: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Exchange credentials for a session and a backend bound to it.
    pub async fn sign_in(
        base_url: &str,
        username: &str,
        password: &str,
    ) -> Result<(Self, Session), ClientError> {
        let base_url = base_url.trim_end_matches('/');
        let resp = Client::new()
            .post(format!("{}/api/sign-in", base_url))
            .json(&SignInRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let signed_in: SignInResponse = read_body(resp).await?;
        let session = Session {
            username: signed_in.username,
        };
        Ok((Self::new(base_url, signed_in.token), session))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("{} {}{}", method, self.base_url, path);
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    async fn call(&self, req: RequestBuilder) -> Result<ApiResponse, ClientError> {
        let resp = req.send().await?;
        read_body(resp).await
    }
}

/// Decode a success body, or turn an error status into [`ClientError::Api`]
/// carrying the envelope's message when the server sent one.
async fn read_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let message = resp
        .json::<ApiResponse>()
        .await
        .ok()
        .map(|body| body.message)
        .filter(|m| !m.is_empty());
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

impl DashboardBackend for HttpBackend {
    fn accept_messages(&self) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
        Box::pin(self.call(self.request(Method::GET, "/api/accept-messages")))
    }

    fn set_accept_messages(&self, value: bool) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
        let req = self
            .request(Method::POST, "/api/accept-messages")
            .json(&AcceptMessagesRequest { accept_messages: value });
        Box::pin(self.call(req))
    }

    fn safe_mode(&self) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
        Box::pin(self.call(self.request(Method::GET, "/api/safe-mode")))
    }

    fn set_safe_mode(&self, value: bool) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
        let req = self
            .request(Method::POST, "/api/safe-mode")
            .json(&SafeModeRequest { safe_mode: value });
        Box::pin(self.call(req))
    }

    fn messages(&self) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
        Box::pin(self.call(self.request(Method::GET, "/api/get-messages")))
    }

    fn delete_message(&self, id: Uuid) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
        let path = format!("/api/delete-message/{}", id);
        Box::pin(self.call(self.request(Method::DELETE, &path)))
    }
}
