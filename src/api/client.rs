use crate::api::types::{ErrorBody, NewRecipe, Recipe, RecipePage};
use crate::auth::AuthStore;
use crate::util::{validate_base_url, UrlValidationError};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::redirect::Policy;
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB
const USER_AGENT: &str = concat!("dapur/", env!("CARGO_PKG_VERSION"));

/// Errors from the recipe HTTP collaborator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Non-2xx response; `message` is the server's `{ message }` if it sent one
    #[error("HTTP error: status {status}")]
    Server {
        status: u16,
        message: Option<String>,
    },
    /// Body did not match the expected schema
    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
    /// Response body exceeded the size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// A mutation was attempted without a bearer token
    #[error("Not signed in")]
    Unauthenticated,
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),
}

impl ApiError {
    /// Message for a user-facing notification: the server's own message when
    /// it provided one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// The HTTP contract the feed and mutation components depend on.
#[async_trait]
pub trait RecipeApi: Send + Sync {
    /// `GET /recipe?page=<page>&limit=<limit>`; `page` is 1-based.
    async fn list_page(&self, page: u32, limit: u32) -> Result<RecipePage, ApiError>;

    /// `GET /recipe/user`: the caller's own recipes, unpaginated.
    async fn list_mine(&self) -> Result<Vec<Recipe>, ApiError>;

    /// `POST /recipe`
    async fn create(&self, recipe: &NewRecipe) -> Result<Recipe, ApiError>;

    /// `DELETE /recipe/:id`
    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}

/// Create a redirect policy with loop detection and limited hops.
///
/// - Limits redirects to 3 hops maximum
/// - Detects redirect loops (same URL appearing twice in chain)
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev == url) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );
        attempt.follow()
    })
}

/// reqwest-backed [`RecipeApi`].
///
/// The bearer token is read from the [`AuthStore`] per request, so a logout
/// takes effect immediately for later calls.
pub struct RecipeClient {
    http: reqwest::Client,
    base_url: Url,
    auth: Arc<dyn AuthStore>,
    timeout: Duration,
}

impl RecipeClient {
    pub fn new(
        base_url: &str,
        auth: Arc<dyn AuthStore>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = validate_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(create_redirect_policy())
            .build()?;
        Ok(Self {
            http,
            base_url,
            auth,
            timeout,
        })
    }

    /// Resolve `segments` below the base path, e.g. `["recipe", "user"]`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(UrlValidationError::NotABase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attach the bearer token if one is present.
    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth.token() {
            Some(token) => request.header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            ),
            None => request,
        }
    }

    /// Attach the bearer token, failing before any network call when absent.
    fn require_token(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let token = self.auth.token().ok_or(ApiError::Unauthenticated)?;
        Ok(request.header(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", token.expose_secret()),
        ))
    }

    /// Sends the request and reads the body; the timeout covers both.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, ApiError> {
        tokio::time::timeout(self.timeout, Self::exchange(request))
            .await
            .map_err(|_| ApiError::Timeout)?
    }

    async fn exchange(request: reqwest::RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await.map_err(ApiError::Network)?;

        let status = response.status();
        let body = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message);
            tracing::debug!(
                status = status.as_u16(),
                message = ?message,
                "Server rejected request"
            );
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl RecipeApi for RecipeClient {
    async fn list_page(&self, page: u32, limit: u32) -> Result<RecipePage, ApiError> {
        let mut url = self.endpoint(&["recipe"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());

        let body = self.send(self.authorized(self.http.get(url))).await?;
        let page_data: RecipePage = serde_json::from_slice(&body)?;
        tracing::debug!(
            page,
            count = page_data.recipes.len(),
            total_pages = page_data.total_pages,
            "Fetched feed page"
        );
        Ok(page_data)
    }

    async fn list_mine(&self) -> Result<Vec<Recipe>, ApiError> {
        let url = self.endpoint(&["recipe", "user"])?;
        let body = self.send(self.authorized(self.http.get(url))).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn create(&self, recipe: &NewRecipe) -> Result<Recipe, ApiError> {
        let url = self.endpoint(&["recipe"])?;
        let payload = serde_json::to_vec(recipe)?;
        let request = self
            .require_token(self.http.post(url))?
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload);

        let body = self.send(request).await?;
        let created: Recipe = serde_json::from_slice(&body)?;
        tracing::info!(id = %created.id, "Recipe created");
        Ok(created)
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["recipe", id])?;
        let request = self.require_token(self.http.delete(url))?;
        // Success bodies vary ({ message } or empty); only the status matters.
        self.send(request).await?;
        tracing::info!(id, "Recipe deleted");
        Ok(())
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenStore;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, auth: StaticTokenStore) -> RecipeClient {
        RecipeClient::new(&server.uri(), Arc::new(auth), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_list_page_sends_page_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recipe"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "5"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Recipes": [{"_id": "a", "title": "Rendang"}],
                "totalPages": 4
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, StaticTokenStore::signed_in("tok"));
        let page = client.list_page(2, 5).await.unwrap();
        assert_eq!(page.total_pages, 4);
        assert_eq!(page.recipes[0].id, "a");
    }

    #[tokio::test]
    async fn test_base_path_is_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/recipe/user"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/api", server.uri());
        let client = RecipeClient::new(
            &base,
            Arc::new(StaticTokenStore::signed_out()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(client.list_mine().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_message_is_captured() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(serde_json::json!({"message": "Not your recipe"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, StaticTokenStore::signed_in("tok"));
        let err = client.delete("r1").await.unwrap_err();
        match &err {
            ApiError::Server { status: 403, message } => {
                assert_eq!(message.as_deref(), Some("Not your recipe"));
            }
            e => panic!("Expected Server(403), got {:?}", e),
        }
        assert_eq!(err.user_message("fallback"), "Not your recipe");
    }

    #[tokio::test]
    async fn test_non_json_error_body_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, StaticTokenStore::signed_out());
        let err = client.list_page(1, 5).await.unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 502, message: None }));
        assert_eq!(err.user_message("Failed to fetch recipes"), "Failed to fetch recipes");
    }

    #[tokio::test]
    async fn test_schema_mismatch_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, StaticTokenStore::signed_out());
        let err = client.list_page(1, 5).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_mutation_without_token_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, StaticTokenStore::signed_out());
        let err = client.delete("r1").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_oversized_response_rejected() {
        let server = MockServer::start().await;
        let huge = "x".repeat(MAX_RESPONSE_SIZE + 1);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(huge))
            .mount(&server)
            .await;

        let client = client_for(&server, StaticTokenStore::signed_out());
        let err = client.list_mine().await.unwrap_err();
        assert!(matches!(err, ApiError::ResponseTooLarge));
    }

    #[tokio::test]
    async fn test_stalled_body_times_out() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Headers promise 100 bytes, then the server goes quiet
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\n\
                      Content-Type: application/json\r\n\
                      Content-Length: 100\r\n\r\n\
                      {\"Recip",
                )
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = RecipeClient::new(
            &format!("http://{}", addr),
            Arc::new(StaticTokenStore::signed_out()),
            Duration::from_millis(300),
        )
        .unwrap();
        let result = tokio::time::timeout(Duration::from_secs(3), client.list_page(1, 5))
            .await
            .expect("request timeout should fire before the outer guard");
        assert!(matches!(result, Err(ApiError::Timeout)));
    }

    #[test]
    fn test_insecure_base_url_rejected() {
        let result = RecipeClient::new(
            "http://api.example.com",
            Arc::new(StaticTokenStore::signed_out()),
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }
}
