//! HTTP plumbing shared by the management and metrics clients.
//!
//! Builds URLs under a fixed API prefix, injects basic auth, decodes JSON
//! success bodies and maps non-2xx responses to [`ClientError::Http`].

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::model::ErrorResponse;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

/// HTTP basic auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    /// Base URL with the API prefix applied; always ends with `/`
    api_root: Url,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    /// `api_prefix` is the path under the base URL, e.g. `snmpsim/mgmt/v1`.
    pub fn new(config: &ClientConfig, api_prefix: &str) -> Result<Self> {
        config.validate()?;

        let mut api_root = Url::parse(&config.base_url)?;
        if api_root.cannot_be_a_base() {
            return Err(ClientError::invalid_argument(format!(
                "base_url {} cannot be used as a base",
                config.base_url
            )));
        }
        {
            let mut segments = api_root
                .path_segments_mut()
                .map_err(|_| ClientError::invalid_argument("base_url cannot be a base"))?;
            segments.pop_if_empty();
            for segment in api_prefix.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
            // Trailing empty segment so the root ends with '/'
            segments.push("");
        }

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            api_root,
            credentials: config.credentials(),
        })
    }

    pub fn api_root(&self) -> &Url {
        &self.api_root
    }

    pub fn set_credentials(&mut self, credentials: Option<Credentials>) {
        self.credentials = credentials;
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Resolve path segments under the API root. Each segment is percent-encoded,
    /// so values containing `/` or `?` cannot escape their position.
    pub fn url<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url> {
        let mut url = self.api_root.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::invalid_argument("API root cannot be a base"))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.as_ref());
            }
        }
        Ok(url)
    }

    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.send(self.request(Method::GET, url)).await?;
        decode(response).await
    }

    /// GET with one query parameter per pair, in iteration order.
    pub async fn get_with_query<'a, T, I>(&self, mut url: Url, query: I) -> Result<T>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        // An empty iterator leaves a dangling '?'
        if url.query() == Some("") {
            url.set_query(None);
        }
        self.get(url).await
    }

    pub async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, url).json(body);
        let response = self.send(request).await?;
        decode(response).await
    }

    /// POST a raw body. The response body is ignored.
    pub async fn post_bytes(&self, url: Url, body: Vec<u8>) -> Result<()> {
        let request = self
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body);
        self.send(request).await?;
        Ok(())
    }

    /// PUT without a body. The response body is ignored.
    pub async fn put(&self, url: Url) -> Result<()> {
        self.send(self.request(Method::PUT, url)).await?;
        Ok(())
    }

    pub async fn delete(&self, url: Url) -> Result<()> {
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "snmpsim request");
        let builder = self.client.request(method, url);
        match &self.credentials {
            Some(credentials) => {
                builder.basic_auth(&credentials.username, Some(&credentials.password))
            }
            None => builder,
        }
    }

    /// Send and map non-2xx statuses to [`ClientError::Http`].
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                debug!(%url, error = %err, "failed to read error body");
                Default::default()
            }
        };
        let message = error_message(status, &body);
        warn!(status = status.as_u16(), %url, %message, "snmpsim request failed");

        Err(ClientError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

/// The server's `message`, else the raw body text, else the status reason.
fn error_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(error) if !error.message.is_empty() => error.message,
        _ => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                status.canonical_reason().unwrap_or("unknown status").to_string()
            } else {
                text
            }
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
