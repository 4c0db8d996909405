use reqwest::{Client, Method, header::CONTENT_TYPE};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    config::ApiConfig,
    dto::{CreateNoteRequest, Envelope, EnvelopeError, NoteResponse},
    models::Note,
};

pub const ALL_NOTES_ENDPOINT: &str = "/notes/all";
pub const CREATE_NOTE_ENDPOINT: &str = "/notes/create";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The service answered with an error field; the message is shown as is.
    #[error("{0}")]
    Remote(String),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("malformed response from {endpoint}: {source}")]
    Envelope {
        endpoint: String,
        source: EnvelopeError,
    },

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to create HTTP client: {0}")]
    ClientBuild(reqwest::Error),

    #[error("request task did not complete: {0}")]
    TaskFailed(#[source] tokio::task::JoinError),
}

/// Method and optional JSON body of a single call.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    body: Option<Vec<u8>>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            body: None,
        }
    }

    pub fn post_json<B: Serialize>(body: &B) -> Result<Self, ApiError> {
        Ok(Self {
            method: Method::POST,
            body: Some(serde_json::to_vec(body)?),
        })
    }
}

/// Operations the session needs from the notes service.
pub trait NotesApi: Send + Sync + 'static {
    fn all_notes(&self) -> impl Future<Output = Result<Vec<Note>, ApiError>> + Send;

    fn create_note(
        &self,
        request: CreateNoteRequest,
    ) -> impl Future<Output = Result<Note, ApiError>> + Send;
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        if config.no_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(ApiError::ClientBuild)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs exactly one call to `endpoint` and unwraps the response envelope.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);

        tracing::debug!("Sending {} request to {}", options.method, url);

        let mut request = self.client.request(options.method, &url);
        if let Some(body) = options.body {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let transport_error = |source: reqwest::Error| {
            tracing::error!("Request to {} failed: {}", url, source);
            ApiError::Transport {
                endpoint: endpoint.to_string(),
                source,
            }
        };

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport_error)?;
        tracing::debug!(
            "Response from {}: status {}, {} bytes",
            url,
            status,
            body.len()
        );

        let envelope = Envelope::<T>::decode(&body).map_err(|source| {
            tracing::error!("Malformed response from {}: {}", url, source);
            ApiError::Envelope {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

        match envelope {
            Envelope::Data(data) => Ok(data),
            Envelope::Error(message) => {
                tracing::warn!("Service returned error for {}: {}", url, message);
                Err(ApiError::Remote(message))
            }
        }
    }
}

impl NotesApi for ApiClient {
    async fn all_notes(&self) -> Result<Vec<Note>, ApiError> {
        self.request::<Vec<NoteResponse>>(ALL_NOTES_ENDPOINT, RequestOptions::get())
            .await
            .map(|notes| notes.into_iter().map(Note::from).collect())
    }

    async fn create_note(&self, request: CreateNoteRequest) -> Result<Note, ApiError> {
        let options = RequestOptions::post_json(&request)?;
        self.request::<NoteResponse>(CREATE_NOTE_ENDPOINT, options)
            .await
            .map(Note::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.to_string(),
            request_timeout: None,
            no_proxy: true,
        }
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new(&config("http://localhost:8080/api/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn post_json_encodes_body() {
        let options = RequestOptions::post_json(&CreateNoteRequest::new("hello")).unwrap();

        assert_eq!(options.method, Method::POST);
        assert_eq!(options.body.as_deref(), Some(br#"{"text":"hello"}"#.as_slice()));
    }

    #[test]
    fn remote_error_displays_bare_message() {
        assert_eq!(ApiError::Remote("db down".to_string()).to_string(), "db down");
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        // Reserve a free port, then release it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::new(&config(&format!("http://{addr}/api"))).unwrap();

        let result = client.all_notes().await;

        assert!(matches!(result, Err(ApiError::Transport { ref endpoint, .. }) if endpoint == ALL_NOTES_ENDPOINT));
    }
}
