use crate::config::Config;
use crate::models::response::ApiResponse;
use crate::services::token_store::{Scope, TokenStore};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Connection failed: {0}")]
    Connection(#[source] reqwest::Error),
    #[error("Backend responded with {status}")]
    Status {
        status: StatusCode,
        body: Option<Value>,
    },
    #[error("Invalid response body: {0}")]
    Decode(String),
    #[error("Payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },
    #[error("Request failed: {0}")]
    Unexpected(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            ClientError::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PartBody {
    Text(String),
    File {
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormPart {
    name: String,
    body: PartBody,
}

/// Multipart form kept in memory so its size can be checked before sending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            body: PartBody::Text(value.into()),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            body: PartBody::File {
                file_name: file_name.into(),
                content_type,
                bytes,
            },
        });
        self
    }

    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match &part.body {
            PartBody::Text(value) if part.name == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Size of field names and contents, excluding multipart framing.
    pub fn content_len(&self) -> usize {
        self.parts
            .iter()
            .map(|part| {
                part.name.len()
                    + match &part.body {
                        PartBody::Text(value) => value.len(),
                        PartBody::File {
                            file_name, bytes, ..
                        } => file_name.len() + bytes.len(),
                    }
            })
            .sum()
    }

    fn into_form(self) -> Result<Form, ClientError> {
        let mut form = Form::new();
        for part in self.parts {
            form = match part.body {
                PartBody::Text(value) => form.text(part.name, value),
                PartBody::File {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let mut file_part = Part::bytes(bytes).file_name(file_name);
                    if let Some(content_type) = content_type {
                        file_part = file_part
                            .mime_str(&content_type)
                            .map_err(|e| ClientError::Unexpected(e.to_string()))?;
                    }
                    form.part(part.name, file_part)
                }
            };
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Multipart(MultipartForm),
    Empty,
}

impl Payload {
    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            Payload::Json(value) => value.get(name).and_then(Value::as_str),
            Payload::Multipart(form) => form.text_value(name),
            Payload::Empty => None,
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<MultipartForm> for Payload {
    fn from(form: MultipartForm) -> Self {
        Payload::Multipart(form)
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    max_body_size: usize,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        Url::parse(&config.backend_api_url).map_err(|e| {
            ClientError::Unexpected(format!(
                "invalid backend URL {}: {}",
                config.backend_api_url, e
            ))
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::Unexpected(e.to_string()))?;

        Ok(Self {
            http,
            base_url: Arc::from(config.backend_api_url.trim_end_matches('/')),
            max_body_size: config.max_body_size_bytes,
        })
    }

    pub fn scoped(&self, scope: Scope, tokens: Arc<dyn TokenStore>) -> ScopedClient {
        ScopedClient {
            api: self.clone(),
            scope,
            tokens: Some(tokens),
        }
    }

    /// Never sends a bearer token, for responses shared between callers.
    pub fn anonymous(&self) -> ScopedClient {
        ScopedClient {
            api: self.clone(),
            scope: Scope::Public,
            tokens: None,
        }
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ClientError::Unexpected(format!("invalid URL {}: {}", raw, e)))
    }
}

pub struct ScopedClient {
    api: ApiClient,
    scope: Scope,
    tokens: Option<Arc<dyn TokenStore>>,
}

impl ScopedClient {
    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ClientError> {
        self.send(Method::GET, path, Payload::Empty).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: Payload,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(Method::POST, path, payload).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: Payload,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(Method::PATCH, path, payload).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ClientError> {
        self.send(Method::DELETE, path, Payload::Empty).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<ApiResponse<T>, ClientError> {
        let url = self.api.url(path)?;
        debug!("{} {} ({} scope)", method, url, self.scope);

        let mut request = self.api.http.request(method, url);

        // Read on every call: a refresh may have rotated the token.
        if let Some(token) = self
            .tokens
            .as_ref()
            .and_then(|tokens| tokens.access_token(self.scope))
        {
            request = request.bearer_auth(token);
        }

        request = match payload {
            Payload::Json(value) => {
                let body =
                    serde_json::to_vec(&value).map_err(|e| ClientError::Unexpected(e.to_string()))?;
                self.check_size(body.len())?;
                request.header(CONTENT_TYPE, "application/json").body(body)
            }
            Payload::Multipart(form) => {
                self.check_size(form.content_len())?;
                request.multipart(form.into_form()?)
            }
            Payload::Empty => request,
        };

        let response = request.send().await.map_err(ClientError::Connection)?;
        let status = response.status();
        let bytes = response.bytes().await;

        if !status.is_success() {
            let body = bytes
                .ok()
                .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok());
            return Err(ClientError::Status { status, body });
        }

        let bytes = bytes.map_err(|e| ClientError::Decode(e.to_string()))?;
        decode_envelope(&bytes)
    }

    fn check_size(&self, size: usize) -> Result<(), ClientError> {
        if size > self.api.max_body_size {
            return Err(ClientError::PayloadTooLarge {
                size,
                limit: self.api.max_body_size,
            });
        }
        Ok(())
    }
}

fn decode_envelope<T: DeserializeOwned>(bytes: &[u8]) -> Result<ApiResponse<T>, ClientError> {
    // 204 and friends carry no envelope at all.
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_value(serde_json::json!({ "status": true, "data": null }))
            .map_err(|e| ClientError::Decode(e.to_string()));
    }
    serde_json::from_slice(bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::token_store::CookieTokenStore;
    use serde_json::json;

    #[test]
    fn test_content_len_counts_names_and_bytes() {
        let form = MultipartForm::new()
            .text("title", "Open day")
            .file("image", "a.png", Some("image/png".to_string()), vec![0u8; 100]);

        assert_eq!(form.content_len(), "title".len() + 8 + "image".len() + 5 + 100);
        assert_eq!(form.text_value("title"), Some("Open day"));
        assert_eq!(form.text_value("image"), None);
    }

    #[test]
    fn test_payload_field_reads_json_and_forms() {
        let json = Payload::from(json!({ "slug": "open-day", "id": 3 }));
        assert_eq!(json.field("slug"), Some("open-day"));
        assert_eq!(json.field("id"), None);

        let form = Payload::from(MultipartForm::new().text("slug", "news"));
        assert_eq!(form.field("slug"), Some("news"));
        assert_eq!(Payload::Empty.field("slug"), None);
    }

    #[test]
    fn test_decode_envelope_accepts_empty_body() {
        let response: ApiResponse<Value> = decode_envelope(b"").unwrap();
        assert!(response.status);
        assert_eq!(response.data, Value::Null);
    }

    #[test]
    fn test_decode_envelope_rejects_non_envelope() {
        let result: Result<ApiResponse<Value>, _> = decode_envelope(b"<html></html>");
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }

    #[tokio::test]
    async fn test_oversized_upload_fails_before_sending() {
        let mut config = Config::with_backend("http://127.0.0.1:9");
        config.max_body_size_bytes = 16;
        let client = ApiClient::new(&config).unwrap();
        let scoped = client.scoped(Scope::Admin, Arc::new(CookieTokenStore::empty(false)));

        let form = MultipartForm::new().file("image", "big.png", None, vec![0u8; 64]);
        let result: Result<ApiResponse<Value>, _> =
            scoped.post("/admin/banners", Payload::from(form)).await;

        assert!(matches!(
            result,
            Err(ClientError::PayloadTooLarge { limit: 16, .. })
        ));
    }
}
