use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub meta: Option<PaginationMeta>,
    pub data: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ConnectionError,
    NotAuthenticated,
    Forbidden,
    NotFound,
    ValidationError,
    ServerError,
    UnknownError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConnectionError => "CONNECTION_ERROR",
            ErrorKind::NotAuthenticated => "NOT_AUTHENTICATED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::ServerError => "SERVER_ERROR",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::ConnectionError => "Unable to reach the server. Check your connection.",
            ErrorKind::NotAuthenticated => "Your session has expired. Please sign in again.",
            ErrorKind::Forbidden => "You do not have permission to perform this action.",
            ErrorKind::NotFound => "The requested resource was not found.",
            ErrorKind::ValidationError => "Some fields are invalid.",
            ErrorKind::ServerError => "The server encountered an error.",
            ErrorKind::UnknownError => "An unexpected error occurred.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl ErrorDetails {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: None,
        }
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        self.fields = Some(fields);
        self
    }
}

/// Serializes to `{ success, data?, error?, meta? }`.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResponse<T> {
    Success {
        data: T,
        meta: Option<PaginationMeta>,
    },
    Failure {
        error: ErrorDetails,
    },
}

impl<T> ActionResponse<T> {
    pub fn success(data: T) -> Self {
        ActionResponse::Success { data, meta: None }
    }

    pub fn failure(error: ErrorDetails) -> Self {
        ActionResponse::Failure { error }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionResponse::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ActionResponse::Success { data, .. } => Some(data),
            ActionResponse::Failure { .. } => None,
        }
    }

    pub fn meta(&self) -> Option<&PaginationMeta> {
        match self {
            ActionResponse::Success { meta, .. } => meta.as_ref(),
            ActionResponse::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorDetails> {
        match self {
            ActionResponse::Success { .. } => None,
            ActionResponse::Failure { error } => Some(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ActionResponse<U> {
        match self {
            ActionResponse::Success { data, meta } => ActionResponse::Success {
                data: f(data),
                meta,
            },
            ActionResponse::Failure { error } => ActionResponse::Failure { error },
        }
    }
}

#[derive(Serialize)]
struct WireActionResponse<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ErrorDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<&'a PaginationMeta>,
}

impl<T: Serialize> Serialize for ActionResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            ActionResponse::Success { data, meta } => WireActionResponse {
                success: true,
                data: Some(data),
                error: None,
                meta: meta.as_ref(),
            },
            ActionResponse::Failure { error } => WireActionResponse {
                success: false,
                data: None,
                error: Some(error),
                meta: None,
            },
        };
        wire.serialize(serializer)
    }
}
