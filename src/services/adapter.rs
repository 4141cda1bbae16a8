//! Normalizes backend envelopes and client errors into [`ActionResponse`].

use crate::models::response::{ActionResponse, ApiResponse, ErrorDetails, ErrorKind, PaginationMeta};
use crate::services::http_client::ClientError;
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: {}", .details.kind, .details.message)]
pub struct ActionError {
    pub details: ErrorDetails,
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        self.details.kind
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub meta: Option<PaginationMeta>,
}

pub fn extract_api_data<T: Clone>(response: &ApiResponse<T>) -> ActionResponse<T> {
    if response.status {
        return ActionResponse::Success {
            data: response.data.clone(),
            meta: response.meta,
        };
    }

    let message = if response.message.is_empty() {
        ErrorKind::UnknownError.default_message().to_string()
    } else {
        response.message.clone()
    };
    ActionResponse::failure(ErrorDetails::new(ErrorKind::UnknownError, message))
}

pub fn handle_api_error<T>(error: &ClientError, fallback: &str) -> ActionResponse<T> {
    let details = classify(error, fallback);
    warn!(
        kind = %details.kind,
        status = ?error.status(),
        "{}: {}",
        fallback,
        error
    );
    ActionResponse::failure(details)
}

pub fn handle_api_success() -> ActionResponse<()> {
    ActionResponse::success(())
}

pub async fn handle_action_result<T, F>(action: F) -> Result<Fetched<T>, ActionError>
where
    F: Future<Output = ActionResponse<T>>,
{
    match action.await {
        ActionResponse::Success { data, meta } => Ok(Fetched { data, meta }),
        ActionResponse::Failure { error } => Err(ActionError { details: error }),
    }
}

/// Resolves a client call into an action response in one step.
pub fn resolve<T: Clone>(
    result: Result<ApiResponse<T>, ClientError>,
    fallback: &str,
) -> ActionResponse<T> {
    match result {
        Ok(response) => extract_api_data(&response),
        Err(error) => handle_api_error(&error, fallback),
    }
}

fn classify(error: &ClientError, fallback: &str) -> ErrorDetails {
    let status = match error.status() {
        Some(status) => status,
        None if matches!(error, ClientError::Connection(_)) => {
            return details(ErrorKind::ConnectionError, fallback);
        }
        None => return details(ErrorKind::UnknownError, fallback),
    };

    match status {
        StatusCode::UNAUTHORIZED => details(ErrorKind::NotAuthenticated, fallback),
        StatusCode::FORBIDDEN => details(ErrorKind::Forbidden, fallback),
        StatusCode::NOT_FOUND => details(ErrorKind::NotFound, fallback),
        StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
            match validation_fields(error.body()) {
                Some(fields) => details(ErrorKind::ValidationError, fallback).with_fields(fields),
                None => unknown(error, fallback),
            }
        }
        s if s.is_server_error() => details(ErrorKind::ServerError, fallback),
        _ => unknown(error, fallback),
    }
}

fn unknown(error: &ClientError, fallback: &str) -> ErrorDetails {
    let message = error
        .body()
        .and_then(backend_message)
        .unwrap_or_else(|| or_default(ErrorKind::UnknownError, fallback));
    ErrorDetails::new(ErrorKind::UnknownError, message)
}

fn details(kind: ErrorKind, fallback: &str) -> ErrorDetails {
    ErrorDetails::new(kind, or_default(kind, fallback))
}

fn or_default(kind: ErrorKind, fallback: &str) -> String {
    if fallback.trim().is_empty() {
        kind.default_message().to_string()
    } else {
        fallback.to_string()
    }
}

/// Per-field messages from `{error: {fields}}` or `{fields}`.
///
/// Array values contribute their first string. Returns `None` when the body
/// carries no usable field map.
fn validation_fields(body: Option<&Value>) -> Option<BTreeMap<String, String>> {
    let body = body?;
    let raw = body
        .get("error")
        .and_then(|e| e.get("fields"))
        .or_else(|| body.get("fields"))?
        .as_object()?;

    let fields: BTreeMap<String, String> = raw
        .iter()
        .filter_map(|(name, message)| {
            let message = match message {
                Value::String(s) => Some(s.clone()),
                Value::Array(items) => items.iter().find_map(|i| i.as_str().map(str::to_string)),
                _ => None,
            }?;
            Some((name.clone(), message))
        })
        .collect();

    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

fn backend_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error").and_then(|e| e.get("message")))
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}
