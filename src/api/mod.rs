pub mod admin;
pub mod auth;
pub mod public;

use crate::actions::ActionContext;
use crate::config::Config;
use crate::models::params::PaginationParams;
use crate::models::response::{ActionResponse, ErrorDetails, ErrorKind};
use crate::services::http_client::{ApiClient, ClientError, MultipartForm, Payload};
use crate::services::render_cache::RenderCache;
use crate::services::token_store::CookieTokenStore;
use axum::{
    extract::{DefaultBodyLimit, FromRequest, FromRequestParts, Multipart, Request},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: ApiClient,
    pub render_cache: Arc<RenderCache>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let client = ApiClient::new(&config)?;
        let render_cache = Arc::new(RenderCache::new(config.render_cache_ttl()));
        Ok(Self {
            config: Arc::new(config),
            client,
            render_cache,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_body_size_bytes;

    Router::new()
        .route("/api/doctors-page", get(public::doctors_page))
        .route("/api/configs/{key}", get(public::config_by_key))
        .route("/api/posts/slug/{slug}", get(public::post_by_slug))
        .route("/api/contacts", post(public::submit_contact))
        .route("/api/{resource}", get(public::list))
        .route("/api/{resource}/{id}", get(public::detail))
        .route(
            "/admin/api/{resource}",
            get(admin::list).post(admin::create),
        )
        .route(
            "/admin/api/{resource}/{id}",
            get(admin::detail)
                .patch(admin::update)
                .delete(admin::remove),
        )
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route(
            "/health",
            get({
                (
                    StatusCode::OK,
                    Json(serde_json::json!({ "status": "healthy" })),
                )
            }),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

pub struct RequestContext {
    pub ctx: ActionContext,
    pub cookies: Arc<CookieTokenStore>,
    pub config: Arc<Config>,
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let cookies = Arc::new(CookieTokenStore::from_headers(
            &parts.headers,
            state.config.secure_cookies,
        ));
        let ctx = ActionContext::new(
            state.client.clone(),
            cookies.clone(),
            state.render_cache.clone(),
        );
        Ok(Self {
            ctx,
            cookies,
            config: state.config.clone(),
        })
    }
}

impl RequestContext {
    pub fn respond<T: Serialize>(&self, response: ActionResponse<T>) -> Response {
        let status = response
            .error()
            .map(|e| status_for(e.kind))
            .unwrap_or(StatusCode::OK);

        let mut http = (status, Json(response)).into_response();
        for cookie in self.cookies.take_set_cookie_headers() {
            http.headers_mut().append(header::SET_COOKIE, cookie);
        }
        http
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ConnectionError | ErrorKind::ServerError => StatusCode::BAD_GATEWAY,
        ErrorKind::NotAuthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::UnknownError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn unknown_resource(resource: &str) -> ActionResponse<Value> {
    ActionResponse::failure(ErrorDetails::new(
        ErrorKind::NotFound,
        format!("Unknown resource: {}", resource),
    ))
}

fn to_params(pairs: Vec<(String, String)>) -> PaginationParams {
    pairs.into_iter().collect()
}

/// Request body as a backend payload: multipart forms pass through, anything
/// else must be JSON.
pub struct FormPayload(pub Payload);

impl<S: Send + Sync> FromRequest<S> for FormPayload {
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            return Ok(FormPayload(Payload::Json(value)));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let mut form = MultipartForm::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(IntoResponse::into_response)?
        {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(IntoResponse::into_response)?;
                    form = form.file(name, file_name, content_type, bytes.to_vec());
                }
                None => {
                    let text = field.text().await.map_err(IntoResponse::into_response)?;
                    form = form.text(name, text);
                }
            }
        }

        Ok(FormPayload(Payload::Multipart(form)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::ValidationError), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(ErrorKind::ConnectionError), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorKind::NotAuthenticated), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_to_params_keeps_request_order() {
        let params = to_params(vec![
            ("specialist_id".to_string(), "3".to_string()),
            ("name".to_string(), String::new()),
            ("limit".to_string(), "10".to_string()),
        ]);

        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["specialist_id", "limit"]);
    }
}
