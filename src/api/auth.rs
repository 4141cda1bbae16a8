use super::{FormPayload, RequestContext};
use crate::actions::auth;
use crate::services::token_store::Scope;
use axum::{extract::Query, response::Response};

#[derive(serde::Deserialize)]
pub struct ScopeQueryParams {
    pub scope: Option<Scope>,
}

pub async fn login(request: RequestContext, FormPayload(credentials): FormPayload) -> Response {
    let response = auth::login(&request.ctx, credentials).await;
    request.respond(response)
}

pub async fn refresh(request: RequestContext, Query(params): Query<ScopeQueryParams>) -> Response {
    let scope = params.scope.unwrap_or(Scope::Admin);
    let response = auth::refresh(&request.ctx, scope).await;
    request.respond(response)
}

pub async fn logout(request: RequestContext, Query(params): Query<ScopeQueryParams>) -> Response {
    let scope = params.scope.unwrap_or(Scope::Admin);
    let response = auth::logout(&request.ctx, scope).await;
    request.respond(response)
}
