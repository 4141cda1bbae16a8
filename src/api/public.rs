use super::{to_params, unknown_resource, FormPayload, RequestContext};
use crate::actions::{configs, contacts, doctors, posts, resources::public_resource};
use crate::services::query_cache::QueryClient;
use axum::{
    extract::{Path, Query},
    response::Response,
};

pub async fn list(
    request: RequestContext,
    Path(resource): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let Some(resource_def) = public_resource(&resource) else {
        return request.respond(unknown_resource(&resource));
    };

    let params = to_params(query);
    let response = resource_def.list(&request.ctx, &params).await;
    request.respond(response)
}

pub async fn detail(
    request: RequestContext,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    let Some(resource_def) = public_resource(&resource) else {
        return request.respond(unknown_resource(&resource));
    };

    let response = resource_def.detail(&request.ctx, &id).await;
    request.respond(response)
}

pub async fn doctors_page(
    request: RequestContext,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    // Scoped to this request, never shared between callers.
    let queries = QueryClient::from_config(&request.config);
    let params = to_params(query);

    let response = doctors::get_doctors_page(&request.ctx, &queries, &params).await;
    request.respond(response)
}

pub async fn config_by_key(request: RequestContext, Path(key): Path<String>) -> Response {
    let response = configs::get_config_by_key(&request.ctx, &key).await;
    request.respond(response)
}

pub async fn post_by_slug(request: RequestContext, Path(slug): Path<String>) -> Response {
    let response = posts::get_post_by_slug(&request.ctx, &slug).await;
    request.respond(response)
}

pub async fn submit_contact(request: RequestContext, FormPayload(payload): FormPayload) -> Response {
    let response = contacts::submit_contact(&request.ctx, payload).await;
    request.respond(response)
}
