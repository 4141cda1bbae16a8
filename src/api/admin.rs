use super::{to_params, unknown_resource, FormPayload, RequestContext};
use crate::actions::resources::admin_resource;
use axum::{
    extract::{Path, Query},
    response::Response,
};

pub async fn list(
    request: RequestContext,
    Path(resource): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let Some(resource_def) = admin_resource(&resource) else {
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
    let Some(resource_def) = admin_resource(&resource) else {
        return request.respond(unknown_resource(&resource));
    };

    let response = resource_def.detail(&request.ctx, &id).await;
    request.respond(response)
}

pub async fn create(
    request: RequestContext,
    Path(resource): Path<String>,
    FormPayload(payload): FormPayload,
) -> Response {
    let Some(resource_def) = admin_resource(&resource) else {
        return request.respond(unknown_resource(&resource));
    };

    let response = resource_def.create(&request.ctx, payload).await;
    request.respond(response)
}

pub async fn update(
    request: RequestContext,
    Path((resource, id)): Path<(String, String)>,
    FormPayload(payload): FormPayload,
) -> Response {
    let Some(resource_def) = admin_resource(&resource) else {
        return request.respond(unknown_resource(&resource));
    };

    let response = resource_def.update(&request.ctx, &id, payload).await;
    request.respond(response)
}

pub async fn remove(
    request: RequestContext,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    let Some(resource_def) = admin_resource(&resource) else {
        return request.respond(unknown_resource(&resource));
    };

    let response = resource_def.delete(&request.ctx, &id).await;
    request.respond(response)
}
