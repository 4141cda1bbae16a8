use super::resources::{PUBLIC_DOCTORS, PUBLIC_SPECIALISTS};
use super::ActionContext;
use crate::models::params::PaginationParams;
use crate::models::response::ActionResponse;
use crate::models::Record;
use crate::services::query_cache::{QueryClient, QueryKey};
use crate::utils::query::build_url;
use futures::future::join;
use serde_json::json;

pub async fn get_doctors_page(
    ctx: &ActionContext,
    queries: &QueryClient,
    params: &PaginationParams,
) -> ActionResponse<Record> {
    let specialist_params = PaginationParams::new().sort("name");

    let doctors_key = QueryKey::new("doctors").with(build_url(
        &PUBLIC_DOCTORS.endpoint.general(),
        params,
    ));
    let specialists_key = QueryKey::new("specialists").with(build_url(
        &PUBLIC_SPECIALISTS.endpoint.general(),
        &specialist_params,
    ));

    let (doctors, specialists) = join(
        queries.fetch_query(doctors_key, || PUBLIC_DOCTORS.list(ctx, params)),
        queries.fetch_query(specialists_key, || {
            PUBLIC_SPECIALISTS.list(ctx, &specialist_params)
        }),
    )
    .await;

    match (doctors, specialists) {
        (Ok(doctors), Ok(specialists)) => ActionResponse::Success {
            data: json!({
                "doctors": doctors.data,
                "specialists": specialists.data,
            }),
            meta: doctors.meta,
        },
        (Err(error), _) | (_, Err(error)) => ActionResponse::failure(error.details),
    }
}
