use super::ActionContext;
use crate::models::endpoints::auth;
use crate::models::response::{ActionResponse, ErrorDetails, ErrorKind};
use crate::models::Record;
use crate::services::adapter::{handle_api_success, resolve};
use crate::services::http_client::Payload;
use crate::services::token_store::{Scope, TokenPair};
use serde_json::json;
use tracing::{info, warn};

/// Tokens are kept in cookies only and stripped from the returned data.
pub async fn login(ctx: &ActionContext, credentials: Payload) -> ActionResponse<Record> {
    let response = resolve(
        ctx.admin().post(auth::LOGIN, credentials).await,
        "Failed to sign in",
    );
    store_tokens(ctx, Scope::Admin, response, "Failed to sign in")
}

pub async fn refresh(ctx: &ActionContext, scope: Scope) -> ActionResponse<Record> {
    let Some(refresh_token) = ctx.tokens().refresh_token(scope) else {
        return ActionResponse::failure(ErrorDetails::new(
            ErrorKind::NotAuthenticated,
            "Session expired",
        ));
    };

    let payload = Payload::Json(json!({ "refresh_token": refresh_token }));
    let response = resolve(
        ctx.client_for(scope).post(auth::REFRESH, payload).await,
        "Failed to refresh session",
    );
    store_tokens(ctx, scope, response, "Failed to refresh session")
}

/// Ends the session of `scope`. Local tokens are cleared even when the
/// backend call fails.
pub async fn logout(ctx: &ActionContext, scope: Scope) -> ActionResponse<()> {
    let result = ctx
        .client_for(scope)
        .post::<Option<Record>>(auth::LOGOUT, Payload::Empty)
        .await;
    if let Err(e) = result {
        warn!("Backend logout failed for {} scope: {}", scope, e);
    }

    ctx.tokens().clear(scope);
    info!("Signed out of {} scope", scope);
    handle_api_success()
}

fn store_tokens(
    ctx: &ActionContext,
    scope: Scope,
    response: ActionResponse<Record>,
    fallback: &str,
) -> ActionResponse<Record> {
    let ActionResponse::Success { data, meta } = response else {
        return response;
    };

    let tokens = match serde_json::from_value::<TokenPair>(data.clone()) {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!("Auth response carried no usable token pair: {}", e);
            return ActionResponse::failure(ErrorDetails::new(ErrorKind::UnknownError, fallback));
        }
    };
    ctx.tokens().set_tokens(scope, tokens);
    info!("Stored new tokens for {} scope", scope);

    ActionResponse::Success {
        data: without_tokens(data),
        meta,
    }
}

fn without_tokens(mut data: Record) -> Record {
    if let Some(object) = data.as_object_mut() {
        object.remove("access_token");
        object.remove("refresh_token");
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_tokens_keeps_profile() {
        let data = json!({
            "access_token": "a",
            "refresh_token": "r",
            "user": { "name": "Admin" }
        });

        assert_eq!(without_tokens(data), json!({ "user": { "name": "Admin" } }));
    }
}
