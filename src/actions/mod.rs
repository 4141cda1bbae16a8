//! Server actions: one call per backend resource and verb.
//!
//! Actions never fail across their boundary; every outcome is an
//! [`ActionResponse`](crate::models::response::ActionResponse).

pub mod auth;
pub mod configs;
pub mod contacts;
pub mod doctors;
pub mod posts;
pub mod resources;

use crate::services::http_client::{ApiClient, ScopedClient};
use crate::services::render_cache::{CacheTag, RenderCache};
use crate::services::token_store::{Scope, TokenStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct ActionContext {
    client: ApiClient,
    tokens: Arc<dyn TokenStore>,
    render_cache: Arc<RenderCache>,
}

impl ActionContext {
    pub fn new(
        client: ApiClient,
        tokens: Arc<dyn TokenStore>,
        render_cache: Arc<RenderCache>,
    ) -> Self {
        Self {
            client,
            tokens,
            render_cache,
        }
    }

    pub fn admin(&self) -> ScopedClient {
        self.client.scoped(Scope::Admin, self.tokens.clone())
    }

    pub fn public(&self) -> ScopedClient {
        self.client.scoped(Scope::Public, self.tokens.clone())
    }

    pub fn anonymous(&self) -> ScopedClient {
        self.client.anonymous()
    }

    pub fn client_for(&self, scope: Scope) -> ScopedClient {
        self.client.scoped(scope, self.tokens.clone())
    }

    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    pub fn render_cache(&self) -> &RenderCache {
        &self.render_cache
    }

    pub fn revalidate(&self, tags: &[CacheTag]) {
        for tag in tags {
            self.render_cache.revalidate_tag(tag);
        }
    }
}
