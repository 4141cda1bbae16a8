//! Generic CRUD actions and the table of backend resources they apply to.

use super::ActionContext;
use crate::models::endpoints::{admin, public, Endpoint};
use crate::models::params::PaginationParams;
use crate::models::response::ActionResponse;
use crate::models::Record;
use crate::services::adapter::{extract_api_data, handle_api_error, handle_api_success, resolve};
use crate::services::http_client::Payload;
use crate::services::render_cache::CacheTag;
use crate::utils::query::build_url;
use std::fmt::Display;
use tracing::info;

#[derive(Debug)]
pub struct AdminResource {
    pub endpoint: Endpoint,
    pub singular: &'static str,
    pub plural: &'static str,
    pub tag: Option<CacheTag>,
    /// Also invalidate `post:<slug>` using the slug of the payload or record.
    pub slug_tagged: bool,
}

impl AdminResource {
    pub async fn list(&self, ctx: &ActionContext, params: &PaginationParams) -> ActionResponse<Record> {
        let url = build_url(&self.endpoint.general(), params);
        let fallback = format!("Failed to fetch {}", self.plural);
        resolve(ctx.admin().get(&url).await, &fallback)
    }

    pub async fn detail(&self, ctx: &ActionContext, id: impl Display) -> ActionResponse<Record> {
        let fallback = format!("Failed to fetch {}", self.singular);
        resolve(ctx.admin().get(&self.endpoint.detail(id)).await, &fallback)
    }

    pub async fn create(&self, ctx: &ActionContext, payload: Payload) -> ActionResponse<Record> {
        let slug = payload.field("slug").map(str::to_string);
        let fallback = format!("Failed to create {}", self.singular);
        let response = resolve(
            ctx.admin().post(&self.endpoint.general(), payload).await,
            &fallback,
        );
        self.after_mutation(ctx, "created", &response, slug.as_deref());
        response
    }

    pub async fn update(
        &self,
        ctx: &ActionContext,
        id: impl Display,
        payload: Payload,
    ) -> ActionResponse<Record> {
        let slug = payload.field("slug").map(str::to_string);
        let fallback = format!("Failed to update {}", self.singular);
        let response = resolve(
            ctx.admin().patch(&self.endpoint.detail(id), payload).await,
            &fallback,
        );
        self.after_mutation(ctx, "updated", &response, slug.as_deref());
        response
    }

    pub async fn delete(&self, ctx: &ActionContext, id: impl Display) -> ActionResponse<()> {
        let fallback = format!("Failed to delete {}", self.singular);
        // Delete envelopes often carry only a message.
        match ctx.admin().delete::<Option<Record>>(&self.endpoint.detail(id)).await {
            Ok(response) => {
                let response = extract_api_data(&response).map(Option::unwrap_or_default);
                self.after_mutation(ctx, "deleted", &response, None);
                match response {
                    ActionResponse::Success { .. } => handle_api_success(),
                    ActionResponse::Failure { error } => ActionResponse::failure(error),
                }
            }
            Err(error) => handle_api_error(&error, &fallback),
        }
    }

    fn after_mutation(
        &self,
        ctx: &ActionContext,
        verb: &str,
        response: &ActionResponse<Record>,
        payload_slug: Option<&str>,
    ) {
        let Some(record) = response.data() else {
            return;
        };
        info!("{} {}", self.singular, verb);

        let mut tags: Vec<CacheTag> = self.tag.iter().cloned().collect();
        if self.slug_tagged {
            let record_slug = record.get("slug").and_then(Record::as_str);
            for slug in [payload_slug, record_slug].into_iter().flatten() {
                let tag = CacheTag::post(slug);
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
        ctx.revalidate(&tags);
    }
}

#[derive(Debug)]
pub struct PublicResource {
    pub endpoint: Endpoint,
    pub singular: &'static str,
    pub plural: &'static str,
    /// Reads without a tag are never invalidated, so they are not cached either.
    pub tag: Option<CacheTag>,
}

impl PublicResource {
    pub async fn list(&self, ctx: &ActionContext, params: &PaginationParams) -> ActionResponse<Record> {
        let url = build_url(&self.endpoint.general(), params);
        let fallback = format!("Failed to fetch {}", self.plural);
        self.cached_get(ctx, url, &fallback).await
    }

    pub async fn detail(&self, ctx: &ActionContext, id: impl Display) -> ActionResponse<Record> {
        let fallback = format!("Failed to fetch {}", self.singular);
        self.cached_get(ctx, self.endpoint.detail(id), &fallback)
            .await
    }

    async fn cached_get(&self, ctx: &ActionContext, path: String, fallback: &str) -> ActionResponse<Record> {
        match &self.tag {
            Some(tag) => {
                let client = ctx.anonymous();
                ctx.render_cache()
                    .get_or_fetch(&path, std::slice::from_ref(tag), || async {
                        resolve(client.get(&path).await, fallback)
                    })
                    .await
            }
            None => resolve(ctx.public().get(&path).await, fallback),
        }
    }
}

pub static BANNERS: AdminResource = AdminResource {
    endpoint: admin::BANNER,
    singular: "banner",
    plural: "banners",
    tag: Some(CacheTag::BANNERS),
    slug_tagged: false,
};

pub static CONFIGS: AdminResource = AdminResource {
    endpoint: admin::CONFIG,
    singular: "config",
    plural: "configs",
    tag: Some(CacheTag::CONFIGS),
    slug_tagged: false,
};

pub static CONTACTS: AdminResource = AdminResource {
    endpoint: admin::CONTACT,
    singular: "contact",
    plural: "contacts",
    tag: Some(CacheTag::CONTACTS),
    slug_tagged: false,
};

pub static DOCTORS: AdminResource = AdminResource {
    endpoint: admin::DOCTOR,
    singular: "doctor",
    plural: "doctors",
    tag: Some(CacheTag::DOCTORS),
    slug_tagged: false,
};

pub static FACILITIES: AdminResource = AdminResource {
    endpoint: admin::FACILITY,
    singular: "facility",
    plural: "facilities",
    tag: Some(CacheTag::FACILITIES),
    slug_tagged: false,
};

pub static INSURANCES: AdminResource = AdminResource {
    endpoint: admin::INSURANCE,
    singular: "insurance",
    plural: "insurances",
    tag: None,
    slug_tagged: false,
};

pub static POSTS: AdminResource = AdminResource {
    endpoint: admin::POST,
    singular: "post",
    plural: "posts",
    tag: Some(CacheTag::POSTS),
    slug_tagged: true,
};

pub static ROOMS: AdminResource = AdminResource {
    endpoint: admin::ROOM,
    singular: "room",
    plural: "rooms",
    tag: Some(CacheTag::ROOMS),
    slug_tagged: false,
};

pub static SPECIALISTS: AdminResource = AdminResource {
    endpoint: admin::SPECIALIST,
    singular: "specialist",
    plural: "specialists",
    tag: Some(CacheTag::DOCTORS),
    slug_tagged: false,
};

pub static USERS: AdminResource = AdminResource {
    endpoint: admin::USER,
    singular: "user",
    plural: "users",
    tag: Some(CacheTag::USERS),
    slug_tagged: false,
};

pub fn admin_resource(plural: &str) -> Option<&'static AdminResource> {
    match plural {
        "banners" => Some(&BANNERS),
        "configs" => Some(&CONFIGS),
        "contacts" => Some(&CONTACTS),
        "doctors" => Some(&DOCTORS),
        "facilities" => Some(&FACILITIES),
        "insurances" => Some(&INSURANCES),
        "posts" => Some(&POSTS),
        "rooms" => Some(&ROOMS),
        "specialists" => Some(&SPECIALISTS),
        "users" => Some(&USERS),
        _ => None,
    }
}

pub static PUBLIC_BANNERS: PublicResource = PublicResource {
    endpoint: public::BANNER,
    singular: "banner",
    plural: "banners",
    tag: Some(CacheTag::BANNERS),
};

pub static PUBLIC_DOCTORS: PublicResource = PublicResource {
    endpoint: public::DOCTOR,
    singular: "doctor",
    plural: "doctors",
    tag: Some(CacheTag::DOCTORS),
};

pub static PUBLIC_SPECIALISTS: PublicResource = PublicResource {
    endpoint: public::SPECIALIST,
    singular: "specialist",
    plural: "specialists",
    tag: Some(CacheTag::DOCTORS),
};

pub static PUBLIC_FACILITIES: PublicResource = PublicResource {
    endpoint: public::FACILITY,
    singular: "facility",
    plural: "facilities",
    tag: Some(CacheTag::FACILITIES),
};

pub static PUBLIC_INSURANCES: PublicResource = PublicResource {
    endpoint: public::INSURANCE,
    singular: "insurance",
    plural: "insurances",
    tag: None,
};

pub static PUBLIC_POSTS: PublicResource = PublicResource {
    endpoint: public::POST,
    singular: "post",
    plural: "posts",
    tag: Some(CacheTag::POSTS),
};

pub static PUBLIC_ROOMS: PublicResource = PublicResource {
    endpoint: public::ROOM,
    singular: "room",
    plural: "rooms",
    tag: Some(CacheTag::ROOMS),
};

pub fn public_resource(plural: &str) -> Option<&'static PublicResource> {
    match plural {
        "banners" => Some(&PUBLIC_BANNERS),
        "doctors" => Some(&PUBLIC_DOCTORS),
        "specialists" => Some(&PUBLIC_SPECIALISTS),
        "facilities" => Some(&PUBLIC_FACILITIES),
        "insurances" => Some(&PUBLIC_INSURANCES),
        "posts" => Some(&PUBLIC_POSTS),
        "rooms" => Some(&PUBLIC_ROOMS),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_matches_declared_names() {
        for name in [
            "banners",
            "configs",
            "contacts",
            "doctors",
            "facilities",
            "insurances",
            "posts",
            "rooms",
            "specialists",
            "users",
        ] {
            let resource = admin_resource(name).unwrap();
            assert_eq!(resource.plural, name);
            assert!(resource.endpoint.general().ends_with(name));
        }
        assert!(admin_resource("patients").is_none());

        for name in ["banners", "doctors", "posts", "insurances"] {
            assert_eq!(public_resource(name).unwrap().plural, name);
        }
        assert!(public_resource("users").is_none());
    }
}
