//! Backend endpoint table.
//!
//! Every resource exposes a `general` path (list/create) and a `detail` path
//! (read/update/delete). Admin endpoints live under `/admin`.

use crate::utils::query::encode_segment;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    base: &'static str,
}

impl Endpoint {
    pub const fn new(base: &'static str) -> Self {
        Self { base }
    }

    pub fn general(&self) -> String {
        self.base.to_string()
    }

    pub fn detail(&self, id: impl Display) -> String {
        format!("{}/{}", self.base, encode_segment(&id.to_string()))
    }

    pub fn find_by(&self, finder: &str, value: &str) -> String {
        format!("{}/{}/{}", self.base, finder, encode_segment(value))
    }
}

pub mod admin {
    use super::Endpoint;

    pub const BANNER: Endpoint = Endpoint::new("/admin/banners");
    pub const CONFIG: Endpoint = Endpoint::new("/admin/configs");
    pub const CONTACT: Endpoint = Endpoint::new("/admin/contacts");
    pub const DOCTOR: Endpoint = Endpoint::new("/admin/doctors");
    pub const FACILITY: Endpoint = Endpoint::new("/admin/facilities");
    pub const INSURANCE: Endpoint = Endpoint::new("/admin/insurances");
    pub const POST: Endpoint = Endpoint::new("/admin/posts");
    pub const ROOM: Endpoint = Endpoint::new("/admin/rooms");
    pub const SPECIALIST: Endpoint = Endpoint::new("/admin/specialists");
    pub const USER: Endpoint = Endpoint::new("/admin/users");
}

pub mod public {
    use super::Endpoint;

    pub const BANNER: Endpoint = Endpoint::new("/banners");
    pub const CONFIG: Endpoint = Endpoint::new("/configs");
    pub const CONTACT: Endpoint = Endpoint::new("/contacts");
    pub const DOCTOR: Endpoint = Endpoint::new("/doctors");
    pub const FACILITY: Endpoint = Endpoint::new("/facilities");
    pub const INSURANCE: Endpoint = Endpoint::new("/insurances");
    pub const POST: Endpoint = Endpoint::new("/posts");
    pub const ROOM: Endpoint = Endpoint::new("/rooms");
    pub const SPECIALIST: Endpoint = Endpoint::new("/specialists");

    pub fn config_by_key(key: &str) -> String {
        CONFIG.find_by("key", key)
    }

    pub fn post_by_slug(slug: &str) -> String {
        POST.find_by("slug", slug)
    }
}

pub mod auth {
    pub const LOGIN: &str = "/auth/login";
    pub const LOGOUT: &str = "/auth/logout";
    pub const REFRESH: &str = "/auth/refresh";
}
