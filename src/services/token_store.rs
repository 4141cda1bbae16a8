use axum::http::{HeaderMap, HeaderValue};
use headers::{Cookie, HeaderMapExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Admin,
    Public,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Admin => "admin",
            Scope::Public => "public",
        }
    }

    pub fn access_cookie(&self) -> &'static str {
        match self {
            Scope::Admin => "admin_access_token",
            Scope::Public => "public_access_token",
        }
    }

    pub fn refresh_cookie(&self) -> &'static str {
        match self {
            Scope::Admin => "admin_refresh_token",
            Scope::Public => "public_refresh_token",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub trait TokenStore: Send + Sync {
    fn access_token(&self, scope: Scope) -> Option<String>;
    fn refresh_token(&self, scope: Scope) -> Option<String>;
    fn set_tokens(&self, scope: Scope, tokens: TokenPair);
    fn clear(&self, scope: Scope);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CookieWrite {
    Set { name: &'static str, value: String },
    Remove { name: &'static str },
}

#[derive(Debug, Default)]
struct CookieJar {
    values: HashMap<&'static str, String>,
    pending: Vec<CookieWrite>,
}

/// Writes are visible to later reads in the same request and queued as
/// `Set-Cookie` headers for the response.
#[derive(Debug)]
pub struct CookieTokenStore {
    jar: Mutex<CookieJar>,
    secure: bool,
}

impl CookieTokenStore {
    pub fn empty(secure: bool) -> Self {
        Self {
            jar: Mutex::new(CookieJar::default()),
            secure,
        }
    }

    pub fn from_headers(headers: &HeaderMap, secure: bool) -> Self {
        let mut jar = CookieJar::default();

        if let Some(cookie) = headers.typed_get::<Cookie>() {
            for scope in [Scope::Admin, Scope::Public] {
                for name in [scope.access_cookie(), scope.refresh_cookie()] {
                    if let Some(value) = cookie.get(name).filter(|v| !v.is_empty()) {
                        jar.values.insert(name, value.to_string());
                    }
                }
            }
        }

        Self {
            jar: Mutex::new(jar),
            secure,
        }
    }

    /// Drains queued writes as `Set-Cookie` header values.
    pub fn take_set_cookie_headers(&self) -> Vec<HeaderValue> {
        let pending = std::mem::take(&mut self.lock().pending);

        pending
            .into_iter()
            .filter_map(|write| {
                let raw = self.render(&write);
                match HeaderValue::from_str(&raw) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!("Dropping cookie that is not a valid header value: {}", e);
                        None
                    }
                }
            })
            .collect()
    }

    fn render(&self, write: &CookieWrite) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        match write {
            CookieWrite::Set { name, value } => {
                format!("{}={}; Path=/; HttpOnly; SameSite=Lax{}", name, value, secure)
            }
            CookieWrite::Remove { name } => {
                format!(
                    "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
                    name, secure
                )
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CookieJar> {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for CookieTokenStore {
    fn access_token(&self, scope: Scope) -> Option<String> {
        self.lock().values.get(scope.access_cookie()).cloned()
    }

    fn refresh_token(&self, scope: Scope) -> Option<String> {
        self.lock().values.get(scope.refresh_cookie()).cloned()
    }

    fn set_tokens(&self, scope: Scope, tokens: TokenPair) {
        let mut jar = self.lock();
        for (name, value) in [
            (scope.access_cookie(), tokens.access_token),
            (scope.refresh_cookie(), tokens.refresh_token),
        ] {
            jar.values.insert(name, value.clone());
            jar.pending.push(CookieWrite::Set { name, value });
        }
    }

    fn clear(&self, scope: Scope) {
        let mut jar = self.lock();
        for name in [scope.access_cookie(), scope.refresh_cookie()] {
            jar.values.remove(name);
            jar.pending.push(CookieWrite::Remove { name });
        }
    }
}
