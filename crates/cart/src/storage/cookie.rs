//! Client storage in a cookie.
//!
//! The adapter is built from the request's `Cookie` header and collects any
//! change as a `Set-Cookie` value the response layer appends.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Cookie, CookieJar, SameSite};

use cartwright_core::CartGuid;

use super::{ClientCartStorage, parse_stored_guid};
use crate::config::CookieConfig;
use crate::error::Result;

/// Stores the cart GUID in a long-lived cookie.
#[derive(Debug)]
pub struct CookieCartStorage {
    config: CookieConfig,
    jar: Mutex<CookieJar>,
}

impl CookieCartStorage {
    /// Create storage with no request cookies.
    #[must_use]
    pub fn new(config: CookieConfig) -> Self {
        Self {
            config,
            jar: Mutex::new(CookieJar::new()),
        }
    }

    /// Create storage seeded from a raw `Cookie` request header.
    ///
    /// Malformed pairs are skipped.
    #[must_use]
    pub fn from_header(config: CookieConfig, header: &str) -> Self {
        let mut jar = CookieJar::new();
        for cookie in Cookie::split_parse(header).filter_map(std::result::Result::ok) {
            jar.add_original(cookie.into_owned());
        }
        Self {
            config,
            jar: Mutex::new(jar),
        }
    }

    /// `Set-Cookie` header values for every cookie changed during the request.
    pub async fn set_cookie_headers(&self) -> Vec<String> {
        let jar = self.jar.lock().await;
        jar.delta().map(ToString::to_string).collect()
    }

    fn build_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((self.config.name.clone(), value))
            .path("/")
            .http_only(true)
            .secure(self.config.secure)
            .same_site(SameSite::Lax)
            .max_age(Duration::days(self.config.max_age_days))
            .build()
    }
}

#[async_trait]
impl ClientCartStorage for CookieCartStorage {
    async fn cart_guid(&self) -> Result<Option<CartGuid>> {
        let jar = self.jar.lock().await;
        Ok(jar
            .get(&self.config.name)
            .and_then(|cookie| parse_stored_guid(cookie.value())))
    }

    async fn set_cart_guid(&self, guid: Option<CartGuid>) -> Result<()> {
        let mut jar = self.jar.lock().await;
        match guid.and_then(CartGuid::non_empty) {
            Some(guid) => jar.add(self.build_cookie(guid.to_string())),
            None => {
                if jar.get(&self.config.name).is_some() {
                    jar.remove(self.build_cookie(String::new()));
                }
            }
        }
        Ok(())
    }
}
