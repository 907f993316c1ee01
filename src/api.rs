//! HTTP resource client for the catalog backend.
//!
//! Thin request/response mapping over `ureq` with no business logic. The
//! [`ProductBackend`] and [`UserBackend`] traits are the seam the stores
//! depend on, so tests can substitute an in-memory backend.

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;

use crate::model::{CreateProductRequest, Product, UpdateProductRequest, User};

/// Remote operations on the product resource.
pub trait ProductBackend {
    fn list(&self) -> Result<Vec<Product>>;
    fn get(&self, id: u64) -> Result<Product>;
    fn create(&self, req: &CreateProductRequest) -> Result<Product>;
    fn update(&self, id: u64, req: &UpdateProductRequest) -> Result<Product>;
    fn delete(&self, id: u64) -> Result<()>;
}

/// Remote operations on the user resource.
pub trait UserBackend {
    fn list(&self) -> Result<Vec<User>>;
    fn get(&self, id: u64) -> Result<User>;
    fn delete(&self, id: u64) -> Result<()>;
    fn toggle_status(&self, id: u64) -> Result<User>;
}

/// Blocking HTTP client bound to one backend base URL.
///
/// No authentication, no timeouts: a hung request leaves the caller pending,
/// matching the backend contract this tool was written against.
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
    products_path: String,
    users_path: String,
    debug: bool,
}

impl ApiClient {
    pub fn new(base_url: &str, products_path: &str, users_path: &str, debug: bool) -> Self {
        Self {
            agent: ureq::Agent::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            products_path: products_path.trim_matches('/').to_string(),
            users_path: users_path.trim_matches('/').to_string(),
            debug,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn trace(&self, method: &str, url: &str) {
        if self.debug {
            eprintln!("[DEBUG] {} {}", method, url);
        }
    }

    /// Run a request and decode the JSON body, mapping HTTP status errors
    /// into readable failures. A missing or `null` body decodes via the
    /// `default` fallback (the backend returns `null` for empty lists).
    fn decode<T: DeserializeOwned>(
        resp: std::result::Result<ureq::Response, ureq::Error>,
        default: Option<fn() -> T>,
    ) -> Result<T> {
        match resp {
            Ok(r) => {
                let body = r.into_string()?;
                let trimmed = body.trim();
                if trimmed.is_empty() || trimmed == "null" {
                    if let Some(f) = default {
                        return Ok(f());
                    }
                }
                serde_json::from_str(trimmed)
                    .map_err(|e| anyhow!("Malformed response body: {}", e))
            }
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(anyhow!("API error {}: {}", code, body))
            }
            Err(e) => Err(anyhow!("Request failed: {}", e)),
        }
    }

    /// Run a request where the response body is irrelevant (DELETE).
    fn expect_ok(resp: std::result::Result<ureq::Response, ureq::Error>) -> Result<()> {
        match resp {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(anyhow!("API error {}: {}", code, body))
            }
            Err(e) => Err(anyhow!("Request failed: {}", e)),
        }
    }
}

impl ProductBackend for ApiClient {
    fn list(&self) -> Result<Vec<Product>> {
        let url = self.url(&self.products_path);
        self.trace("GET", &url);
        Self::decode(self.agent.get(&url).call(), Some(Vec::new))
    }

    fn get(&self, id: u64) -> Result<Product> {
        let url = self.url(&format!("{}/{}", self.products_path, id));
        self.trace("GET", &url);
        Self::decode(self.agent.get(&url).call(), None)
    }

    fn create(&self, req: &CreateProductRequest) -> Result<Product> {
        let url = self.url(&self.products_path);
        self.trace("POST", &url);
        Self::decode(
            self.agent.post(&url).send_json(serde_json::to_value(req)?),
            None,
        )
    }

    fn update(&self, id: u64, req: &UpdateProductRequest) -> Result<Product> {
        let url = self.url(&format!("{}/{}", self.products_path, id));
        self.trace("PUT", &url);
        Self::decode(
            self.agent.put(&url).send_json(serde_json::to_value(req)?),
            None,
        )
    }

    fn delete(&self, id: u64) -> Result<()> {
        let url = self.url(&format!("{}/{}", self.products_path, id));
        self.trace("DELETE", &url);
        Self::expect_ok(self.agent.delete(&url).call())
    }
}

impl UserBackend for ApiClient {
    fn list(&self) -> Result<Vec<User>> {
        let url = self.url(&self.users_path);
        self.trace("GET", &url);
        Self::decode(self.agent.get(&url).call(), Some(Vec::new))
    }

    fn get(&self, id: u64) -> Result<User> {
        let url = self.url(&format!("{}/{}", self.users_path, id));
        self.trace("GET", &url);
        Self::decode(self.agent.get(&url).call(), None)
    }

    fn delete(&self, id: u64) -> Result<()> {
        let url = self.url(&format!("{}/{}", self.users_path, id));
        self.trace("DELETE", &url);
        Self::expect_ok(self.agent.delete(&url).call())
    }

    fn toggle_status(&self, id: u64) -> Result<User> {
        let url = self.url(&format!("{}/{}/toggle-status", self.users_path, id));
        self.trace("PATCH", &url);
        Self::decode(
            self.agent
                .request("PATCH", &url)
                .send_json(serde_json::json!({})),
            None,
        )
    }
}
