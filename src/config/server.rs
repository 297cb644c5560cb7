use std::{net::IpAddr, str::FromStr, time::Duration};

use http::{HeaderName, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Largest accepted request body. Submissions carry text content and
    /// quiz answers, never uploads.
    pub body_limit_bytes: usize,
    pub timeout_secs: u64,
    pub cors: CorsConfig,
    pub security_headers: SecurityHeadersConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
            body_limit_bytes: 10 * 1024 * 1024,
            timeout_secs: 30,
            cors: CorsConfig::default(),
            security_headers: SecurityHeadersConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[server.cors]`.
///
/// The browser frontend is usually served from a different origin than the
/// API, so it must be listed in `allowed_origins` for cookie-based sessions
/// to work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    pub enabled: bool,
    /// `["*"]` allows any origin but disables credentials.
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: Vec::new(),
            allowed_methods: ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
                .map(String::from)
                .to_vec(),
            allowed_headers: ["Content-Type", "Authorization", "X-Request-Id"]
                .map(String::from)
                .to_vec(),
            allow_credentials: true,
            max_age_secs: 24 * 60 * 60,
        }
    }
}

impl CorsConfig {
    fn is_wildcard(&self) -> bool {
        matches!(self.allowed_origins.as_slice(), [only] if only == "*")
    }

    /// Build the CORS layer, or `None` when CORS is disabled.
    ///
    /// An empty origin list rejects every cross-origin request.
    pub fn to_layer(&self) -> Option<CorsLayer> {
        if !self.enabled {
            tracing::debug!("CORS is disabled");
            return None;
        }

        let allow_origin = if self.is_wildcard() {
            tracing::warn!("CORS allows any origin; session cookies will not be sent cross-origin");
            AllowOrigin::any()
        } else {
            if self.allowed_origins.is_empty() {
                tracing::info!("No CORS origins configured, cross-origin requests will be rejected");
            }
            AllowOrigin::list(parse_all::<HeaderValue>(&self.allowed_origins, "origin"))
        };

        let layer = CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(AllowMethods::list(parse_all::<Method>(
                &self.allowed_methods,
                "method",
            )))
            .allow_headers(AllowHeaders::list(parse_all::<HeaderName>(
                &self.allowed_headers,
                "header",
            )))
            .max_age(Duration::from_secs(self.max_age_secs));

        // Browsers refuse credentials with a wildcard origin.
        Some(layer.allow_credentials(self.allow_credentials && !self.is_wildcard()))
    }
}

/// Parse every entry, skipping (and logging) the ones that don't parse.
fn parse_all<T: FromStr>(values: &[String], kind: &str) -> Vec<T> {
    values
        .iter()
        .filter_map(|value| {
            let parsed = value.parse().ok();
            if parsed.is_none() {
                tracing::warn!(kind, value = %value, "Skipping invalid CORS entry");
            }
            parsed
        })
        .collect()
}

/// `[server.security_headers]`, added to every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityHeadersConfig {
    pub enabled: bool,
    pub content_type_options: String,
    /// `None` omits X-Frame-Options.
    pub frame_options: Option<String>,
    /// `None` omits Referrer-Policy.
    pub referrer_policy: Option<String>,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            content_type_options: "nosniff".to_string(),
            frame_options: Some("DENY".to_string()),
            referrer_policy: Some("no-referrer".to_string()),
        }
    }
}
