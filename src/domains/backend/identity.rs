//! Per-request backend identity.
//!
//! Callers may route a request to a different ERP instance, or act as a
//! different user, through the `baseurl`, `erptoken` and `userid` headers.
//! Anything they leave out falls back to the process-wide defaults.

use std::fmt;

use crate::core::config::BackendConfig;

/// Header carrying the bearer token for the ERP.
pub const ERP_TOKEN_HEADER: &str = "erptoken";
/// Header overriding the ERP base URL.
pub const BASE_URL_HEADER: &str = "baseurl";
/// Header overriding the ERP user id.
pub const USER_ID_HEADER: &str = "userid";

/// Identity headers as supplied by a caller. Empty values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityHeaders {
    pub erp_token: Option<String>,
    pub base_url: Option<String>,
    pub user_id: Option<String>,
}

impl IdentityHeaders {
    /// Pick the identity headers out of arbitrary `(name, value)` pairs.
    /// Header names are matched case-insensitively.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut headers = Self::default();
        for (name, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let slot = match name.to_ascii_lowercase().as_str() {
                ERP_TOKEN_HEADER => &mut headers.erp_token,
                BASE_URL_HEADER => &mut headers.base_url,
                USER_ID_HEADER => &mut headers.user_id,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }
        headers
    }

    pub fn is_empty(&self) -> bool {
        self.erp_token.is_none() && self.base_url.is_none() && self.user_id.is_none()
    }

    /// The headers to pass through verbatim to the backend.
    fn forwarded(&self) -> Vec<(String, String)> {
        [
            (ERP_TOKEN_HEADER, &self.erp_token),
            (BASE_URL_HEADER, &self.base_url),
            (USER_ID_HEADER, &self.user_id),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name.to_string(), v.clone())))
        .collect()
    }
}

/// Resolved base URL, token and user id for one request.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendIdentity {
    base_url: String,
    auth_token: Option<String>,
    user_id: Option<String>,
    forwarded: Vec<(String, String)>,
}

impl BackendIdentity {
    pub fn new(
        base_url: impl Into<String>,
        auth_token: Option<String>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token,
            user_id,
            forwarded: Vec::new(),
        }
    }

    /// Identity made purely of configured defaults.
    pub fn from_defaults(defaults: &BackendConfig) -> Self {
        Self::new(
            defaults.default_base_url.clone(),
            defaults.default_token.clone(),
            defaults.default_user_id.clone(),
        )
    }

    /// Resolve caller headers against configured defaults.
    pub fn resolve(headers: &IdentityHeaders, defaults: &BackendConfig) -> Self {
        Self {
            base_url: headers
                .base_url
                .clone()
                .unwrap_or_else(|| defaults.default_base_url.clone()),
            auth_token: headers
                .erp_token
                .clone()
                .or_else(|| defaults.default_token.clone()),
            user_id: headers
                .user_id
                .clone()
                .or_else(|| defaults.default_user_id.clone()),
            forwarded: headers.forwarded(),
        }
    }

    /// Add a header sent after the identity headers, overriding them on conflict.
    pub fn with_forwarded_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.forwarded.push((name.into(), value.into()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn forwarded_headers(&self) -> &[(String, String)] {
        &self.forwarded
    }

    /// Full URL of `endpoint` on this identity's backend.
    pub fn url_for(&self, endpoint: &str) -> String {
        match (self.base_url.ends_with('/'), endpoint.starts_with('/')) {
            (true, true) => format!("{}{}", self.base_url, &endpoint[1..]),
            _ => format!("{}{}", self.base_url, endpoint),
        }
    }
}

impl fmt::Debug for BackendIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendIdentity")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("user_id", &self.user_id)
            .field(
                "forwarded",
                &self.forwarded.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> BackendConfig {
        BackendConfig {
            default_base_url: "https://erp.default".to_string(),
            default_token: Some("default-token".to_string()),
            default_user_id: Some("7".to_string()),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_headers_from_pairs() {
        let headers = IdentityHeaders::from_pairs([
            ("ErpToken", "abc"),
            ("baseurl", "https://tenant.erp"),
            ("userid", "  "),
            ("content-type", "application/json"),
        ]);

        assert_eq!(headers.erp_token.as_deref(), Some("abc"));
        assert_eq!(headers.base_url.as_deref(), Some("https://tenant.erp"));
        assert_eq!(headers.user_id, None);
    }

    #[test]
    fn test_resolve_falls_back_to_defaults() {
        let identity = BackendIdentity::resolve(&IdentityHeaders::default(), &defaults());

        assert_eq!(identity.base_url(), "https://erp.default");
        assert_eq!(identity.auth_token(), Some("default-token"));
        assert_eq!(identity.user_id(), Some("7"));
        assert!(identity.forwarded_headers().is_empty());
    }

    #[test]
    fn test_resolve_prefers_headers() {
        let headers = IdentityHeaders {
            erp_token: Some("caller-token".to_string()),
            base_url: Some("https://tenant.erp".to_string()),
            user_id: Some("99".to_string()),
        };
        let identity = BackendIdentity::resolve(&headers, &defaults());

        assert_eq!(identity.base_url(), "https://tenant.erp");
        assert_eq!(identity.auth_token(), Some("caller-token"));
        assert_eq!(identity.user_id(), Some("99"));
        assert_eq!(identity.forwarded_headers().len(), 3);
    }

    #[test]
    fn test_url_for_joins_slashes() {
        let identity = BackendIdentity::new("https://erp/", None, None);
        assert_eq!(identity.url_for("/api/v1/items"), "https://erp/api/v1/items");

        let identity = BackendIdentity::new("https://erp", None, None);
        assert_eq!(identity.url_for("/api/v1/items"), "https://erp/api/v1/items");
    }

    #[test]
    fn test_debug_redacts_token() {
        let identity = BackendIdentity::new("https://erp", Some("secret".to_string()), None);
        let debug_str = format!("{:?}", identity);
        assert!(!debug_str.contains("secret"));
        assert!(debug_str.contains("REDACTED"));
    }
}
