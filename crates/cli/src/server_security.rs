use anyhow::{Context as AnyhowContext, Result};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use std::net::SocketAddr;

pub(crate) const AUTH_TOKEN_ENV: &str = "TALLY_AUTH_TOKEN";

/// Shared secret expected as `Authorization: Bearer <token>`.
#[derive(Clone, Debug)]
pub(crate) struct AuthToken {
    token: String,
}

impl AuthToken {
    /// `--auth-token` wins over the environment; blank values are an error, absence is not.
    pub(crate) fn from_flag_or_env(flag: Option<&str>) -> Result<Option<Self>> {
        let raw = match flag {
            Some(value) => Some(value.to_string()),
            None => std::env::var(AUTH_TOKEN_ENV).ok(),
        };
        let Some(raw) = raw else {
            return Ok(None);
        };

        let token = raw.trim();
        if token.is_empty() {
            anyhow::bail!("auth token must be non-empty")
        }
        Ok(Some(Self {
            token: token.to_string(),
        }))
    }

    pub(crate) fn accepts(&self, headers: &HeaderMap) -> bool {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().strip_prefix("Bearer "))
            .is_some_and(|presented| constant_time_eq(presented.trim(), &self.token))
    }
}

/// Where the server may listen and what it demands from callers.
#[derive(Debug)]
pub(crate) struct ServerGuard {
    pub(crate) addrs: Vec<SocketAddr>,
    pub(crate) auth: Option<AuthToken>,
}

impl ServerGuard {
    /// Non-loopback binds need `public`, and `public` needs a token.
    pub(crate) async fn resolve(bind: &str, public: bool, token_flag: Option<&str>) -> Result<Self> {
        let auth = AuthToken::from_flag_or_env(token_flag)?;
        if public && auth.is_none() {
            anyhow::bail!("--public requires an auth token: set --auth-token or export {AUTH_TOKEN_ENV}");
        }

        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(bind)
            .await
            .with_context(|| format!("Failed to resolve bind address: {bind}"))?
            .collect();
        if addrs.is_empty() {
            anyhow::bail!("Bind address resolved to zero socket addrs: {bind}")
        }

        if !public && addrs.iter().any(|addr| !addr.ip().is_loopback()) {
            anyhow::bail!(
                "Refusing to bind to non-loopback address without --public: {bind}. To expose the chat endpoint, pass --public and set {AUTH_TOKEN_ENV} (or --auth-token)."
            )
        }

        Ok(Self { addrs, auth })
    }

    pub(crate) fn authorize(&self, headers: &HeaderMap) -> bool {
        self.auth.as_ref().map_or(true, |token| token.accepts(headers))
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |diff, (x, y)| diff | (x ^ y))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn bearer(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn token_matches_only_bearer_header() {
        let token = AuthToken::from_flag_or_env(Some("  secret  "))
            .unwrap()
            .unwrap();
        assert!(token.accepts(&bearer("Bearer secret")));
        assert!(token.accepts(&bearer("Bearer  secret  ")));
        assert!(!token.accepts(&bearer("secret")));
        assert!(!token.accepts(&bearer("Bearer wrong")));
        assert!(!token.accepts(&HeaderMap::new()));
    }

    #[test]
    fn blank_token_flag_is_rejected() {
        assert!(AuthToken::from_flag_or_env(Some("   ")).is_err());
    }

    #[test]
    fn constant_time_eq_compares_whole_strings() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
    }

    #[tokio::test]
    async fn bind_guard_requires_public_for_non_loopback() {
        let guard = ServerGuard::resolve("127.0.0.1:0", false, None).await.unwrap();
        assert!(guard.addrs.iter().all(|addr| addr.ip().is_loopback()));

        assert!(ServerGuard::resolve("0.0.0.0:0", false, None).await.is_err());
        ServerGuard::resolve("0.0.0.0:0", true, Some("secret"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn public_with_blank_token_is_refused() {
        let err = ServerGuard::resolve("127.0.0.1:0", true, Some(" "))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[tokio::test]
    async fn guard_checks_header_only_when_token_set() {
        let guard = ServerGuard::resolve("127.0.0.1:0", false, Some("t")).await.unwrap();
        assert!(!guard.authorize(&HeaderMap::new()));
        assert!(guard.authorize(&bearer("Bearer t")));

        let open = ServerGuard {
            addrs: guard.addrs.clone(),
            auth: None,
        };
        assert!(open.authorize(&HeaderMap::new()));
    }
}
