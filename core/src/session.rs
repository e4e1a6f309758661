//! Cookie-backed session token.
//!
//! The token is opaque: it is read from a cookie, attached verbatim as the
//! `Authorization` header (no `Bearer` prefix) and cleared on logout or when
//! the server rejects it. There is no expiry or refresh handling.

use crate::http::HttpRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    cookie_name: String,
    token: Option<String>,
}

impl Session {
    pub fn new(cookie_name: &str) -> Self {
        Self {
            cookie_name: cookie_name.to_string(),
            token: None,
        }
    }

    /// Restore a session from a `Cookie` header value such as
    /// `theme=dark; accessToken=abc`.
    pub fn from_cookie_header(cookie_name: &str, header: &str) -> Self {
        let token = header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == cookie_name)
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty());
        Self {
            cookie_name: cookie_name.to_string(),
            token,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string()).filter(|t| !t.is_empty());
    }

    pub fn clear(&mut self) {
        self.token = None;
    }

    /// `Set-Cookie` value persisting the token, if any.
    pub fn set_cookie(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|token| format!("{}={token}; Path=/", self.cookie_name))
    }

    /// `Set-Cookie` value that removes the token cookie.
    pub fn removal_cookie(&self) -> String {
        format!("{}=; Path=/; Max-Age=0", self.cookie_name)
    }

    /// Attach the token to `request`. Without a token the request is left
    /// untouched.
    pub fn authorize(&self, request: &mut HttpRequest) {
        if let Some(token) = &self.token {
            request.set_header("authorization", token.clone());
        }
    }
}
