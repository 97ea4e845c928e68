//! Username/password credentials for http(s) remotes.

use std::fmt;

/// Credentials for one network operation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Puts the credentials into the authority of an http(s) URL, replacing
    /// any user info already there. Other URLs are returned unchanged.
    pub fn inject(&self, url: &str) -> String {
        let Some((scheme, rest)) = split_http(url) else {
            return url.to_string();
        };
        let host = strip_userinfo(rest);
        format!(
            "{scheme}://{}:{}@{host}",
            encode_userinfo(&self.username),
            encode_userinfo(&self.password)
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Removes user info from an http(s) URL so it can be logged.
pub fn redact_url(url: &str) -> String {
    match split_http(url) {
        Some((scheme, rest)) => format!("{scheme}://{}", strip_userinfo(rest)),
        None => url.to_string(),
    }
}

fn split_http(url: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = url.split_once("://")?;
    (scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"))
        .then_some((scheme, rest))
}

fn strip_userinfo(rest: &str) -> &str {
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => &rest[at + 1..],
        None => rest,
    }
}

fn encode_userinfo(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}
