//! Redirect targets returned by controller actions.

use crate::session::{FlashBag, MessageKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Default redirect status code.
pub const FOUND: u16 = 302;

fn absolute_url() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^(?:f|ht)tps?://").expect("url pattern is valid"))
}

/// A resolved redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    /// Absolute target URL.
    pub location: String,
    /// HTTP status code.
    pub status: u16,
}

impl Redirect {
    /// Redirect to `url`. Relative URLs are resolved against `base_url`.
    pub fn to(url: &str, base_url: &str) -> Self {
        let location = if absolute_url().is_match(url) {
            url.to_string()
        } else {
            format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                url.trim_start_matches('/')
            )
        };
        Self {
            location,
            status: FOUND,
        }
    }

    /// Redirect after storing a flash message for the next request.
    pub fn with_message(
        url: &str,
        base_url: &str,
        flash: &mut FlashBag,
        message: impl Into<String>,
        kind: MessageKind,
    ) -> Self {
        flash.set(message, kind);
        Self::to(url, base_url)
    }

    /// Use a different status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_url_joins_base() {
        let r = Redirect::to("/users/5", "https://app.test");
        assert_eq!(r.location, "https://app.test/users/5");
        assert_eq!(r.status, 302);

        let r = Redirect::to("login", "https://app.test/");
        assert_eq!(r.location, "https://app.test/login");
    }

    #[test]
    fn test_absolute_urls_kept() {
        for url in ["http://a.test/x", "HTTPS://a.test", "ftp://files.test", "ftps://f.test"] {
            assert_eq!(Redirect::to(url, "https://app.test").location, url);
        }
        assert_eq!(
            Redirect::to("mailto:x@y.z", "https://app.test").location,
            "https://app.test/mailto:x@y.z"
        );
    }

    #[test]
    fn test_with_message_sets_flash() {
        let mut flash = FlashBag::new();
        let r = Redirect::with_message("/", "https://app.test", &mut flash, "Saved", MessageKind::Success)
            .with_status(303);

        assert_eq!(r.status, 303);
        assert_eq!(r.location, "https://app.test/");
        assert_eq!(flash.take().unwrap().message, "Saved");
    }
}
