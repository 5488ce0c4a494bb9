use std::sync::LazyLock;

use regex::Regex;

static SHARE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://(1024terabox|freeterabox|teraboxapp)\.com/s/[^\s]+")
        .expect("Regex will always be valid")
});

/// Cheap pre-check: does this text even talk about the supported host?
pub fn mentions_host(text: &str) -> bool {
    text.contains("terabox")
}

/// The first supported share link in `text`, if there is one.
pub fn find_share_link(text: &str) -> Option<&str> {
    SHARE_LINK.find(text).map(|found| found.as_str())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn finds_share_links_on_every_supported_host() {
        for host in ["1024terabox", "freeterabox", "teraboxapp"] {
            let text = format!("watch this https://{host}.com/s/abc123 please");
            assert_eq!(
                find_share_link(&text).unwrap(),
                format!("https://{host}.com/s/abc123")
            );
        }
    }

    #[test]
    fn link_ends_at_whitespace() {
        let text = "https://teraboxapp.com/s/1aBcD-xyz and more words";
        assert_eq!(find_share_link(text).unwrap(), "https://teraboxapp.com/s/1aBcD-xyz");
    }

    #[test]
    fn unsupported_links_are_ignored() {
        assert_eq!(find_share_link("https://example.com/s/abc123"), None);
        assert_eq!(find_share_link("terabox is great"), None);
        // Mentioning the host is not the same as linking to it.
        assert!(mentions_host("terabox is great"));
        assert!(!mentions_host("hello there"));
    }
}
