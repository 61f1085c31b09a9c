//! Page model
//!
//! A page is a title plus raw body bytes. Titles are restricted to ASCII
//! alphanumerics so they can be used directly as file names.

mod store;

pub use store::{PageStore, StoreError};

use std::fmt;

/// Validated page title (`[A-Za-z0-9]+`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    /// Parse an untrusted path segment into a title
    ///
    /// Returns `None` for the empty string or any character outside
    /// `[A-Za-z0-9]`, which rules out separators, dots and percent-escapes.
    pub fn parse(raw: &str) -> Option<Self> {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory page, built per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: Title,
    pub body: Vec<u8>,
}

impl Page {
    pub const fn new(title: Title, body: Vec<u8>) -> Self {
        Self { title, body }
    }

    /// Page with an empty body, used when authoring a page that does not exist yet
    pub const fn blank(title: Title) -> Self {
        Self::new(title, Vec::new())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

    /// Fresh, empty directory for one test
    pub(crate) fn scratch_dir(name: &str) -> PathBuf {
        let n = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "wiki_server-{name}-{}-{n}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn test_title_accepts_alphanumerics() {
        for raw in ["FrontPage", "a", "Z9", "123", "abcXYZ0189"] {
            let title = Title::parse(raw).expect("valid title");
            assert_eq!(title.as_str(), raw);
        }
    }

    #[test]
    fn test_title_rejects_illegal_input() {
        for raw in [
            "",
            "..",
            "../etc/passwd",
            "a/b",
            "a.txt",
            "with space",
            "dash-ed",
            "under_score",
            "%2e%2e",
            "caf\u{e9}",
        ] {
            assert!(Title::parse(raw).is_none(), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_blank_page() {
        let page = Page::blank(Title::parse("New").unwrap());
        assert_eq!(page.title.to_string(), "New");
        assert!(page.body.is_empty());
    }
}
