// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Hosts (and exact host paths) where provider injection is forbidden.
//!
//! ## Matching
//!
//! An entry covers its host and every strict dot-suffix subdomain of it, so
//! `https://dropbox.com/` blocks `dropbox.com` and `evil.dropbox.com` but not
//! `not-dropbox.com`.
//!
//! | Entry path | Blocks |
//! |------------|--------|
//! | `/` | every path in the host family |
//! | anything else | only that exact path in the host family |
//!
//! Entries are URLs without a query string or fragment. An entry carrying
//! either is rejected at load time instead of being matched loosely.

use thiserror::Error;
use url::Url;

/// Hosts blocked unless the deployment supplies its own list.
pub const DEFAULT_DENYLIST: &[&str] = &[
    "https://execution.consensys.io/",
    "https://sharefile.com/",
    "https://dropbox.com/",
    "https://ipfs.io/",
    "https://adyen.com/",
    "https://gravityforms.com/",
    "https://harbourair.com/",
    "https://ani.gamer.com.tw/",
    "https://blueskybooking.com/",
    "https://battle.net/",
];

/// File suffixes whose documents never receive a provider.
pub const BLOCKED_FILE_SUFFIXES: &[&str] = &[".xml", ".pdf"];

/// Configuration error raised while loading a denylist entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenylistError {
    #[error("Invalid denylist entry `{entry}`: not a URL ({reason})")]
    Unparseable { entry: String, reason: String },

    #[error("Invalid denylist entry `{entry}`: no host")]
    MissingHost { entry: String },

    #[error("Invalid denylist entry `{entry}`: query strings and fragments are not supported")]
    QueryOrFragment { entry: String },
}

/// One denylisted host family, optionally narrowed to a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenylistEntry {
    host: String,
    path: String,
}

impl DenylistEntry {
    /// Parse an entry such as `https://dropbox.com/` or `example.org/checkout`.
    ///
    /// Bare hosts are read as `https://` URLs.
    pub fn parse(raw: &str) -> Result<Self, DenylistError> {
        let trimmed = raw.trim();
        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        let url = Url::parse(&candidate).map_err(|e| DenylistError::Unparseable {
            entry: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        if url.query().is_some() || url.fragment().is_some() {
            return Err(DenylistError::QueryOrFragment {
                entry: trimmed.to_string(),
            });
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| DenylistError::MissingHost {
                entry: trimmed.to_string(),
            })?
            .to_ascii_lowercase();

        Ok(Self {
            host,
            path: url.path().to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the entry covers the whole host family.
    pub fn is_root(&self) -> bool {
        self.path == "/"
    }

    /// `host` equals the entry host or is a strict dot-suffix subdomain of it.
    pub fn matches_host(&self, host: &str) -> bool {
        if host == self.host {
            return true;
        }
        host.strip_suffix(self.host.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
    }

    /// Whether a page at `host` + `path` is blocked by this entry.
    pub fn blocks(&self, host: &str, path: &str) -> bool {
        self.matches_host(host) && (self.is_root() || path == self.path)
    }
}

/// The full set of denylisted host families.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Denylist {
    entries: Vec<DenylistEntry>,
}

impl Denylist {
    /// Parse every entry, failing on the first invalid one.
    pub fn parse<I, S>(entries: I) -> Result<Self, DenylistError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|raw| DenylistEntry::parse(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// The built-in list from [`DEFAULT_DENYLIST`].
    pub fn builtin() -> Self {
        Self {
            entries: DEFAULT_DENYLIST
                .iter()
                .filter_map(|raw| DenylistEntry::parse(raw).ok())
                .collect(),
        }
    }

    pub fn entries(&self) -> &[DenylistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry blocks `host` + `path`. `host` must already be lowercase.
    pub fn blocks(&self, host: &str, path: &str) -> bool {
        self.entries.iter().any(|entry| entry.blocks(host, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_entries_all_parse() {
        assert_eq!(Denylist::builtin().len(), DEFAULT_DENYLIST.len());
    }

    #[test]
    fn bare_host_is_read_as_root_entry() {
        let entry = DenylistEntry::parse("Dropbox.com").unwrap();
        assert_eq!(entry.host(), "dropbox.com");
        assert!(entry.is_root());
    }

    #[test]
    fn query_or_fragment_is_rejected() {
        for raw in [
            "https://example.com/?a=1#top",
            "https://example.com/?a=1",
            "https://example.com/#top",
        ] {
            assert!(matches!(
                DenylistEntry::parse(raw),
                Err(DenylistError::QueryOrFragment { .. })
            ));
        }
    }

    #[test]
    fn garbage_entry_is_rejected() {
        assert!(matches!(
            DenylistEntry::parse("https://"),
            Err(DenylistError::Unparseable { .. })
        ));
        assert!(Denylist::parse(["https://ok.com/", "http://[bad"]).is_err());
    }

    #[test]
    fn host_matching_is_dot_suffix_not_substring() {
        let entry = DenylistEntry::parse("https://dropbox.com/").unwrap();
        assert!(entry.matches_host("dropbox.com"));
        assert!(entry.matches_host("evil.dropbox.com"));
        assert!(entry.matches_host("a.b.dropbox.com"));
        assert!(!entry.matches_host("not-dropbox.com"));
        assert!(!entry.matches_host("dropbox.com.evil.net"));
    }

    #[test]
    fn path_entry_blocks_only_that_path() {
        let entry = DenylistEntry::parse("https://shop.example/checkout").unwrap();
        assert!(entry.blocks("shop.example", "/checkout"));
        assert!(entry.blocks("eu.shop.example", "/checkout"));
        assert!(!entry.blocks("shop.example", "/"));
        assert!(!entry.blocks("shop.example", "/checkout/confirm"));
    }

    #[test]
    fn root_entry_blocks_every_path() {
        let list = Denylist::parse(["https://ipfs.io/"]).unwrap();
        assert!(list.blocks("ipfs.io", "/"));
        assert!(list.blocks("gateway.ipfs.io", "/ipfs/abc"));
        assert!(!list.blocks("example.com", "/"));
    }
}
