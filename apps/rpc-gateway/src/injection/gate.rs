// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The injection predicate itself.

use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use super::denylist::{Denylist, BLOCKED_FILE_SUFFIXES};

/// What the content script can observe about the hosting document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DocumentContext {
    /// `document.doctype.name`, absent when the document has no doctype.
    #[serde(default)]
    pub doctype_name: Option<String>,
    /// Tag name of `document.documentElement`, absent when there is none.
    #[serde(default)]
    pub document_element: Option<String>,
    /// Full URL of the page.
    pub url: String,
}

impl DocumentContext {
    /// A plain HTML document at `url`.
    pub fn html(url: impl Into<String>) -> Self {
        Self {
            doctype_name: Some("html".to_string()),
            document_element: Some("HTML".to_string()),
            url: url.into(),
        }
    }
}

/// Result of an injection check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct InjectionDecision {
    pub inject: bool,
}

/// Pure predicate deciding whether the provider may be installed.
#[derive(Debug, Clone)]
pub struct InjectionGate {
    denylist: Denylist,
}

impl Default for InjectionGate {
    fn default() -> Self {
        Self::new(Denylist::builtin())
    }
}

impl InjectionGate {
    pub fn new(denylist: Denylist) -> Self {
        Self { denylist }
    }

    pub fn denylist(&self) -> &Denylist {
        &self.denylist
    }

    /// `true` only if every document and URL check passes.
    ///
    /// An unparseable URL never receives a provider.
    pub fn should_inject(&self, document: &DocumentContext) -> bool {
        if !doctype_allows(document.doctype_name.as_deref()) {
            return false;
        }
        if !document_element_allows(document.document_element.as_deref()) {
            return false;
        }

        let Ok(url) = Url::parse(&document.url) else {
            return false;
        };

        if has_blocked_suffix(url.path()) {
            return false;
        }

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        !self.denylist.blocks(&host, url.path())
    }

    pub fn decide(&self, document: &DocumentContext) -> InjectionDecision {
        InjectionDecision {
            inject: self.should_inject(document),
        }
    }
}

fn doctype_allows(doctype: Option<&str>) -> bool {
    doctype.is_none_or(|name| name == "html")
}

fn document_element_allows(element: Option<&str>) -> bool {
    element.is_none_or(|tag| tag.eq_ignore_ascii_case("html"))
}

fn has_blocked_suffix(path: &str) -> bool {
    let path = path.to_ascii_lowercase();
    BLOCKED_FILE_SUFFIXES
        .iter()
        .any(|suffix| path.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> InjectionGate {
        InjectionGate::default()
    }

    #[test]
    fn exact_denylisted_host_is_blocked() {
        assert!(!gate().should_inject(&DocumentContext::html("https://dropbox.com/")));
    }

    #[test]
    fn denylisted_subdomain_is_blocked() {
        assert!(!gate().should_inject(&DocumentContext::html("https://evil.dropbox.com/x")));
    }

    #[test]
    fn lookalike_host_is_allowed() {
        assert!(gate().should_inject(&DocumentContext::html("https://not-dropbox.com/")));
    }

    #[test]
    fn ordinary_page_is_allowed() {
        assert!(gate().should_inject(&DocumentContext::html("https://app.uniswap.org/#/swap")));
    }

    #[test]
    fn predicate_is_idempotent() {
        let gate = gate();
        let doc = DocumentContext::html("https://example.com/page");
        assert_eq!(gate.should_inject(&doc), gate.should_inject(&doc));

        let blocked = DocumentContext::html("https://ipfs.io/ipfs/x");
        assert_eq!(gate.should_inject(&blocked), gate.should_inject(&blocked));
    }

    #[test]
    fn non_html_doctype_is_blocked() {
        let doc = DocumentContext {
            doctype_name: Some("svg".to_string()),
            ..DocumentContext::html("https://example.com/")
        };
        assert!(!gate().should_inject(&doc));

        let upper = DocumentContext {
            doctype_name: Some("HTML".to_string()),
            ..DocumentContext::html("https://example.com/")
        };
        assert!(!gate().should_inject(&upper));
    }

    #[test]
    fn missing_doctype_and_root_element_are_allowed() {
        let doc = DocumentContext {
            doctype_name: None,
            document_element: None,
            url: "https://example.com/".to_string(),
        };
        assert!(gate().should_inject(&doc));
    }

    #[test]
    fn root_element_check_is_case_insensitive() {
        let lower = DocumentContext {
            document_element: Some("html".to_string()),
            ..DocumentContext::html("https://example.com/")
        };
        assert!(gate().should_inject(&lower));

        let svg = DocumentContext {
            document_element: Some("svg".to_string()),
            ..DocumentContext::html("https://example.com/")
        };
        assert!(!gate().should_inject(&svg));
    }

    #[test]
    fn blocked_suffixes_are_rejected() {
        assert!(!gate().should_inject(&DocumentContext::html("https://example.com/feed.xml")));
        assert!(!gate().should_inject(&DocumentContext::html("https://example.com/doc.PDF")));
        assert!(gate().should_inject(&DocumentContext::html("https://example.com/pdf-viewer")));
    }

    #[test]
    fn path_entries_only_block_their_path() {
        let gate = InjectionGate::new(Denylist::parse(["https://shop.example/checkout"]).unwrap());
        assert!(!gate.should_inject(&DocumentContext::html("https://shop.example/checkout")));
        assert!(gate.should_inject(&DocumentContext::html("https://shop.example/")));
    }

    #[test]
    fn unparseable_url_is_not_injected() {
        assert!(!gate().should_inject(&DocumentContext::html("not a url")));
    }
}
