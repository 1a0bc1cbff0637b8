//! Request classification and matching.
//!
//! Each declaration pattern is classified once, by its shape:
//!
//! - Path: `/abs`, `C:\abs`, `\\server\share`, `./rel`, `../rel`, `.`, `..`
//! - Prefix: anything ending with `/` (e.g. `lodash/`, `@scope/pkg/`)
//! - Exact: everything else (e.g. `react`, `react-dom/client`)

use super::options::ProvideDeclaration;
use std::collections::HashMap;

/// How a declaration pattern is matched against resolved modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClassification {
    /// Matched against the resolved resource path.
    PathMatch,
    /// Matched as a prefix of the request; the remainder extends the share key.
    PrefixMatch,
    /// Matched verbatim against the request.
    ExactMatch,
}

/// Classify a declaration pattern.
#[must_use]
pub fn classify(pattern: &str) -> RequestClassification {
    if is_path_pattern(pattern) {
        RequestClassification::PathMatch
    } else if pattern.ends_with('/') {
        RequestClassification::PrefixMatch
    } else {
        RequestClassification::ExactMatch
    }
}

fn is_path_pattern(pattern: &str) -> bool {
    if pattern.starts_with('/') || pattern.starts_with("\\\\") {
        return true;
    }

    // Windows drive: `C:\`
    let bytes = pattern.as_bytes();
    if bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'\\'
    {
        return true;
    }

    // `.` or `..`, alone or followed by `/`
    let rest = pattern
        .strip_prefix("..")
        .or_else(|| pattern.strip_prefix('.'));
    matches!(rest, Some(rest) if rest.is_empty() || rest.starts_with('/'))
}

/// A declaration matched by a request, with the share key already adjusted
/// for prefix matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvideMatch {
    pub classification: RequestClassification,
    pub declaration: ProvideDeclaration,
}

/// Declarations bucketed by classification.
#[derive(Debug, Clone, Default)]
pub struct ProvideMatchers {
    resolved: Vec<ProvideDeclaration>,
    exact: HashMap<String, ProvideDeclaration>,
    prefixes: Vec<ProvideDeclaration>,
}

impl ProvideMatchers {
    /// Bucket declarations.
    ///
    /// Duplicate patterns keep input order: the first exact declaration for a
    /// pattern is the one looked up, and prefixes are tried in input order.
    #[must_use]
    pub fn new(provides: &[ProvideDeclaration]) -> Self {
        let mut matchers = Self::default();
        for provide in provides {
            match classify(&provide.request) {
                RequestClassification::PathMatch => matchers.resolved.push(provide.clone()),
                RequestClassification::PrefixMatch => matchers.prefixes.push(provide.clone()),
                RequestClassification::ExactMatch => {
                    matchers
                        .exact
                        .entry(provide.request.clone())
                        .or_insert_with(|| provide.clone());
                }
            }
        }
        matchers
    }

    /// Declarations keyed by resolved path.
    #[must_use]
    pub fn resolved(&self) -> &[ProvideDeclaration] {
        &self.resolved
    }

    /// Look up an exact-match declaration.
    #[must_use]
    pub fn exact(&self, request: &str) -> Option<&ProvideDeclaration> {
        self.exact.get(request)
    }

    /// Prefix declarations in pattern order.
    #[must_use]
    pub fn prefixes(&self) -> &[ProvideDeclaration] {
        &self.prefixes
    }

    /// All request-driven matches: the exact match first, then every matching prefix.
    ///
    /// Prefix matches are independent of each other and of the exact match;
    /// `a/` and `a/b/` both match `a/b/c`.
    #[must_use]
    pub fn matches(&self, request: &str) -> Vec<ProvideMatch> {
        let mut found = Vec::new();

        if let Some(declaration) = self.exact(request) {
            found.push(ProvideMatch {
                classification: RequestClassification::ExactMatch,
                declaration: declaration.clone(),
            });
        }

        for prefix in &self.prefixes {
            if let Some(remainder) = request.strip_prefix(prefix.request.as_str()) {
                let mut declaration = prefix.clone();
                declaration.share_key.push_str(remainder);
                found.push(ProvideMatch {
                    classification: RequestClassification::PrefixMatch,
                    declaration,
                });
            }
        }

        found
    }
}
