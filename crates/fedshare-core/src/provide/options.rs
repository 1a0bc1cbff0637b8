//! Provide declaration normalization.
//!
//! User options arrive in several shapes:
//!
//! - `{ "react": "react" }` (pattern to bare share key)
//! - `{ "react": { "shareKey": "react", "version": "18.2.0", "eager": true } }`
//! - `["react", { "lodash/": "lodash/" }]` (list of bare keys or mappings)
//!
//! All of them normalize to a list of [`ProvideDeclaration`]s sorted by pattern.

use crate::error::Error;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Share scope used when neither the entry nor the options name one.
pub const DEFAULT_SHARE_SCOPE: &str = "default";

/// Raw provide options, as read from the federation options file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvideSharedOptions {
    /// Provide entries in any accepted shape.
    #[serde(default)]
    pub provides: Value,
    /// Fallback share scope for entries that don't set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_scope: Option<String>,
}

impl ProvideSharedOptions {
    /// Create options from a provides value.
    #[must_use]
    pub fn new(provides: Value) -> Self {
        Self {
            provides,
            share_scope: None,
        }
    }

    /// Set the fallback share scope.
    #[must_use]
    pub fn with_share_scope(mut self, scope: impl Into<String>) -> Self {
        self.share_scope = Some(scope.into());
        self
    }
}

/// A version explicitly configured for, or resolved for, a provided module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProvideVersion {
    /// Provided without a version (`false` in options).
    Unversioned,
    /// A concrete version string.
    Version(String),
}

impl ProvideVersion {
    /// The version string, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Unversioned => None,
            Self::Version(v) => Some(v),
        }
    }
}

impl std::fmt::Display for ProvideVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unversioned => f.write_str("false"),
            Self::Version(v) => f.write_str(v),
        }
    }
}

impl Serialize for ProvideVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unversioned => serializer.serialize_bool(false),
            Self::Version(v) => serializer.serialize_str(v),
        }
    }
}

/// A normalized provide rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvideDeclaration {
    /// Pattern matched against requests or resolved paths.
    pub request: String,
    /// Key the module is published under.
    pub share_key: String,
    /// Scope the module is published into.
    pub share_scope: String,
    /// `None` means the version is inferred from the package description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<ProvideVersion>,
    /// Whether the module is available without an async load step.
    pub eager: bool,
}

impl ProvideDeclaration {
    /// Create a declaration with the given share key and no explicit version.
    #[must_use]
    pub fn new(
        request: impl Into<String>,
        share_key: impl Into<String>,
        share_scope: impl Into<String>,
    ) -> Self {
        Self {
            request: request.into(),
            share_key: share_key.into(),
            share_scope: share_scope.into(),
            version: None,
            eager: false,
        }
    }

    /// Set an explicit version.
    #[must_use]
    pub fn with_version(mut self, version: ProvideVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Set the eager flag.
    #[must_use]
    pub fn with_eager(mut self, eager: bool) -> Self {
        self.eager = eager;
        self
    }
}

/// Normalize raw options into declarations sorted by pattern.
///
/// # Errors
/// - `UnexpectedArrayOfProvides` if a mapping value is an array
/// - `UnexpectedOptionsFormat` for any other unsupported shape
/// - `InvalidVersion` if a version is neither a string nor `false`
pub fn normalize_provides(
    options: &ProvideSharedOptions,
) -> Result<Vec<ProvideDeclaration>, Error> {
    let default_scope = non_empty(options.share_scope.as_deref()).unwrap_or(DEFAULT_SHARE_SCOPE);
    let mut provides = Vec::new();

    match &options.provides {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(request) => {
                        provides.push(ProvideDeclaration::new(request, request, default_scope));
                    }
                    Value::Object(map) => normalize_map(map, default_scope, &mut provides)?,
                    other => {
                        return Err(Error::UnexpectedOptionsFormat(format!(
                            "provides list item must be a string or an object, got {}",
                            type_name(other)
                        )))
                    }
                }
            }
        }
        Value::Object(map) => normalize_map(map, default_scope, &mut provides)?,
        other => {
            return Err(Error::UnexpectedOptionsFormat(format!(
                "provides must be an object or an array, got {}",
                type_name(other)
            )))
        }
    }

    // Stable sort keeps the input order of duplicate patterns.
    provides.sort_by(|a, b| a.request.cmp(&b.request));
    Ok(provides)
}

fn normalize_map(
    map: &Map<String, Value>,
    default_scope: &str,
    out: &mut Vec<ProvideDeclaration>,
) -> Result<(), Error> {
    for (request, value) in map {
        let declaration = match value {
            Value::String(share_key) => ProvideDeclaration::new(request, share_key, default_scope),
            Value::Array(_) => {
                return Err(Error::UnexpectedArrayOfProvides {
                    request: request.clone(),
                })
            }
            Value::Object(entry) => normalize_entry(request, entry, default_scope)?,
            other => {
                return Err(Error::UnexpectedOptionsFormat(format!(
                    "provide '{request}' must be a string or an object, got {}",
                    type_name(other)
                )))
            }
        };
        out.push(declaration);
    }
    Ok(())
}

fn normalize_entry(
    request: &str,
    entry: &Map<String, Value>,
    default_scope: &str,
) -> Result<ProvideDeclaration, Error> {
    let share_key = match entry.get("shareKey") {
        None | Some(Value::Null) => request,
        Some(Value::String(key)) => key.as_str(),
        Some(other) => {
            return Err(Error::UnexpectedOptionsFormat(format!(
                "shareKey of '{request}' must be a string, got {}",
                type_name(other)
            )))
        }
    };

    let share_scope =
        non_empty(entry.get("shareScope").and_then(Value::as_str)).unwrap_or(default_scope);

    let version = match entry.get("version") {
        None | Some(Value::Null) => None,
        Some(Value::Bool(false)) => Some(ProvideVersion::Unversioned),
        // An empty version string ends up unversioned in the graph anyway.
        Some(Value::String(v)) if v.is_empty() => Some(ProvideVersion::Unversioned),
        Some(Value::String(v)) => Some(ProvideVersion::Version(v.clone())),
        Some(_) => {
            return Err(Error::InvalidVersion {
                request: request.to_string(),
            })
        }
    };

    let eager = entry.get("eager").and_then(Value::as_bool).unwrap_or(false);

    Ok(ProvideDeclaration {
        request: request.to_string(),
        share_key: share_key.to_string(),
        share_scope: share_scope.to_string(),
        version,
        eager,
    })
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(provides: Value) -> Result<Vec<ProvideDeclaration>, Error> {
        normalize_provides(&ProvideSharedOptions::new(provides))
    }

    #[test]
    fn test_sorted_by_pattern() {
        let provides = normalize(json!({ "b": "k1", "a": "k2" })).unwrap();
        let requests: Vec<&str> = provides.iter().map(|p| p.request.as_str()).collect();
        assert_eq!(requests, vec!["a", "b"]);
        assert_eq!(provides[0].share_key, "k2");
        assert_eq!(provides[1].share_key, "k1");
    }

    #[test]
    fn test_bare_string_defaults() {
        let provides = normalize(json!({ "react": "react" })).unwrap();
        assert_eq!(
            provides,
            vec![ProvideDeclaration::new("react", "react", DEFAULT_SHARE_SCOPE)]
        );
        assert!(provides[0].version.is_none());
        assert!(!provides[0].eager);
    }

    #[test]
    fn test_object_entry() {
        let provides = normalize(json!({
            "react": {
                "shareKey": "react-shared",
                "shareScope": "ui",
                "version": "18.2.0",
                "eager": true
            }
        }))
        .unwrap();

        let p = &provides[0];
        assert_eq!(p.share_key, "react-shared");
        assert_eq!(p.share_scope, "ui");
        assert_eq!(p.version, Some(ProvideVersion::Version("18.2.0".to_string())));
        assert!(p.eager);
    }

    #[test]
    fn test_object_entry_share_key_defaults_to_pattern() {
        let provides = normalize(json!({ "lodash": { "eager": true } })).unwrap();
        assert_eq!(provides[0].share_key, "lodash");
    }

    #[test]
    fn test_version_false_is_unversioned() {
        let provides =
            normalize(json!({ "a": { "version": false }, "b": { "version": "" } })).unwrap();
        assert_eq!(provides[0].version, Some(ProvideVersion::Unversioned));
        assert_eq!(provides[1].version, Some(ProvideVersion::Unversioned));
    }

    #[test]
    fn test_version_true_rejected() {
        let err = normalize(json!({ "a": { "version": true } })).unwrap_err();
        assert!(matches!(err, Error::InvalidVersion { ref request } if request == "a"));
    }

    #[test]
    fn test_share_scope_fallbacks() {
        let options = ProvideSharedOptions::new(json!({
            "a": "a",
            "b": { "shareScope": "entry" },
            "c": { "shareScope": "" }
        }))
        .with_share_scope("top");

        let provides = normalize_provides(&options).unwrap();
        assert_eq!(provides[0].share_scope, "top");
        assert_eq!(provides[1].share_scope, "entry");
        assert_eq!(provides[2].share_scope, "top");
    }

    #[test]
    fn test_empty_top_level_scope_uses_default() {
        let options = ProvideSharedOptions::new(json!({ "a": "a" })).with_share_scope("");
        let provides = normalize_provides(&options).unwrap();
        assert_eq!(provides[0].share_scope, DEFAULT_SHARE_SCOPE);
    }

    #[test]
    fn test_list_form() {
        let provides = normalize(json!(["react", { "lodash/": "lodash/" }])).unwrap();
        assert_eq!(provides.len(), 2);
        assert_eq!(provides[0].request, "lodash/");
        assert_eq!(provides[1].request, "react");
        assert_eq!(provides[1].share_key, "react");
    }

    #[test]
    fn test_array_value_rejected() {
        let err = normalize(json!({ "react": ["react", "react-dom"] })).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedArrayOfProvides { ref request } if request == "react"
        ));
        assert!(err.to_string().starts_with("Unexpected array of provides"));
    }

    #[test]
    fn test_nested_array_in_list_rejected() {
        let err = normalize(json!([["react"]])).unwrap_err();
        assert!(matches!(err, Error::UnexpectedOptionsFormat(_)));
    }

    #[test]
    fn test_invalid_top_level() {
        assert!(matches!(
            normalize(json!(42)).unwrap_err(),
            Error::UnexpectedOptionsFormat(_)
        ));
        assert!(normalize(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_patterns_keep_input_order() {
        let provides = normalize(json!([{ "a": "first" }, { "a": "second" }])).unwrap();
        assert_eq!(provides[0].share_key, "first");
        assert_eq!(provides[1].share_key, "second");
    }

    #[test]
    fn test_version_serializes_false() {
        let json = serde_json::to_value(ProvideVersion::Unversioned).unwrap();
        assert_eq!(json, json!(false));
        let json = serde_json::to_value(ProvideVersion::Version("1.0.0".to_string())).unwrap();
        assert_eq!(json, json!("1.0.0"));
    }
}
