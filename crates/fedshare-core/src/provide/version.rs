//! Provide version resolution.
//!
//! An explicit version always wins. Otherwise the version comes from the
//! description file (package.json) the resolver found for the module.

use super::options::ProvideVersion;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Package metadata attached to a resolved module by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResolveData {
    /// Parsed content of the nearest description file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_file_data: Option<DescriptionFileData>,
    /// Path of that description file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_file_path: Option<PathBuf>,
}

impl ResourceResolveData {
    /// Resolve data for a module with a description file.
    #[must_use]
    pub fn with_description_file(path: impl Into<PathBuf>, data: Value) -> Self {
        Self {
            description_file_data: Some(DescriptionFileData(data)),
            description_file_path: Some(path.into()),
        }
    }
}

/// Parsed description file (usually package.json).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DescriptionFileData(pub Value);

impl DescriptionFileData {
    /// The `version` field, if it is a non-empty string.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.0
            .get("version")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    }

    /// The `name` field, if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }
}

/// Why a version could not be inferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionShortfall {
    /// The resolver attached no metadata at all.
    NoResolveData,
    /// No description file was found for the module.
    NoDescriptionFile,
    /// The description file has no usable `version` field.
    NoVersionInDescriptionFile { path: Option<PathBuf> },
}

impl fmt::Display for VersionShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResolveData => write!(f, "No resolve data provided from resolver."),
            Self::NoDescriptionFile => write!(
                f,
                "No description file (usually package.json) found. Add description file with name and version, or manually specify version in shared config."
            ),
            Self::NoVersionInDescriptionFile { path } => write!(
                f,
                "No version in description file (usually package.json). Add version to description file {}, or manually specify version in shared config.",
                path.as_ref()
                    .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string())
            ),
        }
    }
}

/// Determine the version a module is provided at.
///
/// Returns the explicit version when one is configured (including
/// [`ProvideVersion::Unversioned`]), otherwise the description file version.
///
/// # Errors
/// Returns the reason inference failed. This is never fatal; callers turn it
/// into a warning and provide the module without a version.
pub fn resolve_provide_version(
    configured: Option<&ProvideVersion>,
    resolve_data: Option<&ResourceResolveData>,
) -> Result<ProvideVersion, VersionShortfall> {
    if let Some(version) = configured {
        return Ok(version.clone());
    }

    let resolve_data = resolve_data.ok_or(VersionShortfall::NoResolveData)?;
    let description = resolve_data
        .description_file_data
        .as_ref()
        .ok_or(VersionShortfall::NoDescriptionFile)?;

    description
        .version()
        .map(|v| ProvideVersion::Version(v.to_string()))
        .ok_or_else(|| VersionShortfall::NoVersionInDescriptionFile {
            path: resolve_data.description_file_path.clone(),
        })
}
