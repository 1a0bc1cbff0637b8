//! Contract between the provide machinery and the build pipeline hosting it.

use super::options::ProvideVersion;
use super::version::{ResourceResolveData, VersionShortfall};
use crate::error::IncludeError;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::path::Path;

/// A module produced by the host resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleResolved {
    /// The request string as written by the importer.
    pub request: String,
    /// Resolved resource path, if resolution produced a file.
    pub resource: Option<String>,
    /// Package metadata found by the resolver.
    pub resource_resolve_data: Option<ResourceResolveData>,
    /// Cleared when the module identity depends on provide decisions.
    pub cacheable: bool,
}

impl ModuleResolved {
    /// A resolved module without package metadata.
    #[must_use]
    pub fn new(request: impl Into<String>, resource: Option<String>) -> Self {
        Self {
            request: request.into(),
            resource,
            resource_resolve_data: None,
            cacheable: true,
        }
    }

    /// Attach resolver metadata.
    #[must_use]
    pub fn with_resolve_data(mut self, data: ResourceResolveData) -> Self {
        self.resource_resolve_data = Some(data);
        self
    }
}

/// Graph node for a provided shared module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvideSharedDependency {
    pub share_scope: String,
    pub share_key: String,
    pub version: ProvideVersion,
    /// Resolved resource path of the provided module.
    pub request: String,
    pub eager: bool,
}

impl ProvideSharedDependency {
    /// Stable identifier, unique per (scope, resource, key, version, eager).
    #[must_use]
    pub fn identifier(&self) -> String {
        format!(
            "provide module ({}) {} as {} @ {}{}",
            self.share_scope,
            self.request,
            self.share_key,
            self.version,
            if self.eager { " (eager)" } else { "" }
        )
    }
}

/// Non-fatal diagnostic reported to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvideWarning {
    /// What the warning is about: `shared module <key> -> <resource>`.
    pub file: String,
    pub message: String,
}

impl ProvideWarning {
    /// Warning for a module whose version could not be determined.
    #[must_use]
    pub fn missing_version(share_key: &str, resource: &str, reason: &VersionShortfall) -> Self {
        Self {
            file: format!("shared module {share_key} -> {resource}"),
            message: format!(
                "No version specified and unable to automatically determine one. {reason}"
            ),
        }
    }
}

impl fmt::Display for ProvideWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.message)
    }
}

/// Options for [`BuildHost::include_dependency`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeOptions {
    /// Entry name; provide dependencies are included without one.
    pub name: Option<String>,
}

/// The build pipeline a provide pass runs inside.
///
/// Both methods take `&self`: a pass is driven from a single task, so hosts
/// can keep their state in a `RefCell`.
pub trait BuildHost {
    /// Record a non-fatal diagnostic. Never halts the build.
    fn report_warning(&self, warning: ProvideWarning);

    /// Add a dependency to the build graph.
    ///
    /// The returned future resolves once the host acknowledges the node.
    fn include_dependency(
        &self,
        context: &Path,
        dependency: ProvideSharedDependency,
        options: IncludeOptions,
    ) -> impl Future<Output = Result<(), IncludeError>>;
}
