//! Provide plugin and per-pass state.
//!
//! ## Example
//!
//! ```ignore
//! let plugin = ProvideSharedPlugin::new(&options)?;
//!
//! let mut pass = plugin.begin_pass("/project");
//! for mut event in resolved_modules {
//!     pass.on_module_resolved(&mut event, &host);
//! }
//! let included = pass.finish_make(&host).await?;
//! ```

use super::classify::{ProvideMatch, ProvideMatchers};
use super::host::{BuildHost, ModuleResolved, ProvideWarning};
use super::include::include_shared_modules;
use super::options::{normalize_provides, ProvideDeclaration, ProvideSharedOptions};
use super::registry::{ResolvedProvideEntry, SharedModuleRegistry};
use super::version::{resolve_provide_version, ResourceResolveData};
use crate::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Provides modules matching configured declarations as shared modules.
///
/// Declarations are normalized and classified once; each build pass then
/// gets its own [`ProvidePass`].
#[derive(Debug, Clone)]
pub struct ProvideSharedPlugin {
    provides: Vec<ProvideDeclaration>,
    matchers: ProvideMatchers,
}

impl ProvideSharedPlugin {
    /// Create the plugin from raw options.
    ///
    /// # Errors
    /// Returns a configuration error if the options are malformed.
    pub fn new(options: &ProvideSharedOptions) -> Result<Self, Error> {
        Ok(Self::from_declarations(normalize_provides(options)?))
    }

    /// Create the plugin from already-normalized declarations.
    #[must_use]
    pub fn from_declarations(provides: Vec<ProvideDeclaration>) -> Self {
        let matchers = ProvideMatchers::new(&provides);
        Self { provides, matchers }
    }

    /// Normalized declarations, sorted by pattern.
    #[must_use]
    pub fn provides(&self) -> &[ProvideDeclaration] {
        &self.provides
    }

    /// Start a build pass rooted at `context`.
    ///
    /// Path declarations are claimed right away, keyed by their pattern, so
    /// they take precedence over anything matched during resolution.
    #[must_use]
    pub fn begin_pass(&self, context: impl Into<PathBuf>) -> ProvidePass<'_> {
        let mut registry = SharedModuleRegistry::new();
        for provide in self.matchers.resolved() {
            registry.set_if_absent(ResolvedProvideEntry {
                resource: provide.request.clone(),
                config: provide.clone(),
                resolved_version: provide.version.clone(),
            });
        }

        ProvidePass {
            matchers: &self.matchers,
            context: context.into(),
            registry,
        }
    }
}

/// State of one build pass.
///
/// Concurrent passes (e.g. client and server targets) each own a pass and
/// never share a registry.
#[derive(Debug)]
pub struct ProvidePass<'a> {
    matchers: &'a ProvideMatchers,
    context: PathBuf,
    registry: SharedModuleRegistry,
}

impl ProvidePass<'_> {
    /// Directory dependencies are included relative to.
    #[must_use]
    pub fn context(&self) -> &Path {
        &self.context
    }

    /// Modules claimed so far.
    #[must_use]
    pub fn registry(&self) -> &SharedModuleRegistry {
        &self.registry
    }

    /// Handle a module produced by the resolver.
    ///
    /// Claims the module for every matching declaration that gets to it
    /// first, and marks the event uncacheable whenever a declaration
    /// matches. Version shortfalls are reported to `host` as warnings.
    pub fn on_module_resolved<H: BuildHost>(&mut self, event: &mut ModuleResolved, host: &H) {
        let Some(resource) = event.resource.as_deref() else {
            trace!(request = %event.request, "Module has no resource, skipping");
            return;
        };

        if self.registry.has(resource) {
            trace!(resource, "Module already provided");
            return;
        }

        let matches = self.matchers.matches(&event.request);
        if matches.is_empty() {
            return;
        }

        for found in matches {
            event.cacheable = false;
            self.provide_shared_module(
                found,
                resource,
                event.resource_resolve_data.as_ref(),
                host,
            );
        }
    }

    fn provide_shared_module<H: BuildHost>(
        &mut self,
        found: ProvideMatch,
        resource: &str,
        resolve_data: Option<&ResourceResolveData>,
        host: &H,
    ) {
        let ProvideMatch {
            classification,
            declaration,
        } = found;

        // An earlier match for this resource already won.
        if self.registry.has(resource) {
            trace!(resource, share_key = %declaration.share_key, "Dropping later match");
            return;
        }

        let configured = declaration.version.as_ref();
        let resolved_version = match resolve_provide_version(configured, resolve_data) {
            Ok(version) => Some(version),
            Err(reason) => {
                let warning =
                    ProvideWarning::missing_version(&declaration.share_key, resource, &reason);
                warn!(file = %warning.file, "{}", warning.message);
                host.report_warning(warning);
                None
            }
        };

        debug!(
            resource,
            share_key = %declaration.share_key,
            share_scope = %declaration.share_scope,
            ?classification,
            "Providing shared module"
        );

        self.registry.set_if_absent(ResolvedProvideEntry {
            resource: resource.to_string(),
            config: declaration,
            resolved_version,
        });
    }

    /// End the pass: include every claimed module into the build graph.
    ///
    /// Consumes the pass, so its registry cannot be reused.
    pub async fn finish_make<H: BuildHost>(self, host: &H) -> Result<usize, Error> {
        let count = include_shared_modules(host, &self.context, Some(self.registry)).await?;
        debug!(count, "Provided modules included");
        Ok(count)
    }
}
