//! Shared module providing for federated builds.
//!
//! Provides utilities for:
//! - Normalizing provide declarations from user options
//! - Classifying declaration patterns (path, prefix, exact)
//! - Matching resolved modules against declarations
//! - Determining the version a shared module is provided at
//! - Tracking provided modules per build pass
//! - Adding provide dependencies to the build graph at the end of the pass

mod classify;
mod host;
mod include;
mod options;
mod plugin;
mod registry;
mod version;

pub use classify::{classify, ProvideMatch, ProvideMatchers, RequestClassification};
pub use host::{BuildHost, IncludeOptions, ModuleResolved, ProvideSharedDependency, ProvideWarning};
pub use include::include_shared_modules;
pub use options::{
    normalize_provides, ProvideDeclaration, ProvideSharedOptions, ProvideVersion,
    DEFAULT_SHARE_SCOPE,
};
pub use plugin::{ProvidePass, ProvideSharedPlugin};
pub use registry::{ResolvedProvideEntry, SharedModuleRegistry};
pub use version::{
    resolve_provide_version, DescriptionFileData, ResourceResolveData, VersionShortfall,
};
