#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod error;
pub mod provide;
pub mod version;

pub use config::{load_provide_options, Config, DEFAULT_CONFIG_FILE};
pub use error::{Error, IncludeError};
pub use provide::{
    classify, include_shared_modules, normalize_provides, resolve_provide_version, BuildHost,
    DescriptionFileData, IncludeOptions, ModuleResolved, ProvideDeclaration, ProvidePass,
    ProvideSharedDependency, ProvideSharedOptions, ProvideSharedPlugin, ProvideVersion,
    ProvideWarning, RequestClassification, ResolvedProvideEntry, ResourceResolveData,
    SharedModuleRegistry, VersionShortfall, DEFAULT_SHARE_SCOPE,
};
pub use version::VERSION;
