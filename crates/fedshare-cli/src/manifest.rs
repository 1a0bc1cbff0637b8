//! Resolution manifest: the modules a build pass resolves.
//!
//! The manifest stands in for a bundler's resolver. Each entry names a
//! request and the resource it resolved to; package metadata is either
//! given inline, read from a named description file, or looked up next to
//! the resource.

use fedshare_core::{Error, ModuleResolved, ResourceResolveData};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default manifest file name, looked up in the cwd.
pub const DEFAULT_MANIFEST_FILE: &str = "resolutions.json";

/// Description file name searched for above a resource.
const DESCRIPTION_FILE: &str = "package.json";

/// Maximum concurrent description file loads.
const MAX_CONCURRENT_LOADS: usize = 16;

/// One resolved module.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub request: String,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub description_file_path: Option<PathBuf>,
    #[serde(default)]
    pub resolve_data: Option<ResourceResolveData>,
}

/// How package metadata is found for entries that don't carry it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Search for the nearest package.json above each resource.
    pub find_description_files: bool,
}

/// Read and parse a manifest file.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>, Error> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Turn manifest entries into resolution events.
///
/// Metadata loads run concurrently; events come out in manifest order.
pub fn resolve_events<'a>(
    entries: Vec<ManifestEntry>,
    root: &'a Path,
    options: LoadOptions,
) -> impl Stream<Item = ModuleResolved> + 'a {
    stream::iter(entries)
        .map(move |entry| load_event(entry, root, options))
        .buffered(MAX_CONCURRENT_LOADS)
}

async fn load_event(entry: ManifestEntry, root: &Path, options: LoadOptions) -> ModuleResolved {
    let ManifestEntry {
        request,
        resource,
        description_file_path,
        resolve_data,
    } = entry;

    let resolve_data = match (resolve_data, description_file_path) {
        (Some(data), _) => Some(data),
        (None, Some(path)) => Some(read_description_file(&root.join(path)).await),
        (None, None) if options.find_description_files => match resource.as_deref() {
            Some(resource) => Some(find_description_file(&root.join(resource)).await),
            None => None,
        },
        (None, None) => None,
    };

    ModuleResolved {
        request,
        resource,
        resource_resolve_data: resolve_data,
        cacheable: true,
    }
}

/// Read a description file. Unreadable or invalid files count as missing.
async fn read_description_file(path: &Path) -> ResourceResolveData {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read description file");
            return ResourceResolveData::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => {
            let data = ResourceResolveData::with_description_file(path, value);
            let package = data.description_file_data.as_ref().and_then(|d| d.name());
            debug!(path = %path.display(), package, "Loaded description file");
            data
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Invalid description file");
            ResourceResolveData::default()
        }
    }
}

/// Find and read the nearest description file above `resource`.
async fn find_description_file(resource: &Path) -> ResourceResolveData {
    for dir in resource.ancestors().skip(1) {
        let candidate = dir.join(DESCRIPTION_FILE);
        if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            debug!(
                resource = %resource.display(),
                path = %candidate.display(),
                "Found description file"
            );
            return read_description_file(&candidate).await;
        }
    }
    ResourceResolveData::default()
}
