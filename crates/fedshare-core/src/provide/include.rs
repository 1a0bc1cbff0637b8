//! Inclusion of provided modules into the build graph at the end of a pass.

use super::host::{BuildHost, IncludeOptions};
use super::registry::SharedModuleRegistry;
use crate::error::IncludeError;
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::Path;
use tracing::debug;

/// Include every registry entry as a provide dependency.
///
/// All inclusions are issued at once and awaited together. The first
/// failure (in completion order) is returned; the remaining inclusions are
/// still driven to completion and their failures are only logged.
///
/// The first failure is returned only after every sibling has settled, so
/// a sibling that never completes also holds back the reported failure.
///
/// `None` means the pass never set up a registry; nothing is included.
///
/// Returns the number of dependencies included.
pub async fn include_shared_modules<H: BuildHost>(
    host: &H,
    context: &Path,
    registry: Option<SharedModuleRegistry>,
) -> Result<usize, IncludeError> {
    let Some(registry) = registry else {
        return Ok(0);
    };

    let mut pending: FuturesUnordered<_> = registry
        .into_entries()
        .map(|entry| {
            let dependency = entry.to_dependency();
            debug!(id = %dependency.identifier(), "Including provided module");
            host.include_dependency(context, dependency, IncludeOptions::default())
        })
        .collect();

    let total = pending.len();
    let mut first_error = None;

    while let Some(result) = pending.next().await {
        if let Err(err) = result {
            if first_error.is_none() {
                first_error = Some(err);
            } else {
                debug!(error = %err, "Further include failure after the first");
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(total),
    }
}
