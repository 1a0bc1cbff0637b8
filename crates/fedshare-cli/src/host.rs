//! Build host used by `fedshare plan`.
//!
//! Records warnings and included provide dependencies for one target so
//! they can be reported once the pass is over.

use fedshare_core::{
    BuildHost, IncludeError, IncludeOptions, ProvideSharedDependency, ProvideWarning,
};
use std::cell::RefCell;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub struct PlanHost {
    pass: String,
    verify_resources: bool,
    warnings: RefCell<Vec<ProvideWarning>>,
    included: RefCell<Vec<ProvideSharedDependency>>,
}

impl PlanHost {
    pub fn new(pass: impl Into<String>, verify_resources: bool) -> Self {
        Self {
            pass: pass.into(),
            verify_resources,
            warnings: RefCell::new(Vec::new()),
            included: RefCell::new(Vec::new()),
        }
    }

    /// Included dependencies sorted by scope, key, then resource, and the
    /// warnings in report order.
    pub fn into_parts(self) -> (Vec<ProvideSharedDependency>, Vec<ProvideWarning>) {
        let mut included = self.included.into_inner();
        included.sort_by(|a, b| {
            (&a.share_scope, &a.share_key, &a.request).cmp(&(
                &b.share_scope,
                &b.share_key,
                &b.request,
            ))
        });
        (included, self.warnings.into_inner())
    }
}

impl BuildHost for PlanHost {
    fn report_warning(&self, warning: ProvideWarning) {
        self.warnings.borrow_mut().push(warning);
    }

    async fn include_dependency(
        &self,
        context: &Path,
        dependency: ProvideSharedDependency,
        _options: IncludeOptions,
    ) -> Result<(), IncludeError> {
        if self.verify_resources {
            let path = context.join(&dependency.request);
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => {
                    return Err(IncludeError::new(
                        &dependency.request,
                        format!("{} is not a file", path.display()),
                    ))
                }
                Err(e) => {
                    return Err(IncludeError::new(
                        &dependency.request,
                        format!("cannot read {}: {e}", path.display()),
                    ))
                }
            }
        }

        debug!(pass = %self.pass, id = %dependency.identifier(), "Included provide dependency");
        self.included.borrow_mut().push(dependency);
        Ok(())
    }
}
