//! End-to-end tests for a provide pass.
//!
//! These tests verify:
//! - Options normalize, match, and include in one flow
//! - Every registry entry is included exactly once at phase end
//! - Version warnings never fail the pass
//! - An include failure fails the pass

use fedshare_core::{
    BuildHost, Error, IncludeError, IncludeOptions, ModuleResolved, ProvideSharedDependency,
    ProvideSharedOptions, ProvideSharedPlugin, ProvideVersion, ProvideWarning,
    ResourceResolveData,
};
use serde_json::json;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

#[derive(Default)]
struct GraphHost {
    warnings: RefCell<Vec<ProvideWarning>>,
    included: RefCell<Vec<(PathBuf, ProvideSharedDependency)>>,
    reject: Option<&'static str>,
}

impl BuildHost for GraphHost {
    fn report_warning(&self, warning: ProvideWarning) {
        self.warnings.borrow_mut().push(warning);
    }

    async fn include_dependency(
        &self,
        context: &Path,
        dependency: ProvideSharedDependency,
        _options: IncludeOptions,
    ) -> Result<(), IncludeError> {
        tokio::task::yield_now().await;
        if self.reject == Some(dependency.share_key.as_str()) {
            return Err(IncludeError::new(&dependency.request, "module build failed"));
        }
        self.included
            .borrow_mut()
            .push((context.to_path_buf(), dependency));
        Ok(())
    }
}

fn options() -> ProvideSharedOptions {
    ProvideSharedOptions::new(json!({
        "react": "react",
        "react-dom": { "shareKey": "react-dom", "eager": true },
        "@mui/material/": { "shareKey": "@mui/material/", "shareScope": "ui" },
        "./src/store.js": { "shareKey": "store", "version": false }
    }))
    .with_share_scope("app")
}

fn described(version: &str) -> ResourceResolveData {
    ResourceResolveData::with_description_file(
        "/project/node_modules/pkg/package.json",
        json!({ "name": "pkg", "version": version }),
    )
}

fn react_event() -> ModuleResolved {
    ModuleResolved::new("react", Some("/project/node_modules/react/index.js".into()))
}

#[tokio::test]
async fn test_full_pass() {
    let plugin = ProvideSharedPlugin::new(&options()).unwrap();
    let host = GraphHost::default();
    let mut pass = plugin.begin_pass("/project");

    let events = vec![
        ModuleResolved::new("react", Some("/project/node_modules/react/index.js".into()))
            .with_resolve_data(described("18.2.0")),
        ModuleResolved::new("react-dom", Some("/project/node_modules/react-dom/index.js".into())),
        ModuleResolved::new(
            "@mui/material/Button",
            Some("/project/node_modules/@mui/material/Button/index.js".into()),
        )
        .with_resolve_data(described("5.15.0")),
        ModuleResolved::new("./app.js", Some("/project/app.js".into())),
    ];

    let mut uncacheable = Vec::new();
    for mut event in events {
        pass.on_module_resolved(&mut event, &host);
        if !event.cacheable {
            uncacheable.push(event.request);
        }
    }

    assert_eq!(
        uncacheable,
        vec!["react", "react-dom", "@mui/material/Button"]
    );
    // react-dom had no resolve data.
    assert_eq!(host.warnings.borrow().len(), 1);
    assert_eq!(
        host.warnings.borrow()[0].file,
        "shared module react-dom -> /project/node_modules/react-dom/index.js"
    );

    let count = pass.finish_make(&host).await.unwrap();
    assert_eq!(count, 4);

    let included = host.included.borrow();
    assert_eq!(included.len(), 4);
    assert!(included.iter().all(|(ctx, _)| ctx == Path::new("/project")));

    let find = |key: &str| {
        included
            .iter()
            .map(|(_, d)| d)
            .find(|d| d.share_key == key)
            .unwrap()
            .clone()
    };

    let react = find("react");
    assert_eq!(react.share_scope, "app");
    assert_eq!(react.version, ProvideVersion::Version("18.2.0".into()));

    let react_dom = find("react-dom");
    assert!(react_dom.eager);
    assert_eq!(react_dom.version, ProvideVersion::Unversioned);

    let button = find("@mui/material/Button");
    assert_eq!(button.share_scope, "ui");
    assert_eq!(button.version, ProvideVersion::Version("5.15.0".into()));

    let store = find("store");
    assert_eq!(store.request, "./src/store.js");
    assert_eq!(store.version, ProvideVersion::Unversioned);
}

#[tokio::test]
async fn test_include_failure_fails_pass() {
    let plugin = ProvideSharedPlugin::new(&options()).unwrap();
    let host = GraphHost {
        reject: Some("store"),
        ..GraphHost::default()
    };
    let mut pass = plugin.begin_pass("/project");

    let mut event = react_event().with_resolve_data(described("18.2.0"));
    pass.on_module_resolved(&mut event, &host);

    let err = pass.finish_make(&host).await.unwrap_err();
    assert!(matches!(err, Error::Include(ref e) if e.resource == "./src/store.js"));
    assert_eq!(err.code(), "INCLUDE_FAILED");
    // The sibling inclusion still completed.
    assert_eq!(host.included.borrow().len(), 1);
}

#[tokio::test]
async fn test_concurrent_passes_do_not_share_registry() {
    let plugin = ProvideSharedPlugin::new(&options()).unwrap();
    let client_host = GraphHost::default();
    let server_host = GraphHost::default();

    let client = async {
        let mut pass = plugin.begin_pass("/project");
        let mut event = react_event().with_resolve_data(described("18.2.0"));
        pass.on_module_resolved(&mut event, &client_host);
        pass.finish_make(&client_host).await
    };
    let server = async {
        let pass = plugin.begin_pass("/project");
        pass.finish_make(&server_host).await
    };

    let (client, server) = futures::join!(client, server);
    assert_eq!(client.unwrap(), 2);
    assert_eq!(server.unwrap(), 1);
}

#[test]
fn test_array_provides_rejected_before_resolution() {
    let options = ProvideSharedOptions::new(json!({ "react": [{ "shareKey": "react" }] }));
    let err = ProvideSharedPlugin::new(&options).unwrap_err();
    assert!(matches!(err, Error::UnexpectedArrayOfProvides { .. }));
}
