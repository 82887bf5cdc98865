//! Unit tests for load sessions and the unload protocol.

use std::path::PathBuf;
use std::time::Duration;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;
use crate::testing::{
    FUTURE_ABI, FakeLoader, FakeModule, PANICKING, SAMPLE, module_file_name, touch_module,
};

struct Workspace {
    _dir: TempDir,
    module: PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    let dir = TempDir::new().expect("create temp dir");
    let module = touch_module(dir.path(), &module_file_name("libsample")).expect("touch module");
    Workspace { _dir: dir, module }
}

#[fixture]
fn options() -> HostOptions {
    HostOptions::default().with_poll_interval(Duration::ZERO)
}

fn loader_with(module: FakeModule) -> FakeLoader {
    FakeLoader::new().with_module(&module_file_name("libsample"), module)
}

#[rstest]
fn open_fails_fast_for_missing_module(options: HostOptions) {
    let loader = loader_with(FakeModule::Plugin(&SAMPLE));
    let result = LoadSession::open(&loader, Path::new("/nonexistent/libsample.so"), options);
    assert!(matches!(result, Err(HostError::ModuleNotFound { .. })));
    assert!(loader.loads().is_empty(), "no load may be attempted");
}

#[rstest]
fn metadata_is_copied_before_release(workspace: Workspace, options: HostOptions) {
    let loader = loader_with(FakeModule::Plugin(&SAMPLE));
    let mut session = LoadSession::open(&loader, &workspace.module, options).expect("open");

    let metadata = session
        .load()
        .and_then(|plugin| plugin.metadata())
        .expect("metadata");
    let outcome = session.unload();

    assert_eq!(outcome, UnloadOutcome::Released { attempts: 1 });
    assert_eq!(loader.resident(), 0);
    assert_eq!(metadata.id, "acme.csv");
    assert_eq!(metadata.authors, ["Zoe", "Adam"]);
    assert_eq!(metadata.tags, ["csv", "io", "data"]);
    assert_eq!(metadata.minimum_flowsynx_version, "1.0.0");
}

#[rstest]
fn plugin_access_fails_after_unload(workspace: Workspace, options: HostOptions) {
    let loader = loader_with(FakeModule::Plugin(&SAMPLE));
    let mut session = LoadSession::open(&loader, &workspace.module, options).expect("open");
    let metadata = session
        .load()
        .and_then(|plugin| plugin.metadata())
        .expect("metadata");

    session.unload();

    assert!(matches!(session.plugin(), Err(HostError::Unloaded { .. })));
    assert!(matches!(session.load(), Err(HostError::Unloaded { .. })));
    assert_eq!(metadata.version, "1.2.3", "copied values stay valid");
}

#[rstest]
fn unload_is_idempotent(workspace: Workspace, options: HostOptions) {
    let loader = loader_with(FakeModule::Plugin(&SAMPLE));
    let mut session = LoadSession::open(&loader, &workspace.module, options).expect("open");
    session.load().expect("load");

    assert!(matches!(session.unload(), UnloadOutcome::Released { .. }));
    assert_eq!(session.unload(), UnloadOutcome::AlreadyUnloaded);
    drop(session);

    assert_eq!(loader.closes(), 1, "module must be closed exactly once");
}

#[rstest]
fn drop_unloads_the_session(workspace: Workspace, options: HostOptions) {
    let loader = loader_with(FakeModule::Plugin(&SAMPLE));
    {
        let mut session = LoadSession::open(&loader, &workspace.module, options).expect("open");
        session.load().expect("load");
        assert_eq!(loader.resident(), 1);
    }
    assert_eq!(loader.resident(), 0);
    assert_eq!(loader.closes(), 1);
}

#[rstest]
fn lingering_module_is_not_an_error(workspace: Workspace, options: HostOptions) {
    let loader = loader_with(FakeModule::Plugin(&SAMPLE)).sticky();
    let mut session = LoadSession::open(&loader, &workspace.module, options).expect("open");
    let metadata = session.load().and_then(|plugin| plugin.metadata());

    assert_eq!(session.unload(), UnloadOutcome::Lingering);
    assert!(metadata.is_ok());
}

#[rstest]
fn unloading_before_load_reports_nothing_loaded(workspace: Workspace, options: HostOptions) {
    let loader = loader_with(FakeModule::Plugin(&SAMPLE));
    let mut session = LoadSession::open(&loader, &workspace.module, options).expect("open");
    assert!(matches!(session.plugin(), Err(HostError::NotLoaded { .. })));
    assert_eq!(session.unload(), UnloadOutcome::NotLoaded);
}

#[rstest]
#[case::no_capability(FakeModule::NoCapability)]
#[case::future_abi(FakeModule::Plugin(&FUTURE_ABI))]
#[case::panicking_constructor(FakeModule::Plugin(&PANICKING))]
fn failed_loads_still_release_the_module(
    workspace: Workspace,
    options: HostOptions,
    #[case] module: FakeModule,
) {
    let loader = loader_with(module);
    let mut session = LoadSession::open(&loader, &workspace.module, options).expect("open");

    assert!(session.load().is_err());
    assert!(matches!(session.unload(), UnloadOutcome::Released { .. }));
    assert_eq!(loader.resident(), 0);
}

#[rstest]
fn abi_mismatch_reports_versions(workspace: Workspace, options: HostOptions) {
    let loader = loader_with(FakeModule::Plugin(&FUTURE_ABI));
    let mut session = LoadSession::open(&loader, &workspace.module, options).expect("open");
    match session.load() {
        Err(HostError::AbiMismatch {
            expected, found, ..
        }) => {
            assert_eq!(expected, ABI_VERSION);
            assert_eq!(found, ABI_VERSION + 1);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("load should fail"),
    }
}

#[rstest]
fn instantiation_failure_is_reported(workspace: Workspace, options: HostOptions) {
    let loader = loader_with(FakeModule::Plugin(&PANICKING));
    let mut session = LoadSession::open(&loader, &workspace.module, options).expect("open");
    assert!(matches!(
        session.load(),
        Err(HostError::InstantiationFailed { .. })
    ));
}
