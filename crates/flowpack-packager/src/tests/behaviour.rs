//! Behaviour-driven tests for packaging runs.

use std::cell::RefCell;
use std::fs::{self, File};
use std::path::PathBuf;
use std::rc::Rc;

use flowpack_host::testing::{FakeLoader, FakeModule, SAMPLE, module_file_name};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;
use zip::ZipArchive;

use crate::error::PackError;
use crate::options::PackOptions;
use crate::pipeline::{PackageReport, Packager};
use crate::stage::Stage;

use super::StubCargo;

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

struct TestWorld {
    root: TempDir,
    project: Option<PathBuf>,
    output: PathBuf,
    build_failure: Option<String>,
    exposes_plugin: bool,
    calls: Rc<RefCell<Vec<String>>>,
    outcome: Option<Result<PackageReport, PackError>>,
}

impl TestWorld {
    fn scratch(&self) -> PathBuf {
        self.root.path().join("scratch")
    }

    fn error(&self) -> &PackError {
        self.outcome
            .as_ref()
            .expect("no outcome captured")
            .as_ref()
            .expect_err("expected failure but packaging succeeded")
    }
}

#[fixture]
fn world() -> TestWorld {
    let root = TempDir::new().expect("create workspace");
    fs::create_dir(root.path().join("scratch")).expect("create scratch dir");
    let output = root.path().join("plugin.fspack");
    TestWorld {
        root,
        project: None,
        output,
        build_failure: None,
        exposes_plugin: false,
        calls: Rc::default(),
        outcome: None,
    }
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a plugin project {name}")]
fn given_project(world: &mut TestWorld, name: String) {
    let package = name.trim_matches('"');
    let dir = world.root.path().join(package);
    fs::create_dir_all(&dir).expect("create project dir");
    let manifest = dir.join("Cargo.toml");
    fs::write(
        &manifest,
        format!("[package]\nname = \"{package}\"\nversion = \"0.1.0\"\n"),
    )
    .expect("write project file");
    world.project = Some(manifest);
}

#[given("the output path {path}")]
fn given_output(world: &mut TestWorld, path: String) {
    world.output = world.root.path().join(path.trim_matches('"'));
}

#[given("a build that succeeds")]
fn given_successful_build(world: &mut TestWorld) {
    world.build_failure = None;
}

#[given("a build that fails with {diagnostic}")]
fn given_failing_build(world: &mut TestWorld, diagnostic: String) {
    world.build_failure = Some(diagnostic.trim_matches('"').to_owned());
}

#[given("a published module exposing the sample plugin")]
fn given_sample_module(world: &mut TestWorld) {
    world.exposes_plugin = true;
}

#[given("a published module exposing no plugin")]
fn given_empty_module(world: &mut TestWorld) {
    world.exposes_plugin = false;
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("the project is packaged")]
fn when_packaged(world: &mut TestWorld) {
    let project = world.project.clone().expect("project configured");
    let module_name = module_file_name("libplugin");
    let runner = StubCargo {
        module: world.root.path().join(&module_name),
        build_failure: world.build_failure.clone(),
        calls: Rc::clone(&world.calls),
    };
    let module = if world.exposes_plugin {
        FakeModule::Plugin(&SAMPLE)
    } else {
        FakeModule::NoCapability
    };
    let loader = FakeLoader::new().with_module(&module_name, module);
    let options = PackOptions::new(project)
        .with_output_path(Some(world.output.clone()))
        .with_scratch_dir(world.scratch());

    world.outcome = Some(Packager::new(options, runner, loader).run());
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the package holds the plugin, manifest and checksum entries")]
fn then_three_entries(world: &mut TestWorld) {
    let report = world
        .outcome
        .as_ref()
        .expect("no outcome captured")
        .as_ref()
        .expect("expected packaging to succeed");
    let file = File::open(report.output_path()).expect("open package");
    let archive = ZipArchive::new(file).expect("read package");
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort_unstable();
    assert_eq!(
        names,
        ["manifest.json", "sample-plugin.plugin", "sample-plugin.plugin.sha256"]
    );
}

#[then("packaging fails at the {stage} stage")]
fn then_fails_at(world: &mut TestWorld, stage: String) {
    let expected = stage.trim_matches('"');
    let error = world.error();
    let actual = error.stage().map(Stage::as_str);
    assert_eq!(actual, Some(expected), "unexpected failure: {error}");
}

#[then("the failure mentions {text}")]
fn then_failure_mentions(world: &mut TestWorld, text: String) {
    let expected = text.trim_matches('"');
    let message = world.error().to_string();
    assert!(message.contains(expected), "message was: {message}");
}

#[then("no build command was run")]
fn then_no_build(world: &mut TestWorld) {
    assert!(world.calls.borrow().is_empty(), "calls: {:?}", world.calls.borrow());
}

#[then("no package is written")]
fn then_no_package(world: &mut TestWorld) {
    assert!(!world.output.exists());
}

#[then("no temporary files remain")]
fn then_no_temporaries(world: &mut TestWorld) {
    let remaining = fs::read_dir(world.scratch()).expect("list scratch").count();
    assert_eq!(remaining, 0);
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/packaging.feature")]
fn packaging_behaviour(world: TestWorld) {
    let _ = world;
}
