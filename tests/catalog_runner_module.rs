use just_ui::catalog::{CatalogError, ParameterKind, RunnerSpec};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).expect("write script");
    let mut perms = fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod");
}

const DUMP: &str = r#"{"recipes":{"hello":{"name":"hello","doc":"Say hello","dependencies":[],"parameters":[{"name":"name","default":"World","kind":"singular"}]},"cat":{"name":"cat","doc":null,"dependencies":[{"recipe":"hello","arguments":[]}],"parameters":[{"name":"files","default":null,"kind":"star"}]}}}"#;

/// A stand-in `just` that records its argv and answers dump/show calls.
fn mock_runner(dir: &Path) -> PathBuf {
    let path = dir.join("just");
    let log = dir.join("argv.log");
    write_script(
        &path,
        &format!(
            "#!/bin/sh\necho \"$*\" >> '{log}'\ncase \"$*\" in\n  *--dump*) printf '%s' '{DUMP}' ;;\n  *--show\\ hello*) printf 'hello name=\"World\":\\n    echo hi\\n' ; echo 'warning: shown' >&2 ;;\n  *--show*) echo 'error: no such recipe' >&2 ; exit 1 ;;\nesac\n",
            log = log.display()
        ),
    );
    path
}

fn spec(binary: &Path) -> RunnerSpec {
    RunnerSpec {
        binary: binary.display().to_string(),
        ..RunnerSpec::default()
    }
}

#[test]
fn load_catalog_reads_the_dump() {
    let dir = tempdir().expect("tempdir");
    let runner = mock_runner(dir.path());

    let catalog = spec(&runner).load_catalog().expect("catalog");
    assert_eq!(catalog.len(), 2);
    let cat = catalog.get("cat").expect("cat");
    assert_eq!(cat.dependencies, vec!["hello".to_string()]);
    assert_eq!(cat.parameters[0].kind, ParameterKind::Star);
    assert_eq!(
        catalog.get("hello").and_then(|t| t.description.as_deref()),
        Some("Say hello")
    );

    let argv = fs::read_to_string(dir.path().join("argv.log")).expect("argv log");
    assert_eq!(argv.trim(), "--dump --dump-format json");
}

#[test]
fn global_flags_reach_every_invocation() {
    let dir = tempdir().expect("tempdir");
    let runner = mock_runner(dir.path());
    let spec = RunnerSpec {
        justfile: Some(PathBuf::from("ci/justfile")),
        working_directory: Some(PathBuf::from("/srv/app")),
        ..spec(&runner)
    };

    spec.load_catalog().expect("catalog");
    spec.show_task("hello");

    let argv = fs::read_to_string(dir.path().join("argv.log")).expect("argv log");
    let lines: Vec<&str> = argv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "--justfile ci/justfile --working-directory /srv/app --dump --dump-format json",
            "--justfile ci/justfile --working-directory /srv/app --color always --show hello",
        ]
    );
    assert_eq!(
        spec.task_argv("hello", vec!["World".to_string()]),
        vec![
            runner.display().to_string(),
            "--justfile".to_string(),
            "ci/justfile".to_string(),
            "--working-directory".to_string(),
            "/srv/app".to_string(),
            "hello".to_string(),
            "World".to_string(),
        ]
    );
}

#[test]
fn show_task_combines_stdout_and_stderr() {
    let dir = tempdir().expect("tempdir");
    let runner = mock_runner(dir.path());

    let detail = spec(&runner).show_task("hello");
    assert!(detail.starts_with("hello name=\"World\":"));
    assert!(detail.contains("warning: shown"));
}

#[test]
fn show_task_failure_becomes_display_text() {
    let dir = tempdir().expect("tempdir");
    let runner = mock_runner(dir.path());

    let detail = spec(&runner).show_task("missing");
    assert!(detail.starts_with("Error fetching details:"));
    assert!(detail.contains("error: no such recipe"));
}

#[test]
fn missing_runner_is_reported_by_name() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("not-installed");

    let err = spec(&missing).load_catalog().expect_err("missing runner");
    assert!(matches!(err, CatalogError::MissingRunner { ref binary } if binary.ends_with("not-installed")));
}

#[test]
fn failing_dump_is_fatal() {
    let dir = tempdir().expect("tempdir");
    let runner = dir.path().join("just");
    write_script(&runner, "#!/bin/sh\necho 'error: no justfile found' >&2\nexit 1\n");

    let err = spec(&runner).load_catalog().expect_err("dump fails");
    assert!(matches!(err, CatalogError::NonZeroExit { .. }));
    assert!(err.to_string().contains("no justfile found"));
}

#[test]
fn malformed_dump_is_a_parse_error() {
    let dir = tempdir().expect("tempdir");
    let runner = dir.path().join("just");
    write_script(&runner, "#!/bin/sh\necho 'not json'\n");

    let err = spec(&runner).load_catalog().expect_err("bad json");
    assert!(matches!(err, CatalogError::Parse { .. }));
}
