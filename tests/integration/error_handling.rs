// tests/integration/error_handling.rs

use std::io::Write;

use tempfile::NamedTempFile;
use unitdag::config::{lint, load_and_validate, ConfigWarning};
use unitdag::errors::UnitdagError;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_invalid_pattern_returns_config_error() {
    let file = config_file(
        r#"
[unit.A]
command = "echo"
expected_stdout_regex = "([unclosed"
"#,
    );

    match load_and_validate(file.path()) {
        Err(UnitdagError::ConfigError(msg)) => {
            assert!(msg.contains("A"), "{msg}");
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_blank_command_returns_config_error() {
    let file = config_file(
        r#"
[unit.A]
command = "   "
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(UnitdagError::ConfigError(_))
    ));
}

#[test]
fn test_malformed_toml_returns_toml_error() {
    let file = config_file("[unit.A\ncommand = \"echo\"\n");

    assert!(matches!(
        load_and_validate(file.path()),
        Err(UnitdagError::TomlError(_))
    ));
}

#[test]
fn test_missing_file_returns_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("nope.toml"));
    assert!(matches!(result, Err(UnitdagError::IoError(_))));
}

#[test]
fn test_unknown_dependency_and_cycle_load_but_lint() {
    let file = config_file(
        r#"
[unit.A]
command = "true"
dependencies = ["B"]

[unit.B]
command = "true"
dependencies = ["! A"]

[unit.C]
command = "true"
dependencies = ["ghost", "C"]
"#,
    );

    // Loading succeeds: references are only resolved when the run gets to them.
    let cfg = load_and_validate(file.path()).unwrap();
    let warnings = lint(&cfg);

    assert!(warnings.contains(&ConfigWarning::Cycle {
        units: vec!["A".to_string(), "B".to_string()],
    }));
    assert!(warnings.contains(&ConfigWarning::UnknownDependency {
        unit: "C".to_string(),
        dependency: "ghost".to_string(),
    }));
    assert!(warnings.contains(&ConfigWarning::SelfDependency {
        unit: "C".to_string(),
    }));
    assert_eq!(warnings.len(), 3);
}
