//! Hook batches run through the host shell

use super::helpers::*;
use haul::models::ErrorKind;
use std::fs;
use tempfile::TempDir;

#[cfg(unix)]
#[test]
fn test_cd_and_export_carry_over_within_a_batch() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let dir = temp.path().canonicalize().unwrap();

    let commands = vec![
        format!("cd {}", dir.display()),
        "export HAUL_IT_GREETING=hello".to_string(),
        "sleep 1".to_string(),
        "pwd > where.txt".to_string(),
        "printf '%s' \"$HAUL_IT_GREETING\" > greeting.txt".to_string(),
    ];

    let errors = quick_interpreter().run_batch(&commands, false).drain();
    assert!(errors.is_empty(), "{:?}", errors.errors);
    assert_eq!(errors.slots, 5);

    let pwd = fs::read_to_string(dir.join("where.txt")).unwrap();
    assert_eq!(pwd.trim(), dir.display().to_string());
    assert_eq!(fs::read_to_string(dir.join("greeting.txt")).unwrap(), "hello");
}

#[cfg(unix)]
#[test]
fn test_each_batch_starts_from_a_fresh_context() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let dir = temp.path().canonicalize().unwrap();
    let interpreter = quick_interpreter();

    let first = vec!["export HAUL_IT_ONLY_FIRST=set".to_string()];
    assert!(interpreter.run_batch(&first, false).drain().is_empty());

    let out = dir.join("second.txt");
    let second = vec![format!(
        "printf '%s' \"$HAUL_IT_ONLY_FIRST\" > {}",
        out.display()
    )];
    assert!(interpreter.run_batch(&second, false).drain().is_empty());
    assert_eq!(fs::read_to_string(&out).unwrap(), "");
}

#[cfg(unix)]
#[test]
fn test_cd_to_missing_directory_keeps_previous_cwd() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let dir = temp.path().canonicalize().unwrap();
    let missing = dir.join("does-not-exist");

    let commands = vec![
        format!("cd {}", dir.display()),
        format!("cd {}", missing.display()),
        "pwd > where.txt".to_string(),
    ];

    let errors = quick_interpreter().run_batch(&commands, false).drain();
    assert_eq!(errors.count(), 1);
    assert_eq!(errors.errors[0].kind, ErrorKind::CommandInvalid);
    assert_eq!(errors.errors[0].source, format!("cd {}", missing.display()));

    let pwd = fs::read_to_string(dir.join("where.txt")).unwrap();
    assert_eq!(pwd.trim(), dir.display().to_string());
}

#[cfg(unix)]
#[test]
fn test_failing_sub_command_does_not_stop_the_line() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let marker = temp.path().join("after.txt");

    let commands = vec![format!("false & touch {}", marker.display())];
    let errors = quick_interpreter().run_batch(&commands, true).drain();

    assert_eq!(errors.slots, 1);
    assert_eq!(errors.count(), 1);
    assert_eq!(errors.errors[0].kind, ErrorKind::CommandFailed);
    assert_eq!(errors.errors[0].source, "false");
    assert!(marker.exists());
}

#[cfg(unix)]
#[test]
fn test_redirection_ampersand_is_not_a_separator() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let out = temp.path().join("both.txt");

    let commands = vec![format!("echo visible > {} 2>&1", out.display())];
    let errors = quick_interpreter().run_batch(&commands, false).drain();

    assert!(errors.is_empty(), "{:?}", errors.errors);
    assert_eq!(fs::read_to_string(&out).unwrap().trim(), "visible");
}

#[cfg(unix)]
#[test]
fn test_stderr_message_is_reported() {
    let commands = vec!["echo broken >&2; exit 3".to_string()];
    let errors = quick_interpreter().run_batch(&commands, false).drain();

    assert_eq!(errors.count(), 1);
    assert_eq!(errors.errors[0].message, "broken");
}
