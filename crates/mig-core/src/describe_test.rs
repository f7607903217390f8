use super::*;
use std::fs;
use tempfile::tempdir;

const SCRIPT: &str = r#"case "$1" in
  project) echo billing ;;
  version) echo 2.4 ;;
  release) printf 'rc1\n\n' ;;
  *) exit 3 ;;
esac
"#;

#[test]
fn test_prefix() {
    let info = ProjectInfo::new("billing", "2.4", "rc1");
    assert_eq!(info.prefix(), "billing-2.4-rc1");
    assert!(!info.is_empty());
    assert!(ProjectInfo::default().is_empty());
}

#[test]
fn test_strip_newlines() {
    assert_eq!(strip_newlines("v1\n"), "v1");
    assert_eq!(strip_newlines("a\nb\r\n"), "ab");
    assert_eq!(strip_newlines(""), "");
}

#[test]
fn test_shell_describe_reads_all_fields() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("describe.sh");
    fs::write(&script, SCRIPT).unwrap();

    let describe = ShellDescribe::new("sh", dir.path());
    let info = describe.project_info(&script).unwrap();
    assert_eq!(info, ProjectInfo::new("billing", "2.4", "rc1"));
}

#[test]
fn test_shell_describe_missing_script() {
    let dir = tempdir().unwrap();
    let describe = ShellDescribe::new("sh", dir.path());
    let result = describe.project_info(&dir.path().join("describe.sh"));
    assert!(matches!(
        result,
        Err(CoreError::DescribeScriptNotFound { .. })
    ));
}

#[test]
fn test_shell_describe_non_zero_exit() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("describe.sh");
    fs::write(&script, "exit 1\n").unwrap();

    let describe = ShellDescribe::new("sh", dir.path());
    match describe.field(&script, DescribeField::Version) {
        Err(CoreError::DescribeFailed { field, .. }) => assert_eq!(field, "version"),
        other => panic!("expected DescribeFailed, got {:?}", other),
    }
}

#[test]
fn test_shell_describe_unknown_shell() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("describe.sh");
    fs::write(&script, SCRIPT).unwrap();

    let describe = ShellDescribe::new("definitely-not-a-shell-binary", dir.path());
    let result = describe.field(&script, DescribeField::Project);
    assert!(matches!(result, Err(CoreError::DescribeFailed { .. })));
}
