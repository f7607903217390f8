use super::*;
use mig_core::test_utils::{write_file, StaticDescribe};
use mig_core::ProjectInfo;
use tempfile::tempdir;

fn setup() -> (tempfile::TempDir, Layout, StaticDescribe) {
    let dir = tempdir().unwrap();
    let layout = Layout::with_defaults(dir.path());
    let describe = StaticDescribe::new().with(
        layout.describe_script.clone(),
        ProjectInfo::new("core", "v1", "1"),
    );
    (dir, layout, describe)
}

#[test]
fn test_first_migration_with_template() {
    let (_dir, layout, describe) = setup();
    write_file(&layout.root, "scripts/migration.template.sql", "-- write sql here");

    let created = add_migration(&layout, &describe).unwrap();
    assert_eq!(created.name, "core-v1-1-1");
    assert_eq!(created.up, layout.catalog_dir.join("core-v1-1-1.up.sql"));
    assert_eq!(
        fs::read_to_string(&created.up).unwrap(),
        "# core-v1-1-1.up.sql\n-- write sql here\n"
    );
    assert_eq!(
        fs::read_to_string(&created.down).unwrap(),
        "# core-v1-1-1.down.sql\n-- write sql here\n"
    );
}

#[test]
fn test_sequence_continues_after_highest() {
    let (_dir, layout, describe) = setup();
    write_file(&layout.catalog_dir, "core-v1-1-1.up.sql", "");
    write_file(&layout.catalog_dir, "core-v1-1-7.down.sql", "");
    write_file(&layout.catalog_dir, "other-v1-1-40.up.sql", "");

    let created = add_migration(&layout, &describe).unwrap();
    assert_eq!(created.name, "core-v1-1-8");
}

#[test]
fn test_missing_template_is_not_fatal() {
    let (_dir, layout, describe) = setup();
    let created = add_migration(&layout, &describe).unwrap();
    assert_eq!(
        fs::read_to_string(&created.up).unwrap(),
        "# core-v1-1-1.up.sql\n\n"
    );
}

#[test]
fn test_template_disabled() {
    let (_dir, mut layout, describe) = setup();
    write_file(&layout.root, "scripts/migration.template.sql", "-- ignored");
    layout.include_template = false;

    let created = add_migration(&layout, &describe).unwrap();
    assert_eq!(
        fs::read_to_string(&created.down).unwrap(),
        "# core-v1-1-1.down.sql\n\n"
    );
}

#[test]
fn test_describe_failure_creates_nothing() {
    let dir = tempdir().unwrap();
    let layout = Layout::with_defaults(dir.path());

    let result = add_migration(&layout, &StaticDescribe::new());
    assert!(matches!(
        result,
        Err(CoreError::DescribeScriptNotFound { .. })
    ));
    assert!(!layout.catalog_dir.exists());
}
