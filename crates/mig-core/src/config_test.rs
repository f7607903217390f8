use super::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_parse_empty_config() {
    let config: Config = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config.catalog_path, "migrations");
    assert_eq!(config.describe_script, "scripts/describe.sh");
    assert!(config.include_template);
    assert_eq!(config.shell, "bash");
    assert!(config.submodules.paths.is_none());
    assert_eq!(
        config.submodules.describe_candidates,
        vec!["describe.sh", "scripts/describe.sh"]
    );
    assert_eq!(config.check.concurrency, 8);
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
catalog_path: db/catalog
describe_script: tools/describe.sh
template_path: tools/template.sql
include_template: false
shell: sh
submodules:
  paths:
    - libs/billing
    - libs/auth
  migrations_path: sql
  describe_candidates:
    - meta/describe.sh
check:
  concurrency: 2
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.catalog_path, "db/catalog");
    assert!(!config.include_template);
    assert_eq!(
        config.submodules.paths.as_deref(),
        Some(&["libs/billing".to_string(), "libs/auth".to_string()][..])
    );
    assert_eq!(config.submodules.migrations_path, "sql");
    assert_eq!(config.check.concurrency, 2);
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("catalog_dir: nope");
    assert!(result.is_err());
}

#[test]
fn test_load_from_dir_without_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.catalog_path, "migrations");
}

#[test]
fn test_load_from_dir_prefers_yml() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("migration.yml"), "catalog_path: a").unwrap();
    fs::write(dir.path().join("migration.yaml"), "catalog_path: b").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.catalog_path, "a");
}

#[test]
fn test_load_missing_explicit_file() {
    let dir = tempdir().unwrap();
    let result = Config::load(&dir.path().join("custom.yml"));
    assert!(matches!(result, Err(CoreError::ConfigNotFound { .. })));
}

#[test]
fn test_load_invalid_yaml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("migration.yml");
    fs::write(&path, "catalog_path: [unterminated").unwrap();
    let result = Config::load(&path);
    assert!(matches!(result, Err(CoreError::ConfigParseError { .. })));
}

#[test]
fn test_validate_rejects_zero_concurrency() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("migration.yml");
    fs::write(&path, "check:\n  concurrency: 0\n").unwrap();
    let result = Config::load(&path);
    assert!(matches!(result, Err(CoreError::ConfigInvalid { .. })));
}

#[test]
fn test_validate_rejects_empty_candidates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("migration.yml");
    fs::write(&path, "submodules:\n  describe_candidates: []\n").unwrap();
    let result = Config::load(&path);
    assert!(matches!(result, Err(CoreError::ConfigInvalid { .. })));
}

#[test]
fn test_layout_resolves_against_root() {
    let root = std::path::PathBuf::from("/tmp/project");
    let layout = Layout::with_defaults(&root);
    assert_eq!(layout.catalog_dir, root.join("migrations"));
    assert_eq!(layout.describe_script, root.join("scripts/describe.sh"));
    assert_eq!(
        layout.template,
        root.join("scripts/migration.template.sql")
    );
    assert_eq!(layout.submodule_migrations, PathBuf::from("migrations"));
    assert_eq!(layout.describe_candidates.len(), 2);
}

#[test]
fn test_layout_carries_configured_shell() {
    let config: Config = serde_yaml::from_str("shell: sh\ncheck:\n  concurrency: 3\n").unwrap();
    let layout = config.layout(Path::new("/tmp/project"));
    assert_eq!(layout.shell, "sh");
    assert_eq!(layout.concurrency, 3);
    assert_eq!(Layout::with_defaults(Path::new("/tmp/project")).shell, "bash");
}
