use super::*;
use std::fs;
use tempfile::tempdir;

fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_parse_directive() {
    assert_eq!(parse_directive("@common/a.sql"), Some("common/a.sql"));
    assert_eq!(parse_directive("   @ b.sql ; trailing comment"), Some("b.sql"));
    assert_eq!(parse_directive("@c.sql;"), Some("c.sql"));
    assert_eq!(parse_directive("@"), None);
    assert_eq!(parse_directive("@ ; only comment"), None);
    assert_eq!(parse_directive("select '@x.sql';"), None);
    assert_eq!(parse_directive("-- @x.sql"), None);
}

#[test]
fn test_resolve_flat_and_nested() {
    let dir = tempdir().unwrap();
    let top = write(
        dir.path(),
        "m.up.sql",
        "@lib/a.sql\nselect 1;\n  @lib/b.sql ; grants\n",
    );
    write(dir.path(), "lib/a.sql", "@inner/c.sql\n");
    write(dir.path(), "lib/inner/c.sql", "select 3;\n");
    write(dir.path(), "lib/b.sql", "select 2;\n");

    let graph = IncludeResolver::resolve_once(&top).unwrap();
    assert_eq!(
        graph.includes,
        vec![
            PathBuf::from("lib/a.sql"),
            PathBuf::from("lib/inner/c.sql"),
            PathBuf::from("lib/b.sql"),
        ]
    );
    assert!(graph.rejected.is_empty());
}

#[test]
fn test_nested_parent_reference_is_normalized() {
    let dir = tempdir().unwrap();
    let top = write(dir.path(), "m.up.sql", "@lib/a.sql\n");
    write(dir.path(), "lib/a.sql", "@../shared.sql\n");
    write(dir.path(), "shared.sql", "select 1;\n");

    let graph = IncludeResolver::resolve_once(&top).unwrap();
    assert_eq!(
        graph.includes,
        vec![PathBuf::from("lib/a.sql"), PathBuf::from("shared.sql")]
    );
}

#[test]
fn test_missing_and_non_sql_targets_are_rejected() {
    let dir = tempdir().unwrap();
    let top = write(
        dir.path(),
        "m.up.sql",
        "@missing.sql\n@notes.txt\n@ok.sql\n",
    );
    write(dir.path(), "notes.txt", "hi");
    write(dir.path(), "ok.sql", "");

    let graph = IncludeResolver::resolve_once(&top).unwrap();
    assert_eq!(graph.includes, vec![PathBuf::from("ok.sql")]);
    assert_eq!(graph.rejected.len(), 2);
    assert_eq!(graph.rejected[0].target, "missing.sql");
    assert_eq!(graph.rejected[0].reason, RejectReason::Missing);
    assert_eq!(graph.rejected[0].resolved, dir.path().join("missing.sql"));
    assert_eq!(graph.rejected[1].reason, RejectReason::NotSql);

    let missing: Vec<_> = graph.missing().collect();
    assert_eq!(missing.len(), 1);
}

#[test]
fn test_mutual_includes_terminate() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.sql", "@b.sql\n");
    write(dir.path(), "b.sql", "@a.sql\n");

    let graph = IncludeResolver::resolve_once(&a).unwrap();
    assert_eq!(graph.includes, vec![PathBuf::from("b.sql")]);

    let b = dir.path().join("b.sql");
    let graph = IncludeResolver::resolve_once(&b).unwrap();
    assert_eq!(graph.includes, vec![PathBuf::from("a.sql")]);
}

#[test]
fn test_diamond_lists_each_include_once() {
    let dir = tempdir().unwrap();
    let top = write(dir.path(), "m.up.sql", "@b.sql\n@c.sql\n@b.sql\n");
    write(dir.path(), "b.sql", "@d.sql\n");
    write(dir.path(), "c.sql", "@d.sql\n");
    write(dir.path(), "d.sql", "");

    let graph = IncludeResolver::resolve_once(&top).unwrap();
    assert_eq!(
        graph.includes,
        vec![
            PathBuf::from("b.sql"),
            PathBuf::from("d.sql"),
            PathBuf::from("c.sql"),
        ]
    );
}

#[test]
fn test_self_include_is_ignored() {
    let dir = tempdir().unwrap();
    let top = write(dir.path(), "m.up.sql", "@m.up.sql\n");
    let graph = IncludeResolver::resolve_once(&top).unwrap();
    assert!(graph.includes.is_empty());
}

#[test]
fn test_scope_per_call_vs_run() {
    let dir = tempdir().unwrap();
    let up = write(dir.path(), "x.up.sql", "@shared.sql\n");
    let down = write(dir.path(), "x.down.sql", "@shared.sql\n");
    write(dir.path(), "shared.sql", "");

    let mut per_call = IncludeResolver::new(VisitScope::PerCall);
    assert_eq!(per_call.resolve(&up).unwrap().includes.len(), 1);
    assert_eq!(per_call.resolve(&down).unwrap().includes.len(), 1);

    let mut run = IncludeResolver::new(VisitScope::Run);
    assert_eq!(run.resolve(&up).unwrap().includes.len(), 1);
    assert!(run.resolve(&down).unwrap().includes.is_empty());
}

#[test]
fn test_unreadable_top_level_is_error() {
    let dir = tempdir().unwrap();
    let result = IncludeResolver::resolve_once(&dir.path().join("nope.up.sql"));
    assert!(matches!(result, Err(CoreError::IoWithPath { .. })));
}

#[test]
fn test_normalize() {
    assert_eq!(normalize(Path::new("a/./b/../c.sql")), PathBuf::from("a/c.sql"));
    assert_eq!(normalize(Path::new("../x.sql")), PathBuf::from("../x.sql"));
    assert_eq!(normalize(Path::new("a/../../x.sql")), PathBuf::from("../x.sql"));
}
