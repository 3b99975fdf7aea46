use assert_matches::assert_matches;
use fusion_core::{BuildConfig, FusionParser, IncludeError, IncludeResolver, MergedTree};
use fusion_error::{
    error::{CompileError, ErrorKind},
    handler::Handler,
    warning::CompileWarning,
};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tempfile::TempDir;

fn fixture(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, src) in files {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, src).unwrap();
    }
    dir
}

fn globbing() -> TempDir {
    fixture(&[
        ("root.fusion", "\"root.fusion\" = true"),
        ("file.fusion", "\"file.fusion\" = true"),
        ("file with space.fusion", "\"file with space.fusion\" = true"),
        ("Globbing/Nested/level2-A.fusion", "\"Globbing/Nested/level2-A.fusion\" = true"),
        ("Globbing/Nested/level2-B.fusion", "\"Globbing/Nested/level2-B.fusion\" = true"),
        ("Globbing/Nested/level2-C.js", "\"Globbing/Nested/level2-C.js\" = true"),
        ("Globbing/Nested/Deep/level3-A.fusion", "\"Globbing/Nested/Deep/level3-A.fusion\" = true"),
        ("Globbing/level1-A.fusion", "\"Globbing/level1-A.fusion\" = true"),
        ("Globbing/level1-B.fusion", "\"Globbing/level1-B.fusion\" = true"),
        ("Globbing/level1-D.js", "\"Globbing/level1-D.js\" = true"),
    ])
}

fn parse_in(dir: &Path, context: &str, src: &str) -> Result<MergedTree, CompileError> {
    let handler = Handler::default();
    let path = Some(Arc::new(dir.join(context)));
    match FusionParser::new().parse_from_source(&handler, src, path) {
        Ok(tree) => Ok(tree),
        Err(_) => Err(handler.consume().0.remove(0)),
    }
}

fn keys(tree: &MergedTree) -> Vec<String> {
    tree.as_map().keys().cloned().collect()
}

#[test]
fn single_files() {
    let dir = globbing();
    for src in [
        "include:file.fusion",
        "include:'./file.fusion'",
        "include:  \"  ./file.fusion  \"  ",
        "include: Globbing/../file.fusion // comment",
    ] {
        let tree = parse_in(dir.path(), "root.fusion", src).unwrap();
        assert_eq!(keys(&tree), ["file.fusion"], "{src:?}");
    }
    let tree = parse_in(dir.path(), "root.fusion", "include: 'file with space.fusion'").unwrap();
    assert_eq!(keys(&tree), ["file with space.fusion"]);
}

#[test]
fn self_inclusion_is_skipped() {
    let dir = globbing();
    let tree = parse_in(dir.path(), "file.fusion", "include:./file.fusion").unwrap();
    assert!(tree.is_empty());

    let tree = parse_in(dir.path(), "Globbing/level1-A.fusion", "include: **/*").unwrap();
    assert_eq!(
        keys(&tree),
        [
            "Globbing/Nested/Deep/level3-A.fusion",
            "Globbing/Nested/level2-A.fusion",
            "Globbing/Nested/level2-B.fusion",
            "Globbing/level1-B.fusion",
        ]
    );
}

#[test]
fn globs() {
    let dir = globbing();
    let tree = parse_in(dir.path(), "root.fusion", "include: Globbing/* ").unwrap();
    assert_eq!(keys(&tree), ["Globbing/level1-A.fusion", "Globbing/level1-B.fusion"]);

    let tree = parse_in(dir.path(), "root.fusion", "include: ./Globbing/**/*-A.fusion").unwrap();
    assert_eq!(
        keys(&tree),
        [
            "Globbing/Nested/Deep/level3-A.fusion",
            "Globbing/Nested/level2-A.fusion",
            "Globbing/level1-A.fusion",
        ]
    );

    let tree = parse_in(dir.path(), "Globbing/Nested/level2-A.fusion", "include: ../*.js").unwrap();
    assert_eq!(keys(&tree), ["Globbing/level1-D.js"]);
}

#[test]
fn configured_default_extension() {
    let dir = globbing();
    let parser = FusionParser::with_config(BuildConfig {
        default_extension: ".js".into(),
        ..Default::default()
    });
    let handler = Handler::default();
    let tree = parser
        .parse_from_source(&handler, "include: Globbing/**/*", Some(Arc::new(dir.path().join("root.fusion"))))
        .unwrap();
    assert_eq!(keys(&tree), ["Globbing/Nested/level2-C.js", "Globbing/level1-D.js"]);
}

#[test]
fn later_includes_win() {
    let dir = fixture(&[
        ("Root.fusion", "x = 'root'\ninclude: Parts/*\n"),
        ("Parts/A.fusion", "x = 'a'\ny = 'a'"),
        ("Parts/B.fusion", "x = 'b'"),
    ]);
    let handler = Handler::default();
    let tree = FusionParser::new()
        .parse_from_file(&handler, &dir.path().join("Root.fusion"))
        .unwrap();
    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        json!({"x": "b", "y": "a"})
    );
}

#[test]
fn nested_includes_resolve_relative_to_their_file() {
    let dir = fixture(&[
        ("Root.fusion", "include: Nested/Main.fusion\nroot = 1"),
        ("Nested/Main.fusion", "include: Leaf.fusion\nmain = 1"),
        ("Nested/Leaf.fusion", "leaf = 1"),
    ]);
    let handler = Handler::default();
    let tree = FusionParser::new()
        .parse_from_file(&handler, &dir.path().join("Root.fusion"))
        .unwrap();
    assert_eq!(keys(&tree), ["leaf", "main", "root"]);
}

#[test]
fn include_cycles_are_errors() {
    let dir = fixture(&[
        ("A.fusion", "include: B.fusion"),
        ("B.fusion", "include: A.fusion"),
    ]);
    let handler = Handler::default();
    assert!(FusionParser::new()
        .parse_from_file(&handler, &dir.path().join("A.fusion"))
        .is_err());
    let (errors, _) = handler.consume();
    assert_matches!(&errors[..], [CompileError::IncludeCycle { file, .. }] if file.ends_with("A.fusion"));
    assert_eq!(errors[0].kind(), ErrorKind::Io);
}

#[test]
fn include_failures() {
    let dir = globbing();
    let err = parse_in(dir.path(), "root.fusion", "include: missing.fusion").unwrap_err();
    assert_matches!(&err, CompileError::IncludeRead { pattern, .. } if pattern == "missing.fusion");
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(err.code(), Some(1347977017));

    let err = parse_in(dir.path(), "root.fusion", "include: Globbing/*/level2-A.fusion").unwrap_err();
    assert_matches!(err, CompileError::Include { .. });

    let err = fusion_core::parse("include: file.fusion").unwrap_err();
    assert_matches!(err, CompileError::Include { .. });

    let err = fusion_core::parse_file(&dir.path().join("nope.fusion")).unwrap_err();
    assert_matches!(err, CompileError::ReadFile { .. });
}

#[test]
fn errors_in_included_files_point_into_them() {
    let dir = fixture(&[
        ("Root.fusion", "a = 1\ninclude: Broken.fusion"),
        ("Broken.fusion", "ok = 1\nbroken {\n"),
    ]);
    let err = fusion_core::parse_file(&dir.path().join("Root.fusion")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_matches!(err.path(), Some(path) if path.ends_with("Broken.fusion"));
    assert_eq!(err.line_col().0.line, 2);
}

#[test]
fn empty_globs_warn() {
    let dir = fixture(&[("Root.fusion", ""), ("Empty/readme.txt", "")]);
    let handler = Handler::default();
    let tree = FusionParser::new()
        .parse_from_source(&handler, "include: Empty/*", Some(Arc::new(dir.path().join("Root.fusion"))))
        .unwrap();
    assert!(tree.is_empty());
    let (errors, warnings) = handler.consume();
    assert!(errors.is_empty());
    assert_matches!(&warnings[..], [CompileWarning::IncludeMatchedNothing { pattern, .. }] if pattern == "Empty/*");
}

#[test]
fn hierarchy_is_built_once_for_everything_included() {
    let dir = fixture(&[
        ("Root.fusion", "include: Proto/*\nprototype(V:A) < prototype(V:B)"),
        ("Proto/B.fusion", "prototype(V:B) < prototype(V:C)"),
    ]);
    let path = dir.path().join("Root.fusion");
    let handler = Handler::default();
    let tree = FusionParser::new().parse_from_file(&handler, &path).unwrap();
    assert_eq!(
        serde_json::to_value(tree.get("__prototypes")).unwrap(),
        json!({
            "V:B": {"__prototypeObjectName": "V:C", "__prototypeChain": ["V:C"]},
            "V:A": {"__prototypeObjectName": "V:B", "__prototypeChain": ["V:C", "V:B"]},
        })
    );

    let parser = FusionParser::with_config(BuildConfig {
        build_hierarchy: false,
        ..Default::default()
    });
    let tree = parser.parse_from_file(&handler, &path).unwrap();
    assert_eq!(tree.get_path(&["__prototypes", "V:A", "__prototypeChain"]), None);
}

/// Serves sources from memory and resolves every pattern to a fixed list.
struct InMemoryResolver {
    files: IndexMap<PathBuf, String>,
    order: Vec<PathBuf>,
}

impl IncludeResolver for InMemoryResolver {
    fn resolve(&self, _pattern: &str, _current_file: Option<&Path>) -> Result<Vec<PathBuf>, IncludeError> {
        Ok(self.order.clone())
    }

    fn read_source(&self, file: &Path) -> Result<String, IncludeError> {
        self.files
            .get(file)
            .cloned()
            .ok_or_else(|| IncludeError::NotFound(file.to_path_buf()))
    }
}

#[test]
fn resolver_order_decides_the_winner() {
    let files: IndexMap<PathBuf, String> = [
        (PathBuf::from("first.fusion"), "x = 'first'".to_string()),
        (PathBuf::from("second.fusion"), "x = 'second'".to_string()),
    ]
    .into();
    for (order, expected) in [
        (["first.fusion", "second.fusion"], "second"),
        (["second.fusion", "first.fusion"], "first"),
    ] {
        let parser = FusionParser::new().with_include_resolver(InMemoryResolver {
            files: files.clone(),
            order: order.iter().map(PathBuf::from).collect(),
        });
        let handler = Handler::default();
        let tree = parser
            .parse_from_source(&handler, "include: Parts/*", Some(Arc::new("Root.fusion".into())))
            .unwrap();
        let value: Value = serde_json::to_value(&tree).unwrap();
        assert_eq!(value, json!({ "x": expected }));
    }
}
