use assert_matches::assert_matches;
use fusion_core::{DslError, DslRegistry, FusionParser, MergedTree, Node};
use fusion_error::{
    error::{CompileError, ErrorKind},
    handler::Handler,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::{Arc, Mutex};

fn parse_with(parser: &FusionParser, src: &str) -> Result<MergedTree, CompileError> {
    let handler = Handler::default();
    match parser.parse_from_source(&handler, src, None) {
        Ok(tree) => Ok(tree),
        Err(_) => Err(handler.consume().0.remove(0)),
    }
}

#[test]
fn transpiler_receives_identifier_and_code() {
    let calls = Arc::new(Mutex::new(vec![]));
    let recorded = calls.clone();
    let parser = FusionParser::new().with_dsl_transpiler(
        move |identifier: &str, code: &str| -> Result<String, DslError> {
            recorded
                .lock()
                .unwrap()
                .push((identifier.to_string(), code.to_string()));
            Ok("2".to_string())
        },
    );

    let tree = parse_with(&parser, "value = myDsl`1 + 1`").unwrap();
    assert_eq!(tree.get("value"), Some(&Node::Int(2)));
    assert_eq!(
        *calls.lock().unwrap(),
        [("myDsl".to_string(), "1 + 1".to_string())]
    );
}

fn afx() -> DslRegistry {
    DslRegistry::new()
        .with("afx", |code: &str| {
            let tag = code.trim().trim_start_matches('<').trim_end_matches("/>");
            Ok(format!(
                "Neos.Fusion:Tag {{\n    tagName = '{tag}'\n    attributes.class = ${{props.class}}\n}}"
            ))
        })
        .with("broken", |_: &str| Ok("Neos.Fusion:Tag {".to_string()))
        .with("reserved", |_: &str| Ok("Neos.Fusion:Tag {\n    __meta = 1\n}".to_string()))
        .with("failing", |_: &str| Err("unexpected end of tag".into()))
}

#[test]
fn output_is_merged_like_fusion() {
    let parser = FusionParser::new().with_dsl_transpiler(afx());
    let tree = parse_with(&parser, "prototype(V:Button) {\n    renderer = afx`<button/>`\n}").unwrap();
    assert_eq!(
        serde_json::to_value(&tree).unwrap(),
        json!({"__prototypes": {"V:Button": {"renderer": {
            "__objectType": "Neos.Fusion:Tag",
            "__value": null,
            "__eelExpression": null,
            "tagName": "button",
            "attributes": {"class": {
                "__eelExpression": "props.class",
                "__value": null,
                "__objectType": null,
            }},
        }}}})
    );
}

#[test]
fn transpiler_failures() {
    let parser = FusionParser::new().with_dsl_transpiler(afx());

    let err = parse_with(&parser, "a = failing`x`").unwrap_err();
    assert_matches!(
        &err,
        CompileError::DslTranspilation { identifier, message, .. }
            if identifier == "failing" && message == "unexpected end of tag"
    );
    assert_eq!(err.kind(), ErrorKind::Syntax);

    let err = parse_with(&parser, "a = unknown`x`").unwrap_err();
    assert_matches!(&err, CompileError::DslTranspilation { identifier, .. } if identifier == "unknown");

    let err = parse_with(&FusionParser::new(), "a = afx`<div/>`").unwrap_err();
    assert_matches!(err, CompileError::DslTranspilation { .. });
}

#[test]
fn invalid_output_is_reported_at_the_expression() {
    let parser = FusionParser::new().with_dsl_transpiler(afx());

    let err = parse_with(&parser, "a = 1\nb = broken`x`").unwrap_err();
    assert_matches!(&err, CompileError::InvalidDslOutput { identifier, error, .. }
        if identifier == "broken" && error.kind() == ErrorKind::Syntax);
    assert_eq!(err.kind(), ErrorKind::Syntax);
    let (start, _) = err.line_col();
    assert_eq!((start.line, start.col), (2, 5));

    let err = parse_with(&parser, "b = reserved`x`").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert_eq!(err.code(), Some(1180600696));
}

#[test]
fn output_tree_is_not_checked_for_prototype_cycles() {
    let parser = FusionParser::new().with_dsl_transpiler(DslRegistry::new().with("loop", |_: &str| {
        Ok("1\nprototype(V:A) < prototype(V:B)\nprototype(V:B) < prototype(V:A)".to_string())
    }));

    let tree = parse_with(&parser, "a = loop`x`").unwrap();
    assert_eq!(tree.get("a"), Some(&Node::Int(1)));
    assert_eq!(tree.get("__prototypes"), None);
}
