//! Placeholder resolution, includes and value documents.

use tmplgen_cli::core::TemplateError;
use tmplgen_cli::output::Emitted;
use tmplgen_cli::templating::Transformer;
use tmplgen_cli::test_utils::TemplateTree;
use tmplgen_cli::values::{ResolvedValue, ValueTree};

fn text_of(emitted: Emitted) -> String {
    match emitted {
        Emitted::Text(text) => text,
        Emitted::Written(path) => panic!("unexpected write to {}", path.display()),
    }
}

#[test]
fn test_default_value_fallback() {
    let tree = TemplateTree::new().unwrap();

    let mut empty = Transformer::new(tree.properties(), None);
    empty.push_line("@{name|unknown}");
    assert_eq!(text_of(empty.output().unwrap()), "unknown");

    let mut named = Transformer::new(tree.properties(), None).with_values(|path: &[&str]| {
        if path == ["name"] { ResolvedValue::from("Alice") } else { ResolvedValue::Empty }
    });
    named.push_line("@{name|unknown}");
    assert_eq!(text_of(named.output().unwrap()), "Alice");
}

#[test]
fn test_conditional_comment_marker() {
    let tree = TemplateTree::new().unwrap();
    let engine = Transformer::new(tree.properties(), None).with_values(|path: &[&str]| {
        if path == ["flag"] { ResolvedValue::from("x") } else { ResolvedValue::Empty }
    });

    assert_eq!(engine.resolve_line("@{#(flag)}").unwrap(), "");
    assert_eq!(engine.resolve_line("@{#(other)}").unwrap(), "#");
    assert_eq!(engine.resolve_line("@{#(other)}feature.enabled=true").unwrap(), "#feature.enabled=true");
}

#[test]
fn test_include_resolves_nested_template_with_overrides() {
    let tree = TemplateTree::new().unwrap();
    tree.add_template("main.tpl", "[server]\n@{include(server.template)}\n[end]").unwrap();
    tree.add_template("fragments/server.tpl", "host=@{server.host|0.0.0.0}\nport=8080").unwrap();
    let values = tree
        .add_file(
            "values.json",
            r#"{"server": {"template": "fragments/server.tpl", "host": "10.0.0.5"}}"#,
        )
        .unwrap();

    let mut engine = Transformer::new(tree.properties(), None)
        .with_values(ValueTree::from_file(&values).unwrap());
    engine.set_fixed_properties(&["port+=0"]).unwrap();
    engine.load_template("main.tpl").unwrap();

    assert_eq!(
        text_of(engine.output().unwrap()),
        "[server]\nhost=10.0.0.5\nport=80800\n[end]"
    );
}

#[test]
fn test_include_all_orders_by_file_name() {
    let tree = TemplateTree::new().unwrap();
    tree.add_template("main.tpl", "@{includeAll(parts)}").unwrap();
    tree.add_template("conf.d/20-cache.conf", "cache=on").unwrap();
    tree.add_template("conf.d/10-db.conf", "db=@{db|local}").unwrap();
    tree.add_template("extra/05-early.conf", "early=1").unwrap();
    let values = tree
        .add_file("values.yaml", "parts:\n  - conf.d/*.conf\n  - extra/*.conf\n")
        .unwrap();

    let mut engine = Transformer::new(tree.properties(), None)
        .with_values(ValueTree::from_file(&values).unwrap());
    engine.load_template("main.tpl").unwrap();

    assert_eq!(text_of(engine.output().unwrap()), "early=1\n\ndb=local\n\ncache=on");
}

#[test]
fn test_include_all_with_no_matches_is_empty() {
    let tree = TemplateTree::new().unwrap();
    let engine = Transformer::new(tree.properties(), None).with_values(|path: &[&str]| {
        if path == ["parts"] { ResolvedValue::from("nothing/*.conf") } else { ResolvedValue::Empty }
    });

    assert_eq!(engine.resolve_line("before@{includeAll(parts)}after").unwrap(), "beforeafter");
}

#[test]
fn test_missing_include_is_an_error() {
    let tree = TemplateTree::new().unwrap();
    let engine = Transformer::new(tree.properties(), None).with_values(|_: &[&str]| {
        ResolvedValue::from("absent.tpl")
    });

    let err = engine.resolve_line("@{include(x)}").unwrap_err();
    match err.downcast_ref::<TemplateError>() {
        Some(TemplateError::TemplateNotFound { pattern, searched }) => {
            assert_eq!(pattern, "absent.tpl");
            assert_eq!(searched, &vec![tree.templates_dir()]);
        }
        other => panic!("expected TemplateNotFound, got {other:?}"),
    }
}

#[test]
fn test_self_including_template_is_a_cycle() {
    let tree = TemplateTree::new().unwrap();
    tree.add_template("loop.tpl", "start\n@{include(me)}").unwrap();

    let mut engine = Transformer::new(tree.properties(), None)
        .with_values(|_: &[&str]| ResolvedValue::from("loop.tpl"));
    engine.load_template("loop.tpl").unwrap();

    let err = engine.output().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TemplateError>(),
        Some(TemplateError::TemplateCycle { .. })
    ));
    // The document is left untouched on failure
    assert_eq!(engine.lines(), ["start".to_string(), "@{include(me)}".to_string()]);
}

#[test]
fn test_toml_values_with_lists() {
    let tree = TemplateTree::new().unwrap();
    let values = tree.add_file("values.toml", "[cluster]\nnodes = [\"a\", \"b\", \"c\"]\nsize = 3\n").unwrap();

    let engine =
        Transformer::new(tree.properties(), None).with_values(ValueTree::from_file(&values).unwrap());
    assert_eq!(engine.resolve_line("nodes=@{cluster.nodes}").unwrap(), "nodes=a,b,c");
    assert_eq!(engine.resolve_line("size=@{cluster.size}").unwrap(), "size=3");
}

#[test]
fn test_template_with_latin1_bytes_still_generates() {
    let tree = TemplateTree::new().unwrap();
    tree.add_template("legacy.tpl", b"# r\xe9glages\nport=@{port|80}".as_slice()).unwrap();

    let mut engine = Transformer::new(tree.properties(), None);
    engine.load_template("legacy.tpl").unwrap();

    assert_eq!(text_of(engine.output().unwrap()), "# r\u{fffd}glages\nport=80");
}
