//! Override specifications applied through the engine.

use std::path::PathBuf;
use tmplgen_cli::core::TemplateError;
use tmplgen_cli::output::Emitted;
use tmplgen_cli::templating::Transformer;
use tmplgen_cli::test_utils::{TemplateTree, init_test_logging};
use tmplgen_cli::values::ResolvedValue;

fn values(path: &[&str]) -> ResolvedValue {
    match path {
        ["user"] => "alice".into(),
        _ => ResolvedValue::Empty,
    }
}

fn render(engine: &mut Transformer) -> String {
    match engine.output().unwrap() {
        Emitted::Text(text) => text,
        Emitted::Written(path) => panic!("unexpected write to {}", path.display()),
    }
}

#[test]
fn test_replace_skips_placeholder_evaluation() {
    init_test_logging(None);
    let tree = TemplateTree::new().unwrap();
    tree.add_template("app.tpl", "user=@{include(missing)}\nport = @{port|80}").unwrap();

    let mut engine = Transformer::new(tree.properties(), None).with_values(values);
    engine.set_fixed_properties(&["user=root", "port=9090"]).unwrap();
    engine.load_template("app.tpl").unwrap();

    // The include would fail if it were evaluated
    assert_eq!(render(&mut engine), "user=root\nport=9090");
}

#[test]
fn test_default_sentinel_restores_template_behavior() {
    let mut engine = Transformer::new(TemplateTree::new().unwrap().properties(), None)
        .with_values(values);
    engine.set_fixed_properties(&["user=root", "user={default}"]).unwrap();
    engine.push_line("user=@{user}");

    assert_eq!(engine.overrides().replacement("user"), None);
    assert_eq!(render(&mut engine), "user=alice");
}

#[test]
fn test_append_and_substitute_on_same_key() {
    let mut engine = Transformer::new(TemplateTree::new().unwrap().properties(), None)
        .with_values(values);
    engine
        .set_fixed_properties(&["count+=5", "url+=/v2", "url~=/localhost/example.com/"])
        .unwrap();
    engine.push_line("count=10");
    engine.push_line("url=http://localhost:8080");
    engine.push_line("other=localhost");

    assert_eq!(render(&mut engine), "count=105\nurl=http://example.com:8080/v2\nother=localhost");
}

#[test]
fn test_substitute_capture_groups() {
    let mut engine = Transformer::new(TemplateTree::new().unwrap().properties(), None);
    engine.set_fixed_properties(&[r"endpoint~=/(\w+):(\d+)/$2@$1/"]).unwrap();
    engine.push_line("endpoint=db:5432");

    assert_eq!(render(&mut engine), "endpoint=5432@db");
}

#[test]
fn test_scoped_override_requires_matching_output_path() {
    let tree = TemplateTree::new().unwrap();
    let specs = ["db:port=5432", "web:port=80"];

    let mut db = Transformer::new(tree.properties(), Some(PathBuf::from("/etc/db/app.conf")));
    db.set_fixed_properties(&specs).unwrap();
    assert_eq!(db.resolve_line("port=1").unwrap(), "port=5432");

    let mut cache = Transformer::new(tree.properties(), Some(PathBuf::from("/etc/cache/app.conf")));
    cache.set_fixed_properties(&specs).unwrap();
    assert_eq!(cache.resolve_line("port=1").unwrap(), "port=1");
}

#[test]
fn test_malformed_specifications_are_rejected() {
    let mut engine = Transformer::new(TemplateTree::new().unwrap().properties(), None);

    for spec in ["no-equals-sign", "a:b:c=1", "k~=/only-one-part/"] {
        let err = engine.set_fixed_properties(&[spec]).unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<TemplateError>(),
                Some(TemplateError::MalformedOverrideSpecification { .. })
            ),
            "{spec} gave {err:?}"
        );
    }
}

#[test]
fn test_invalid_substitute_regex() {
    let mut engine = Transformer::new(TemplateTree::new().unwrap().properties(), None);
    let err = engine.set_fixed_properties(&["k~=/(unclosed/x/"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TemplateError>(),
        Some(TemplateError::InvalidOverridePattern { .. })
    ));
}
