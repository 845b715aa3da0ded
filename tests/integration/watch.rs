//! Drift detection of generated files.

use std::fs;
use tmplgen_cli::templating::Transformer;
use tmplgen_cli::test_utils::TemplateTree;
use tmplgen_cli::watch::WatchRegistry;

#[test]
fn test_generated_file_is_registered_and_drift_detected() {
    let tree = TemplateTree::new().unwrap();
    let registry_path = tree.root().join("state/watched.json");
    let first = tree.root().join("first.conf");
    let second = tree.root().join("second.conf");

    for target in [&first, &second] {
        let mut engine = Transformer::new(tree.properties(), Some(target.clone()))
            .with_watcher(WatchRegistry::new(&registry_path));
        engine.push_line("k=v");
        engine.output().unwrap();
    }

    let registry = WatchRegistry::new(&registry_path);
    assert_eq!(registry.load().unwrap().files.len(), 2);
    assert!(registry.modified_files().unwrap().is_empty());

    fs::write(&second, "edited by hand\n").unwrap();
    assert_eq!(registry.modified_files().unwrap(), vec![second]);
}

#[test]
fn test_disabled_watch_leaves_registry_untouched() {
    let tree = TemplateTree::new().unwrap();
    let registry_path = tree.root().join("watched.json");

    let mut engine = Transformer::new(tree.properties(), Some(tree.root().join("a.conf")))
        .with_watcher(WatchRegistry::new(&registry_path));
    engine.set_watch_file(false);
    engine.push_line("k=v");
    engine.output().unwrap();

    assert!(!registry_path.exists());
}
