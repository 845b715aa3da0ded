//! Template lookup across layered search directories.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tmplgen_cli::config::{HOME_DIRECTORY, PREPARE_DIRECTORY, TEMPLATE_SEARCH_PATH};
use tmplgen_cli::core::TemplateError;
use tmplgen_cli::pattern::TemplateLocator;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_first_directory_wins_and_result_is_sorted() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a");
    let b = temp.path().join("b");
    write(&a.join("x.tmpl"), "from a");
    write(&b.join("x.tmpl"), "from b");
    write(&b.join("m.tmpl"), "only in b");
    write(&a.join("z.tmpl"), "last");

    let locator = TemplateLocator::new(vec![a.clone(), b.clone()]);
    let found = locator.locate_many(&["*.tmpl"]).unwrap();

    assert_eq!(found, vec![b.join("m.tmpl"), a.join("x.tmpl"), a.join("z.tmpl")]);
}

#[test]
fn test_earlier_pattern_wins_within_directory() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("t");
    write(&dir.join("base/app.conf"), "base");
    write(&dir.join("site/app.conf"), "site");

    let locator = TemplateLocator::new(vec![dir.clone()]);
    let found = locator.locate_many(&["site/*.conf", "base/*.conf"]).unwrap();
    assert_eq!(found, vec![dir.join("site/app.conf")]);
}

#[test]
fn test_locate_one_not_found() {
    let empty = TemplateLocator::new(Vec::new());
    let err = empty.locate_one("app.tpl").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TemplateError>(),
        Some(TemplateError::TemplateNotFound { .. })
    ));

    let temp = TempDir::new().unwrap();
    let locator = TemplateLocator::new(vec![temp.path().to_path_buf()]);
    let err = locator.locate_one("app.tpl").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TemplateError>(),
        Some(TemplateError::TemplateNotFound { .. })
    ));
}

#[test]
fn test_search_directories_from_properties() {
    let temp = TempDir::new().unwrap();
    let extra = temp.path().join("extra");
    fs::create_dir_all(&extra).unwrap();
    let home = temp.path().join("home");
    let prepare = temp.path().join("prepare");

    let mut properties = HashMap::new();
    properties.insert(
        TEMPLATE_SEARCH_PATH.to_string(),
        format!("{},{}", temp.path().join("missing").display(), extra.display()),
    );
    properties.insert(HOME_DIRECTORY.to_string(), home.display().to_string());
    properties.insert(PREPARE_DIRECTORY.to_string(), prepare.display().to_string());

    let locator = TemplateLocator::from_properties(&properties);
    assert_eq!(
        locator.search_directories(),
        [extra, home.join("share").join("templates"), prepare]
    );
}

#[test]
fn test_precedence_across_layers() {
    let temp = TempDir::new().unwrap();
    let extra = temp.path().join("extra");
    let home = temp.path().join("home");
    write(&extra.join("app.tpl"), "extra");
    write(&home.join("share/templates/app.tpl"), "home");
    write(&home.join("share/templates/other.tpl"), "home only");

    let mut properties = HashMap::new();
    properties.insert(TEMPLATE_SEARCH_PATH.to_string(), extra.display().to_string());
    properties.insert(HOME_DIRECTORY.to_string(), home.display().to_string());

    let locator = TemplateLocator::from_properties(&properties);
    assert_eq!(locator.locate_one("app.tpl").unwrap(), extra.join("app.tpl"));
    assert_eq!(
        locator.locate_one("other.tpl").unwrap(),
        home.join("share").join("templates").join("other.tpl")
    );
}

#[test]
fn test_hidden_files_need_literal_dot() {
    let temp = TempDir::new().unwrap();
    write(&temp.path().join(".hidden.tmpl"), "x");
    write(&temp.path().join("shown.tmpl"), "y");

    let locator = TemplateLocator::new(vec![temp.path().to_path_buf()]);
    assert_eq!(locator.locate_many(&["*.tmpl"]).unwrap(), vec![temp.path().join("shown.tmpl")]);
    assert_eq!(
        locator.locate_many(&[".*.tmpl"]).unwrap(),
        vec![temp.path().join(".hidden.tmpl")]
    );
}

#[test]
fn test_invalid_glob_pattern() {
    let temp = TempDir::new().unwrap();
    let locator = TemplateLocator::new(vec![temp.path().to_path_buf()]);
    let err = locator.locate_many(&["[unclosed"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TemplateError>(),
        Some(TemplateError::InvalidSearchPattern { .. })
    ));
}
