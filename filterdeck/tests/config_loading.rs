use serial_test::serial;
use std::io::Write;

use filterdeck::config::CONFIG_ENV;
use filterdeck::filters::FieldType;
use filterdeck::permissions::{PermissionPolicy, actions};
use filterdeck::{AppConfig, FilterError};

const SMALL_CONFIG: &str = r#"
[compiler]
utc_offset_minutes = 330

[listing]
default_page_size = 20

[[resources]]
name = "webinars"

[[resources.fields]]
key = "title"
type = "text"
label = "Title"

[[resources.sorts]]
label = "Newest"
value = "-createdAt"

[roles.editor]
webinars = ["view", "edit"]
"#;

fn write_config(raw: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(raw.as_bytes()).expect("write config");
    file
}

#[test]
fn bundled_config_describes_all_resources() {
    let config = AppConfig::builtin().expect("bundled config parses");
    let names: Vec<&str> = config.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        ["carousels", "categories", "institutes", "webinars", "job-applications", "referral-courses"]
    );

    let carousels = config.resource("carousels").expect("carousels");
    assert_eq!(carousels.discriminator.get("type"), Some(&serde_json::json!(2)));
    assert_eq!(carousels.fields.get("status").map(|f| f.field_type), Some(FieldType::MultiSelect));

    assert!(config.roles.can("superadmin", "anything", actions::DELETE));
    assert!(config.roles.can("counsellor", "job-applications", actions::EXPORT));
    assert!(!config.roles.can("counsellor", "carousels", actions::VIEW));
    assert!(config.roles.can("viewer", "webinars", actions::VIEW));
    assert!(!config.roles.can("viewer", "webinars", actions::EDIT));
}

#[test]
fn loads_from_file() {
    let file = write_config(SMALL_CONFIG);
    let config = AppConfig::load(file.path()).expect("config loads");
    assert_eq!(config.resources.len(), 1);
    assert_eq!(config.table_state().limit(), 20);
    assert_eq!(config.compiler.offset().expect("offset").local_minus_utc(), 330 * 60);
    assert!(config.compiler("webinars").is_ok());
    assert!(matches!(config.compiler("carousels"), Err(FilterError::UnknownResource { .. })));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = AppConfig::load(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(FilterError::Io(_))));
}

#[test]
fn rejects_bad_sort_tokens() {
    let raw = r#"
        [[resources]]
        name = "webinars"

        [[resources.sorts]]
        label = "Broken"
        value = "created at"
    "#;
    assert!(matches!(AppConfig::from_toml_str(raw), Err(FilterError::Toml(_))));
}

#[test]
#[serial]
fn discover_prefers_explicit_path_then_env() {
    let file = write_config(SMALL_CONFIG);

    unsafe { std::env::set_var(CONFIG_ENV, file.path()) };
    let from_env = AppConfig::discover(None).expect("env config loads");
    assert_eq!(from_env.resources.len(), 1);

    let builtin = write_config("");
    let explicit = AppConfig::discover(Some(builtin.path())).expect("explicit config loads");
    assert!(explicit.resources.is_empty());

    unsafe { std::env::remove_var(CONFIG_ENV) };
    let fallback = AppConfig::discover(None).expect("bundled config loads");
    assert_eq!(fallback.resources.len(), 6);
}
