//! Integration tests for rampart-config

use rampart_config::*;
use rampart_validation::{BindOptions, ValidatorSettings};
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_builder_merges_files_in_order() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("base.toml");
    let overlay = dir.path().join("overlay.json");

    fs::write(
        &base,
        r#"
[settings]
flag_attribute = "ready"

[attributes.name]
required = true

[attributes.age]
min = 18
"#,
    )
    .unwrap();
    fs::write(
        &overlay,
        r#"{"settings": {"flag_attribute": "ok"}, "attributes": {"age": {"min": 21}, "zip": {"pattern": "number"}}}"#,
    )
    .unwrap();

    let config = ValidationConfig::builder()
        .add_file(&base)
        .add_file(&overlay)
        .build()
        .unwrap();

    assert_eq!(config.settings.flag_attribute, "ok");
    assert_eq!(
        config.attributes.attributes().collect::<Vec<_>>(),
        vec!["name", "age", "zip"]
    );

    let validator = config.validator();
    let mut model = config.model();
    validator.bind(&mut model, BindOptions::new()).unwrap();
    assert!(model.set_value("age", 19).is_err());
}

#[test]
fn test_missing_file_is_load_error() {
    let dir = TempDir::new().unwrap();
    let result = ValidationConfig::builder()
        .add_file(dir.path().join("absent.json"))
        .build();

    assert!(matches!(result, Err(ConfigError::LoadError(_))));
}

#[test]
fn test_unsupported_extension() {
    let result = ValidationConfig::builder().add_file("rules.ini").build();
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
}

#[test]
fn test_env_overrides_settings() {
    let loader = EnvLoader::new(Some("RAMPART_IT_OVERRIDE".to_string()));

    unsafe {
        env::set_var("RAMPART_IT_OVERRIDE_FLAG_ATTRIBUTE", "valid");
        env::set_var("RAMPART_IT_OVERRIDE_STRICT_RULES", "false");
    }

    let settings = loader.apply_settings(ValidatorSettings::default()).unwrap();
    assert_eq!(settings.flag_attribute, "valid");
    assert!(!settings.strict_rules);
    assert!(settings.log_events);

    unsafe {
        env::remove_var("RAMPART_IT_OVERRIDE_FLAG_ATTRIBUTE");
        env::remove_var("RAMPART_IT_OVERRIDE_STRICT_RULES");
    }
}

#[test]
fn test_env_rejects_bad_bool() {
    let loader = EnvLoader::new(Some("RAMPART_IT_BAD".to_string()));

    unsafe {
        env::set_var("RAMPART_IT_BAD_LOG_EVENTS", "sometimes");
    }

    let result = loader.apply_settings(ValidatorSettings::default());
    assert!(matches!(
        result,
        Err(ConfigError::InvalidValue { ref key, .. }) if key == "RAMPART_IT_BAD_LOG_EVENTS"
    ));

    unsafe {
        env::remove_var("RAMPART_IT_BAD_LOG_EVENTS");
    }
}

#[test]
fn test_builder_reads_dotenv_file() {
    let dir = TempDir::new().unwrap();
    let dotenv = dir.path().join("validation.env");
    fs::write(&dotenv, "RAMPART_IT_DOTENV_STRICT_RULES=no\n").unwrap();

    let config = ValidationConfig::builder()
        .with_prefix("RAMPART_IT_DOTENV")
        .load_dotenv(Some(dotenv))
        .build()
        .unwrap();

    assert!(!config.settings.strict_rules);

    unsafe {
        env::remove_var("RAMPART_IT_DOTENV_STRICT_RULES");
    }
}

#[test]
fn test_env_prefix_needs_separator() {
    let loader = EnvLoader::new(Some("RAMPART_IT_SEP".to_string()));

    unsafe {
        env::set_var("RAMPART_IT_SEPX_STRICT_RULES", "false");
    }

    let settings = loader.apply_settings(ValidatorSettings::default()).unwrap();
    assert!(settings.strict_rules);

    unsafe {
        env::remove_var("RAMPART_IT_SEPX_STRICT_RULES");
    }
}

#[test]
fn test_attribute_only_overlay_keeps_settings() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("base.toml");
    let overlay = dir.path().join("overlay.toml");

    fs::write(
        &base,
        "[settings]\nflag_attribute = \"ready\"\nstrict_rules = false\n\n[attributes.name]\nrequired = true\n",
    )
    .unwrap();
    fs::write(&overlay, "[attributes.zip]\npattern = \"number\"\n").unwrap();

    let config = ValidationConfig::builder()
        .add_file(&base)
        .add_file(&overlay)
        .build()
        .unwrap();

    assert_eq!(config.settings.flag_attribute, "ready");
    assert!(!config.settings.strict_rules);
    assert_eq!(
        config.attributes.attributes().collect::<Vec<_>>(),
        vec!["name", "zip"]
    );
}
