//! Tests for profile resolution from the INI config file

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use jentool::config::{self, ConfigEnv, ConfigError};

/// Helper to write a config file into a temp dir
fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("jentool.ini");
    std::fs::write(&path, content).expect("write config file");
    path
}

#[test]
fn given_profile_section_when_resolving_then_returns_credentials() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        r#"[default]
url = https://ci.example.com:8443/
user = jdoe
password = api-token

[prod]
url = https://prod.example.com/
user = deployer
password = other-token
"#,
    );

    // Act
    let default = config::resolve(&path, "default").unwrap();
    let prod = config::resolve(&path, "prod").unwrap();

    // Assert
    assert_eq!(default.url, "https://ci.example.com:8443/");
    assert_eq!(default.username, "jdoe");
    assert_eq!(default.password, "api-token");
    assert_eq!(prod.name, "prod");
    assert_eq!(prod.username, "deployer");
}

#[test]
fn given_unknown_profile_when_resolving_then_section_missing() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "[default]\nurl = http://ci\nuser = u\npassword = p\n");

    let err = config::resolve(&path, "staging").unwrap_err();

    assert!(matches!(err, ConfigError::SectionMissing { ref profile, .. } if profile == "staging"));
    assert_eq!(
        err.to_string(),
        format!("can not find section staging in {}", path.display())
    );
}

#[test]
fn given_profile_without_password_when_resolving_then_field_missing() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "[default]\nurl = http://ci\nuser = u\n");

    let err = config::resolve(&path, "default").unwrap_err();

    assert_eq!(err.to_string(), "password not in profile default");
}

#[test]
fn given_uppercase_option_names_when_resolving_then_still_found() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "[default]\nURL = http://ci\nUser = u\nPassword = p\n");

    let profile = config::resolve(&path, "default").unwrap();

    assert_eq!(profile.url, "http://ci");
    assert_eq!(profile.username, "u");
    assert_eq!(profile.password, "p");
}

#[test]
fn given_password_debug_when_formatting_profile_then_masked() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "[default]\nurl = http://ci\nuser = u\npassword = hunter2\n");

    let profile = config::resolve(&path, "default").unwrap();

    assert!(!format!("{profile:?}").contains("hunter2"));
}

#[test]
fn given_unterminated_section_when_resolving_then_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "[default\nurl = http://ci\n");

    let err = config::resolve(&path, "default").unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
}

#[test]
fn given_dotted_section_name_when_resolving_then_found_as_written() {
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        "[ci.example.com]\nurl = https://ci.example.com/\nuser = u\npassword = p\n",
    );

    let profile = config::resolve(&path, "ci.example.com").unwrap();

    assert_eq!(profile.name, "ci.example.com");
    assert_eq!(profile.url, "https://ci.example.com/");
}

#[test]
fn given_special_characters_in_password_when_resolving_then_value_kept_verbatim() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        r#"[default]
url = http://ci
user = u
password = p\ss"w;rd#x

[quoted]
url = http://ci
user = u
password = "quoted"
"#,
    );

    // Act
    let plain = config::resolve(&path, "default").unwrap();
    let quoted = config::resolve(&path, "quoted").unwrap();

    // Assert
    assert_eq!(plain.password, r#"p\ss"w;rd#x"#);
    assert_eq!(quoted.password, r#""quoted""#);
}

#[test]
fn given_default_section_when_resolving_then_profile_inherits_missing_options() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        r#"[DEFAULT]
url = https://shared.example.com/
user = fallback

[prod]
user = deployer
password = token
"#,
    );

    // Act
    let prod = config::resolve(&path, "prod").unwrap();

    // Assert
    assert_eq!(prod.url, "https://shared.example.com/");
    assert_eq!(prod.username, "deployer");
    assert_eq!(prod.password, "token");
}

#[test]
fn given_section_in_other_case_when_resolving_then_section_missing() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "[Prod]\nurl = http://ci\nuser = u\npassword = p\n");

    let err = config::resolve(&path, "prod").unwrap_err();

    assert!(matches!(err, ConfigError::SectionMissing { .. }));
}

#[test]
fn given_no_explicit_path_when_resolving_config_path_then_uses_home_config_dir() {
    let env = ConfigEnv {
        snap_real_home: None,
        home: Some(PathBuf::from("/home/jdoe")),
    };

    let path = config::config_path(None, &env);

    assert_eq!(path, Path::new("/home/jdoe/.config/jentool.ini"));
}
