//! Tests for command dispatch: argument validation, profile resolution and
//! service wiring, in that order

use std::cell::Cell;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tempfile::TempDir;

use jentool::cli::{execute_with, Cli, CliError, CliResult};
use jentool::config::{ConfigEnv, ConfigError};
use jentool::domain::{DomainError, Profile};
use jentool::infrastructure::di::ServiceContainer;
use jentool::infrastructure::JenkinsApi;
use jentool::util::testing::{init_test_setup, FakeJenkins};

fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("jentool.ini");
    std::fs::write(
        &path,
        "[default]\nurl = http://jenkins.invalid\nuser = jdoe\npassword = secret\n",
    )
    .expect("write config file");
    path
}

fn parse(args: &[&str]) -> Cli {
    init_test_setup();
    Cli::try_parse_from(std::iter::once("jentool").chain(args.iter().copied())).unwrap()
}

fn no_home() -> ConfigEnv {
    ConfigEnv {
        snap_real_home: None,
        home: Some(PathBuf::from("/nonexistent/home")),
    }
}

fn connect_to(fake: &Arc<FakeJenkins>) -> impl FnOnce(Profile) -> CliResult<ServiceContainer> {
    let api: Arc<dyn JenkinsApi> = fake.clone();
    move |_profile| Ok(ServiceContainer::with_deps(api))
}

#[test]
fn given_no_subcommand_when_executing_then_prints_help_without_config() {
    let cli = parse(&[]);
    let connected = Cell::new(false);

    let result = execute_with(&cli, &no_home(), |_| {
        connected.set(true);
        unreachable!("help must not connect")
    });

    assert!(result.is_ok());
    assert!(!connected.get());
}

#[test]
fn given_invalid_regex_when_executing_then_reports_before_reading_config() {
    // config file does not exist; the pattern error must win
    let cli = parse(&["jobs-list", "build-("]);

    let err = execute_with(&cli, &no_home(), |_| unreachable!("must not connect")).unwrap_err();

    assert!(matches!(err, CliError::InvalidArgs(DomainError::InvalidPattern { .. })));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn given_invalid_copy_pattern_when_executing_then_invalid_args() {
    let cli = parse(&["jobs-copy", "build-.*", "main(", "release"]);

    let err = execute_with(&cli, &no_home(), |_| unreachable!("must not connect")).unwrap_err();

    assert!(matches!(err, CliError::InvalidArgs(_)));
}

#[test]
fn given_missing_config_file_when_executing_then_config_error_without_connect() {
    let cli = parse(&["jobs-list", ".*"]);

    let err = execute_with(&cli, &no_home(), |_| unreachable!("must not connect")).unwrap_err();

    assert!(matches!(err, CliError::Config(ConfigError::FileMissing(_))));
    assert_eq!(
        err.to_string(),
        "jentool configuration file /nonexistent/home/.config/jentool.ini does not exist"
    );
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn given_unknown_profile_when_executing_then_section_missing() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp);
    let cli = parse(&["-c", path.to_str().unwrap(), "-p", "prod", "nodes-list"]);

    let err = execute_with(&cli, &no_home(), |_| unreachable!("must not connect")).unwrap_err();

    assert!(matches!(
        err,
        CliError::Config(ConfigError::SectionMissing { ref profile, .. }) if profile == "prod"
    ));
}

#[test]
fn given_valid_profile_when_disabling_then_connects_with_profile_and_disables() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp);
    let fake = Arc::new(
        FakeJenkins::new()
            .with_job("build-main")
            .with_job("deploy"),
    );
    let cli = parse(&["--config-file", path.to_str().unwrap(), "jobs-disable", "build-"]);
    let seen_user = Cell::new(None);
    let connect = connect_to(&fake);

    // Act
    execute_with(&cli, &no_home(), |profile| {
        seen_user.set(Some(profile.username.clone()));
        connect(profile)
    })
    .unwrap();

    // Assert
    assert_eq!(seen_user.take().as_deref(), Some("jdoe"));
    assert_eq!(fake.mutations(), vec!["disable_job(build-main)"]);
}

#[test]
fn given_folder_depth_flag_when_listing_then_passed_to_remote() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp);
    let fake = Arc::new(FakeJenkins::new().with_folder("team").with_job("team/build"));
    let cli = parse(&["-c", path.to_str().unwrap(), "--folder-depth", "2", "jobs-list", "team"]);

    execute_with(&cli, &no_home(), connect_to(&fake)).unwrap();

    assert_eq!(fake.calls(), vec!["get_jobs(2)"]);
}

#[test]
fn given_remote_failure_when_executing_then_application_error() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp);
    let fake = Arc::new(FakeJenkins::new().with_job("old").failing_on("old"));
    let cli = parse(&["-c", path.to_str().unwrap(), "jobs-delete", "old"]);

    let err = execute_with(&cli, &no_home(), connect_to(&fake)).unwrap_err();

    assert!(matches!(err, CliError::Application(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn given_completion_when_executing_then_needs_no_config() {
    let cli = parse(&["completion", "bash"]);

    let result = execute_with(&cli, &no_home(), |_| unreachable!("must not connect"));

    assert!(result.is_ok());
}

#[test]
fn given_failing_pattern_when_executing_then_matches_anywhere_in_name() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp);
    let fake = Arc::new(
        FakeJenkins::new()
            .with_job_state("nightly-api", "red", false)
            .with_job_state("nightly-web", "red", false),
    );
    let cli = parse(&["-c", path.to_str().unwrap(), "jobs-failing", "api"]);

    // Act
    execute_with(&cli, &no_home(), connect_to(&fake)).unwrap();

    // Assert
    let infos: Vec<String> = fake
        .calls()
        .into_iter()
        .filter(|call| call.starts_with("get_job_info"))
        .collect();
    assert_eq!(infos, vec!["get_job_info(nightly-api)"]);
}

#[test]
fn given_unstable_pattern_when_executing_then_matches_anywhere_in_name() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp);
    let fake = Arc::new(FakeJenkins::new().with_job("release-api").with_job("web"));
    let cli = parse(&["-c", path.to_str().unwrap(), "jobs-unstable", "api"]);

    execute_with(&cli, &no_home(), connect_to(&fake)).unwrap();

    assert!(fake.calls().contains(&"get_job_info(release-api)".to_string()));
    assert!(!fake.calls().contains(&"get_job_info(web)".to_string()));
}
