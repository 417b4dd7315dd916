//! Profile resolution from the INI config file
//!
//! Layout of the file (one section per Jenkins instance):
//!
//! ```ini
//! [default]
//! url = https://jenkins.example.com
//! user = jdoe
//! password = api-token
//! ```
//!
//! Default location: `$SNAP_REAL_HOME/.config/jentool.ini` when running inside
//! a snap, `~/.config/jentool.ini` otherwise.

use std::path::{Path, PathBuf};

use ini::{Ini, ParseOption, Properties};
use thiserror::Error;
use tracing::debug;

use crate::domain::Profile;

/// Default profile (section) name.
pub const DEFAULT_PROFILE: &str = "default";

/// Section whose options every profile inherits.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Config file name below `<home>/.config`.
pub const CONFIG_FILE_NAME: &str = "jentool.ini";

/// Snaps set `$HOME` to a per-revision directory; the real one is kept here.
pub const SNAP_REAL_HOME_VAR: &str = "SNAP_REAL_HOME";

/// Profile resolution failures. All of them are fatal and reported before any
/// remote call.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("jentool configuration file {} does not exist", .0.display())]
    FileMissing(PathBuf),

    #[error("can not find section {profile} in {}", .path.display())]
    SectionMissing { profile: String, path: PathBuf },

    #[error("{field} not in profile {profile}")]
    FieldMissing { field: String, profile: String },

    #[error("cannot parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

/// Result type for profile resolution.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Environment inputs to default config path derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigEnv {
    pub snap_real_home: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl ConfigEnv {
    /// Snapshot of the current process environment.
    pub fn from_process() -> Self {
        Self {
            snap_real_home: std::env::var_os(SNAP_REAL_HOME_VAR).map(PathBuf::from),
            home: directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()),
        }
    }
}

/// Derive the default config file path from `env`.
pub fn default_config_path(env: &ConfigEnv) -> PathBuf {
    let home = env
        .snap_real_home
        .as_ref()
        .filter(|dir| !dir.as_os_str().is_empty())
        .or(env.home.as_ref())
        .cloned()
        .unwrap_or_else(|| expand_path("~"));
    home.join(".config").join(CONFIG_FILE_NAME)
}

/// Config path to use: the user's choice (with `~` and `$VAR` expanded) or the default.
pub fn config_path(explicit: Option<&Path>, env: &ConfigEnv) -> PathBuf {
    match explicit {
        Some(path) => expand_path(&path.to_string_lossy()),
        None => default_config_path(env),
    }
}

fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
    }
}

/// Resolve profile `profile` from the INI file at `path`.
///
/// Section names are case-sensitive, option names are not. Options missing from
/// the profile are looked up in `[DEFAULT]`.
pub fn resolve(path: &Path, profile: &str) -> ConfigResult<Profile> {
    debug!("resolve: path={}, profile={}", path.display(), profile);
    if !path.exists() {
        return Err(ConfigError::FileMissing(path.to_path_buf()));
    }

    let ini = load(path)?;
    let defaults = ini.section(Some(DEFAULT_SECTION));
    let section = if profile == DEFAULT_SECTION {
        defaults
    } else {
        Some(ini.section(Some(profile)).ok_or_else(|| ConfigError::SectionMissing {
            profile: profile.to_string(),
            path: path.to_path_buf(),
        })?)
    };

    let field = |name: &str| required_field(section, defaults, name, profile);
    let url = field("url")?;
    let username = field("user")?;
    let password = field("password")?;

    debug!("resolve: profile {} -> {}", profile, url);
    Ok(Profile {
        name: profile.to_string(),
        url,
        username,
        password,
    })
}

/// Values are taken verbatim: no quote stripping, no escape sequences.
fn load(path: &Path) -> ConfigResult<Ini> {
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    Ini::load_from_file_opt(path, options).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn required_field(
    section: Option<&Properties>,
    defaults: Option<&Properties>,
    field: &str,
    profile: &str,
) -> ConfigResult<String> {
    section
        .and_then(|props| lookup(props, field))
        .or_else(|| defaults.and_then(|props| lookup(props, field)))
        .map(str::to_string)
        .ok_or_else(|| ConfigError::FieldMissing {
            field: field.to_string(),
            profile: profile.to_string(),
        })
}

fn lookup<'a>(props: &'a Properties, field: &str) -> Option<&'a str> {
    props
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(field))
        .map(|(_, value)| value)
}
