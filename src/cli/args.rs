//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::config::DEFAULT_PROFILE;

/// Jenkins tool: list, filter and mutate jobs and nodes of a Jenkins server
#[derive(Parser, Debug)]
#[command(name = "jentool")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file [default: ~/.config/jentool.ini, or $SNAP_REAL_HOME/.config/jentool.ini in a snap]
    #[arg(short = 'c', long, global = true, value_hint = ValueHint::FilePath)]
    pub config_file: Option<PathBuf>,

    /// The profile (section) to use in the config-file
    #[arg(short = 'p', long, global = true, default_value = DEFAULT_PROFILE)]
    pub config_profile: String,

    /// Folder levels to descend when listing jobs (0 = top level only)
    #[arg(long, global = true, default_value_t = 0)]
    pub folder_depth: usize,

    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short = 'd', long = "debug", global = true, action = ArgAction::Count)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the given job(s)
    JobsList {
        /// The Jenkins job name(s) (regex)
        #[arg(value_name = "JOB-NAME")]
        job_name: String,
    },

    /// Disable the given job(s)
    JobsDisable {
        /// The Jenkins job name(s) (regex)
        #[arg(value_name = "JOB-NAME")]
        job_name: String,
    },

    /// Delete the given job(s)
    JobsDelete {
        /// The Jenkins job name(s) (regex)
        #[arg(value_name = "JOB-NAME")]
        job_name: String,
        /// Only delete disabled jobs
        #[arg(long)]
        disabled_only: bool,
    },

    /// Get config(s) for the given job(s)
    JobsConfig {
        /// The Jenkins job name(s) (regex)
        #[arg(value_name = "JOB-NAME")]
        job_name: String,
    },

    /// Copy the given job(s)
    JobsCopy {
        /// The Jenkins job name(s) (regex)
        #[arg(value_name = "JOB-NAME")]
        job_name: String,
        /// The Jenkins job name search pattern (regex)
        #[arg(value_name = "JOB-NAME-PATTERN")]
        job_name_pattern: String,
        /// The Jenkins job name replacement ($1 / ${name} refer to groups)
        #[arg(value_name = "JOB-NAME-REPL")]
        job_name_repl: String,
    },

    /// List all nodes
    NodesList {
        /// Only nodes whose name matches (regex)
        #[arg(value_name = "NODE-NAME", default_value = ".*")]
        node_name: String,
    },

    /// List failing jobs
    JobsFailing {
        /// The Jenkins job name(s) (regex)
        pattern: String,
        /// The maximum health score to look for
        #[arg(short, long, default_value_t = 0)]
        max_score: i64,
    },

    /// List unstable jobs
    JobsUnstable {
        /// The Jenkins job name(s) (regex)
        pattern: String,
    },

    /// List running builds
    BuildsRunning {
        /// Only builds running longer than X seconds
        #[arg(long, default_value_t = 0)]
        longer_than: u64,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Commands {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::JobsList { .. } => "jobs-list",
            Commands::JobsDisable { .. } => "jobs-disable",
            Commands::JobsDelete { .. } => "jobs-delete",
            Commands::JobsConfig { .. } => "jobs-config",
            Commands::JobsCopy { .. } => "jobs-copy",
            Commands::NodesList { .. } => "nodes-list",
            Commands::JobsFailing { .. } => "jobs-failing",
            Commands::JobsUnstable { .. } => "jobs-unstable",
            Commands::BuildsRunning { .. } => "builds-running",
            Commands::Completion { .. } => "completion",
        }
    }
}
