//! Command dispatch
//!
//! Order of work for every invocation:
//! 1. no subcommand: print help, nothing else
//! 2. validate the subcommand's arguments (regexes), no I/O
//! 3. resolve the profile from the config file
//! 4. connect and run the handler

use std::io;

use chrono::Local;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::{JobSelector, JobService};
use crate::cli::args::{Cli, Commands};
use crate::cli::output;
use crate::cli::CliResult;
use crate::config::{self, ConfigEnv};
use crate::domain::{NamePattern, Profile, Substitution};
use crate::infrastructure::di::ServiceContainer;

/// A subcommand whose arguments have been validated.
#[derive(Debug)]
enum Request {
    Completion(Shell),
    Remote(RemoteRequest),
}

/// A validated subcommand that talks to the server.
#[derive(Debug)]
enum RemoteRequest {
    JobsList(JobSelector),
    JobsDisable(JobSelector),
    JobsDelete {
        selector: JobSelector,
        disabled_only: bool,
    },
    JobsConfig(JobSelector),
    JobsCopy {
        selector: JobSelector,
        rename: Substitution,
    },
    NodesList(NamePattern),
    JobsFailing {
        selector: JobSelector,
        max_score: i64,
    },
    JobsUnstable(JobSelector),
    BuildsRunning {
        longer_than: u64,
    },
}

impl Request {
    fn from_command(command: &Commands, folder_depth: usize) -> CliResult<Self> {
        let selector = |pattern: &str| -> CliResult<JobSelector> {
            Ok(JobSelector::new(NamePattern::new(pattern)?).with_folder_depth(folder_depth))
        };
        // health and build status listings match anywhere in the name
        let search = |pattern: &str| -> CliResult<JobSelector> {
            Ok(JobSelector::new(NamePattern::search(pattern)?).with_folder_depth(folder_depth))
        };

        let remote = match command {
            Commands::Completion { shell } => return Ok(Request::Completion(*shell)),
            Commands::JobsList { job_name } => RemoteRequest::JobsList(selector(job_name)?),
            Commands::JobsDisable { job_name } => RemoteRequest::JobsDisable(selector(job_name)?),
            Commands::JobsDelete {
                job_name,
                disabled_only,
            } => RemoteRequest::JobsDelete {
                selector: selector(job_name)?,
                disabled_only: *disabled_only,
            },
            Commands::JobsConfig { job_name } => RemoteRequest::JobsConfig(selector(job_name)?),
            Commands::JobsCopy {
                job_name,
                job_name_pattern,
                job_name_repl,
            } => RemoteRequest::JobsCopy {
                selector: selector(job_name)?,
                rename: Substitution::new(job_name_pattern, job_name_repl)?,
            },
            Commands::NodesList { node_name } => {
                RemoteRequest::NodesList(NamePattern::new(node_name)?)
            }
            Commands::JobsFailing { pattern, max_score } => RemoteRequest::JobsFailing {
                selector: search(pattern)?,
                max_score: *max_score,
            },
            Commands::JobsUnstable { pattern } => RemoteRequest::JobsUnstable(search(pattern)?),
            Commands::BuildsRunning { longer_than } => RemoteRequest::BuildsRunning {
                longer_than: *longer_than,
            },
        };
        Ok(Request::Remote(remote))
    }
}

/// Run `cli` against the server named by its profile.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    execute_with(cli, &ConfigEnv::from_process(), |profile| {
        Ok(ServiceContainer::new(&profile)?)
    })
}

/// Run `cli`, building services for the resolved profile with `connect`.
///
/// `connect` is only called after the subcommand's arguments validated and the
/// profile resolved, so help output and bad arguments never reach the network.
pub fn execute_with<F>(cli: &Cli, env: &ConfigEnv, connect: F) -> CliResult<()>
where
    F: FnOnce(Profile) -> CliResult<ServiceContainer>,
{
    let Some(command) = &cli.command else {
        debug!("no subcommand given, printing help");
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let remote = match Request::from_command(command, cli.folder_depth)? {
        Request::Completion(shell) => {
            _completion(shell);
            return Ok(());
        }
        Request::Remote(remote) => remote,
    };

    let path = config::config_path(cli.config_file.as_deref(), env);
    let profile = config::resolve(&path, &cli.config_profile)?;
    debug!("{}: profile {:?}", command.name(), profile);
    let services = connect(profile)?;

    run(&remote, &services)
}

fn run(request: &RemoteRequest, services: &ServiceContainer) -> CliResult<()> {
    match request {
        RemoteRequest::JobsList(selector) => _jobs_list(&services.jobs, selector),
        RemoteRequest::JobsDisable(selector) => _jobs_disable(&services.jobs, selector),
        RemoteRequest::JobsDelete {
            selector,
            disabled_only,
        } => _jobs_delete(&services.jobs, selector, *disabled_only),
        RemoteRequest::JobsConfig(selector) => _jobs_config(&services.jobs, selector),
        RemoteRequest::JobsCopy { selector, rename } => {
            _jobs_copy(&services.jobs, selector, rename)
        }
        RemoteRequest::NodesList(pattern) => _nodes_list(services, pattern),
        RemoteRequest::JobsFailing {
            selector,
            max_score,
        } => _jobs_failing(&services.jobs, selector, *max_score),
        RemoteRequest::JobsUnstable(selector) => _jobs_unstable(&services.jobs, selector),
        RemoteRequest::BuildsRunning { longer_than } => _builds_running(services, *longer_than),
    }
}

fn _completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    eprintln!("Generating completion file for {shell:?}...");
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[instrument(skip(jobs))]
fn _jobs_list(jobs: &JobService, selector: &JobSelector) -> CliResult<()> {
    for job in jobs.list(selector)? {
        output::info(&job.full_name);
    }
    Ok(())
}

#[instrument(skip(jobs))]
fn _jobs_disable(jobs: &JobService, selector: &JobSelector) -> CliResult<()> {
    jobs.disable(selector, |event| output::info(event))?;
    Ok(())
}

#[instrument(skip(jobs))]
fn _jobs_delete(jobs: &JobService, selector: &JobSelector, disabled_only: bool) -> CliResult<()> {
    jobs.delete(selector, disabled_only, |event| output::info(event))?;
    Ok(())
}

#[instrument(skip(jobs))]
fn _jobs_config(jobs: &JobService, selector: &JobSelector) -> CliResult<()> {
    jobs.configs(selector, |_, config| output::info(config))?;
    Ok(())
}

#[instrument(skip(jobs))]
fn _jobs_copy(jobs: &JobService, selector: &JobSelector, rename: &Substitution) -> CliResult<()> {
    jobs.copy(selector, rename, |event| output::info(event))?;
    Ok(())
}

#[instrument(skip(services))]
fn _nodes_list(services: &ServiceContainer, pattern: &NamePattern) -> CliResult<()> {
    let rows = services.nodes.list(pattern)?;
    output::info(&output::nodes_table(&rows));
    Ok(())
}

#[instrument(skip(jobs))]
fn _jobs_failing(jobs: &JobService, selector: &JobSelector, max_score: i64) -> CliResult<()> {
    let failing = jobs.failing(selector, max_score)?;
    output::info(&output::failing_table(&failing));
    Ok(())
}

#[instrument(skip(jobs))]
fn _jobs_unstable(jobs: &JobService, selector: &JobSelector) -> CliResult<()> {
    let unstable = jobs.unstable(selector)?;
    output::info(&output::unstable_table(&unstable));
    Ok(())
}

#[instrument(skip(services))]
fn _builds_running(services: &ServiceContainer, longer_than: u64) -> CliResult<()> {
    let rows = services.builds.running(longer_than, Local::now())?;
    output::info(&output::running_builds_table(&rows));
    Ok(())
}
