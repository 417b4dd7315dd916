use std::collections::HashMap;
use std::env;
use std::sync::{Mutex, MutexGuard, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{
    split_folder, BuildInfo, Job, JobInfo, Label, Node, NodeInfo, RunningBuild,
};
use crate::infrastructure::{InfraError, InfraResult, JenkinsApi};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "reqwest", "httpmock"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// In-memory Jenkins that records every call.
///
/// Jobs are listed in insertion order. A job is nested `n` folder levels deep
/// when its name contains `n` slashes.
#[derive(Default)]
pub struct FakeJenkins {
    jobs: Vec<Job>,
    job_infos: HashMap<String, JobInfo>,
    configs: HashMap<String, String>,
    nodes: Vec<Node>,
    node_infos: HashMap<String, NodeInfo>,
    running: Vec<RunningBuild>,
    build_infos: HashMap<String, BuildInfo>,
    fail_on: Option<String>,
    created: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeJenkins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an enabled, blue job.
    pub fn with_job(self, full_name: &str) -> Self {
        self.with_job_state(full_name, "blue", false)
    }

    /// Add a job with the given color and disabled flag.
    pub fn with_job_state(mut self, full_name: &str, color: &str, disabled: bool) -> Self {
        self.jobs.push(Job {
            full_name: full_name.to_string(),
            name: split_folder(full_name).1.to_string(),
            url: job_url(full_name),
            color: Some(color.to_string()),
            is_folder: false,
        });
        self.job_infos.insert(
            full_name.to_string(),
            JobInfo {
                name: split_folder(full_name).1.to_string(),
                full_name: full_name.to_string(),
                url: job_url(full_name),
                color: Some(color.to_string()),
                disabled,
                health_report: Vec::new(),
                last_build: None,
                last_unstable_build: None,
            },
        );
        self
    }

    pub fn with_folder(mut self, full_name: &str) -> Self {
        self.jobs.push(Job {
            full_name: full_name.to_string(),
            name: split_folder(full_name).1.to_string(),
            url: job_url(full_name),
            color: None,
            is_folder: true,
        });
        self
    }

    /// Replace the details returned for an existing job.
    pub fn with_job_info(mut self, info: JobInfo) -> Self {
        self.job_infos.insert(info.full_name.clone(), info);
        self
    }

    pub fn with_config(mut self, full_name: &str, xml: &str) -> Self {
        self.configs.insert(full_name.to_string(), xml.to_string());
        self
    }

    /// Add a node; `labels` are the assigned labels besides the node itself.
    pub fn with_node(mut self, name: &str, offline: bool, executors: u32, labels: &[&str]) -> Self {
        self.nodes.push(Node {
            name: name.to_string(),
            offline,
        });
        let mut assigned_labels = vec![Label {
            name: name.to_string(),
        }];
        assigned_labels.extend(labels.iter().map(|label| Label {
            name: label.to_string(),
        }));
        self.node_infos.insert(
            name.to_string(),
            NodeInfo {
                display_name: name.to_string(),
                offline,
                num_executors: executors,
                assigned_labels,
            },
        );
        self
    }

    /// Add a node that is listed but gone by the time it is looked up.
    pub fn with_vanished_node(mut self, name: &str) -> Self {
        self.nodes.push(Node {
            name: name.to_string(),
            offline: true,
        });
        self
    }

    pub fn with_running_build(mut self, build: RunningBuild, info: BuildInfo) -> Self {
        self.build_infos.insert(build.url.clone(), info);
        self.running.push(build);
        self
    }

    /// Make every mutation of `full_name` fail with HTTP 500.
    pub fn failing_on(mut self, full_name: &str) -> Self {
        self.fail_on = Some(full_name.to_string());
        self
    }

    /// Every call made so far, e.g. `disable_job(build-main)`.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Calls that change server state.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| {
                call.starts_with("disable_job")
                    || call.starts_with("delete_job")
                    || call.starts_with("copy_job")
            })
            .collect()
    }

    fn record(&self, call: String) {
        lock(&self.calls).push(call);
    }

    fn mutate(&self, call: String, name: &str) -> InfraResult<()> {
        self.record(call);
        if self.fail_on.as_deref() == Some(name) {
            return Err(InfraError::Http {
                method: "POST",
                url: job_url(name),
                status: 500,
            });
        }
        Ok(())
    }
}

impl JenkinsApi for FakeJenkins {
    fn get_jobs(&self, folder_depth: usize) -> InfraResult<Vec<Job>> {
        self.record(format!("get_jobs({folder_depth})"));
        Ok(self
            .jobs
            .iter()
            .filter(|job| job.full_name.matches('/').count() <= folder_depth)
            .cloned()
            .collect())
    }

    fn get_job_info(&self, name: &str) -> InfraResult<JobInfo> {
        self.record(format!("get_job_info({name})"));
        self.job_infos
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(&job_url(name)))
    }

    fn get_job_config(&self, name: &str) -> InfraResult<String> {
        self.record(format!("get_job_config({name})"));
        self.configs
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(&job_url(name)))
    }

    fn job_exists(&self, name: &str) -> InfraResult<bool> {
        self.record(format!("job_exists({name})"));
        Ok(self.jobs.iter().any(|job| job.full_name == name)
            || lock(&self.created).iter().any(|created| created == name))
    }

    fn disable_job(&self, name: &str) -> InfraResult<()> {
        self.mutate(format!("disable_job({name})"), name)
    }

    fn delete_job(&self, name: &str) -> InfraResult<()> {
        self.mutate(format!("delete_job({name})"), name)
    }

    fn copy_job(&self, from: &str, to: &str) -> InfraResult<()> {
        self.mutate(format!("copy_job({from}, {to})"), from)?;
        lock(&self.created).push(to.to_string());
        Ok(())
    }

    fn get_nodes(&self) -> InfraResult<Vec<Node>> {
        self.record("get_nodes()".to_string());
        Ok(self.nodes.clone())
    }

    fn node_exists(&self, name: &str) -> InfraResult<bool> {
        self.record(format!("node_exists({name})"));
        Ok(self.node_infos.contains_key(name))
    }

    fn get_node_info(&self, name: &str) -> InfraResult<NodeInfo> {
        self.record(format!("get_node_info({name})"));
        self.node_infos
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(&format!("computer/{name}")))
    }

    fn get_running_builds(&self) -> InfraResult<Vec<RunningBuild>> {
        self.record("get_running_builds()".to_string());
        Ok(self.running.clone())
    }

    fn get_build_info(&self, build: &RunningBuild) -> InfraResult<BuildInfo> {
        self.record(format!("get_build_info({})", build.url));
        self.build_infos
            .get(&build.url)
            .cloned()
            .ok_or_else(|| not_found(&build.url))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn job_url(full_name: &str) -> String {
    let path: String = full_name
        .split('/')
        .map(|segment| format!("job/{segment}/"))
        .collect();
    format!("http://jenkins.invalid/{path}")
}

fn not_found(url: &str) -> InfraError {
    InfraError::Http {
        method: "GET",
        url: url.to_string(),
        status: 404,
    }
}
