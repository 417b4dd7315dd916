//! Blocking HTTP implementation of [`JenkinsApi`]
//!
//! Every request carries basic auth from the profile. POST requests also carry
//! the CSRF crumb, fetched once per client, and the session cookies the server
//! set. No request timeout is set.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::domain::{split_folder, BuildInfo, Job, JobInfo, Node, NodeInfo, Profile, RunningBuild};
use crate::infrastructure::{InfraError, InfraResult, JenkinsApi};

/// Fields requested when listing jobs; `jobs` marks folders.
pub const JOBS_TREE: &str = "jobs[url,color,name,jobs]";

const NOT_FOUND: u16 = 404;
const INTERNAL_SERVER_ERROR: u16 = 500;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Crumb {
    crumb: String,
    crumb_request_field: String,
}

#[derive(Debug, Deserialize)]
struct JobList {
    #[serde(default)]
    jobs: Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    name: String,
    #[serde(default)]
    url: String,
    color: Option<String>,
    jobs: Option<Vec<IgnoredAny>>,
}

#[derive(Debug, Deserialize)]
struct ComputerList {
    #[serde(default)]
    computer: Vec<RawComputer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComputer {
    display_name: String,
    #[serde(default)]
    offline: bool,
}

#[derive(Debug, Deserialize)]
struct ExecutorList {
    #[serde(default)]
    executors: Vec<RawExecutor>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExecutor {
    #[serde(default)]
    number: u32,
    current_executable: Option<RawExecutable>,
}

#[derive(Debug, Deserialize)]
struct RawExecutable {
    number: Option<u64>,
    url: Option<String>,
}

/// Jenkins client bound to one profile.
pub struct JenkinsClient {
    base_url: Url,
    username: String,
    password: String,
    http: Client,
    crumb: OnceLock<Option<Crumb>>,
}

impl std::fmt::Debug for JenkinsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JenkinsClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl JenkinsClient {
    /// Create a client for `profile`. Does not contact the server.
    pub fn new(profile: &Profile) -> InfraResult<Self> {
        let base_url = Url::parse(&profile.url).map_err(|e| InfraError::InvalidUrl {
            url: profile.url.clone(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(InfraError::InvalidUrl {
                url: profile.url.clone(),
                message: "not a base URL".into(),
            });
        }

        // the crumb is bound to the session cookie set by the crumb issuer
        let http = Client::builder()
            .cookie_store(true)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| InfraError::request("build HTTP client", e))?;

        Ok(Self {
            base_url,
            username: profile.username.clone(),
            password: profile.password.clone(),
            http,
            crumb: OnceLock::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/<segments...>`
    fn url(&self, segments: &[&str]) -> InfraResult<Url> {
        append_segments(self.base_url.clone(), segments)
    }

    /// `<base>/job/<f1>/job/<f2>/<tail...>` for job path `f1/f2`.
    fn job_url(&self, name: &str, tail: &[&str]) -> InfraResult<Url> {
        let mut segments = job_segments(name);
        segments.extend_from_slice(tail);
        self.url(&segments)
    }

    fn node_url(&self, name: &str, depth: u8) -> InfraResult<Url> {
        let mut url = self.url(&["computer", node_path_name(name), "api", "json"])?;
        url.query_pairs_mut()
            .append_pair("depth", &depth.to_string());
        Ok(url)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.password))
    }

    fn get(&self, url: Url) -> InfraResult<Response> {
        debug!("GET {}", url);
        let response = self
            .authed(self.http.get(url.clone()))
            .send()
            .map_err(|e| InfraError::request(format!("GET {url}"), e))?;
        check_status("GET", &url, response)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> InfraResult<T> {
        let context = url.to_string();
        self.get(url)?
            .json()
            .map_err(|e| InfraError::decode(context, e))
    }

    fn post(&self, url: Url) -> InfraResult<Response> {
        let mut request = self.authed(self.http.post(url.clone()));
        if let Some(crumb) = self.crumb()? {
            request = request.header(crumb.crumb_request_field.as_str(), crumb.crumb.as_str());
        }
        debug!("POST {}", url);
        let response = request
            .send()
            .map_err(|e| InfraError::request(format!("POST {url}"), e))?;
        check_status("POST", &url, response)
    }

    fn crumb(&self) -> InfraResult<Option<&Crumb>> {
        if let Some(crumb) = self.crumb.get() {
            return Ok(crumb.as_ref());
        }
        let fetched = self.fetch_crumb()?;
        Ok(self.crumb.get_or_init(|| fetched).as_ref())
    }

    /// A 404 from the crumb issuer means CSRF protection is off.
    fn fetch_crumb(&self) -> InfraResult<Option<Crumb>> {
        let url = self.url(&["crumbIssuer", "api", "json"])?;
        match self.get_json::<Crumb>(url) {
            Ok(crumb) => Ok(Some(crumb)),
            Err(e) if e.status() == Some(NOT_FOUND) => {
                debug!("crumb issuer not available");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn collect_jobs(&self, folder: &str, depth_left: usize, out: &mut Vec<Job>) -> InfraResult<()> {
        let mut url = self.job_url(folder, &["api", "json"])?;
        url.query_pairs_mut().append_pair("tree", JOBS_TREE);
        let list: JobList = self.get_json(url)?;

        for raw in list.jobs {
            let full_name = if folder.is_empty() {
                raw.name.clone()
            } else {
                format!("{folder}/{}", raw.name)
            };
            let is_folder = raw.jobs.is_some();
            out.push(Job {
                full_name: full_name.clone(),
                name: raw.name,
                url: raw.url,
                color: raw.color,
                is_folder,
            });
            if is_folder && depth_left > 0 {
                self.collect_jobs(&full_name, depth_left - 1, out)?;
            }
        }
        Ok(())
    }
}

impl JenkinsApi for JenkinsClient {
    #[instrument(level = "debug", skip(self))]
    fn get_jobs(&self, folder_depth: usize) -> InfraResult<Vec<Job>> {
        let mut jobs = Vec::new();
        self.collect_jobs("", folder_depth, &mut jobs)?;
        debug!("get_jobs: {} jobs", jobs.len());
        Ok(jobs)
    }

    fn get_job_info(&self, name: &str) -> InfraResult<JobInfo> {
        let mut url = self.job_url(name, &["api", "json"])?;
        url.query_pairs_mut().append_pair("depth", "0");
        self.get_json(url)
    }

    fn get_job_config(&self, name: &str) -> InfraResult<String> {
        let url = self.job_url(name, &["config.xml"])?;
        let context = url.to_string();
        self.get(url)?
            .text()
            .map_err(|e| InfraError::decode(context, e))
    }

    fn job_exists(&self, name: &str) -> InfraResult<bool> {
        let mut url = self.job_url(name, &["api", "json"])?;
        url.query_pairs_mut().append_pair("tree", "name");
        match self.get(url) {
            Ok(_) => Ok(true),
            Err(e) if e.status() == Some(NOT_FOUND) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn disable_job(&self, name: &str) -> InfraResult<()> {
        self.post(self.job_url(name, &["disable"])?)?;
        Ok(())
    }

    fn delete_job(&self, name: &str) -> InfraResult<()> {
        self.post(self.job_url(name, &["doDelete"])?)?;
        Ok(())
    }

    fn copy_job(&self, from: &str, to: &str) -> InfraResult<()> {
        let (from_folder, from_short) = split_folder(from);
        let (to_folder, to_short) = split_folder(to);
        if from_folder != to_folder {
            return Err(InfraError::Client(format!(
                "copy[{from} to {to}] failed, source and destination folder must be the same"
            )));
        }

        let mut url = self.job_url(to_folder, &["createItem"])?;
        url.query_pairs_mut()
            .append_pair("name", to_short)
            .append_pair("mode", "copy")
            .append_pair("from", from_short);
        self.post(url)?;
        Ok(())
    }

    fn get_nodes(&self) -> InfraResult<Vec<Node>> {
        let mut url = self.url(&["computer", "api", "json"])?;
        url.query_pairs_mut().append_pair("depth", "0");
        let list: ComputerList = self.get_json(url)?;
        Ok(list
            .computer
            .into_iter()
            .map(|c| Node {
                name: c.display_name,
                offline: c.offline,
            })
            .collect())
    }

    fn node_exists(&self, name: &str) -> InfraResult<bool> {
        match self.get(self.node_url(name, 0)?) {
            Ok(_) => Ok(true),
            Err(e) if e.status() == Some(NOT_FOUND) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn get_node_info(&self, name: &str) -> InfraResult<NodeInfo> {
        self.get_json(self.node_url(name, 0)?)
    }

    #[instrument(level = "debug", skip(self))]
    fn get_running_builds(&self) -> InfraResult<Vec<RunningBuild>> {
        let mut builds = Vec::new();
        for node in self.get_nodes()? {
            let node_name = node_path_name(&node.name);
            let executors: ExecutorList = match self.get_json(self.node_url(&node.name, 2)?) {
                Ok(executors) => executors,
                // Some nodes fail on depth=2; if depth=0 still answers they run nothing.
                Err(e) if e.status() == Some(INTERNAL_SERVER_ERROR) => {
                    self.get(self.node_url(&node.name, 0)?)?;
                    debug!("skipping node {}: {}", node_name, e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            for executor in executors.executors {
                let Some(RawExecutable {
                    number: Some(number),
                    url: Some(url),
                }) = executor.current_executable
                else {
                    continue;
                };
                builds.push(RunningBuild {
                    name: job_name_from_url(&url),
                    number,
                    url,
                    node: node_name.to_string(),
                    executor: executor.number,
                });
            }
        }
        Ok(builds)
    }

    fn get_build_info(&self, build: &RunningBuild) -> InfraResult<BuildInfo> {
        let build_url = Url::parse(&build.url).map_err(|e| InfraError::InvalidUrl {
            url: build.url.clone(),
            message: e.to_string(),
        })?;
        let mut url = append_segments(build_url, &["api", "json"])?;
        url.query_pairs_mut().append_pair("depth", "0");
        self.get_json(url)
    }
}

fn check_status(method: &'static str, url: &Url, response: Response) -> InfraResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(InfraError::Http {
            method,
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

fn append_segments(mut url: Url, segments: &[&str]) -> InfraResult<Url> {
    let raw = url.to_string();
    url.path_segments_mut()
        .map_err(|_| InfraError::InvalidUrl {
            url: raw,
            message: "not a base URL".into(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// `a/b` -> `["job", "a", "job", "b"]`
fn job_segments(name: &str) -> Vec<&str> {
    name.split('/')
        .filter(|segment| !segment.is_empty())
        .flat_map(|segment| ["job", segment])
        .collect()
}

/// The built-in node is listed under its display name but addressed by a
/// reserved path name.
pub fn node_path_name(name: &str) -> &str {
    match name {
        "master" => "(master)",
        "Built-In Node" => "(built-in)",
        other => other,
    }
}

/// Job path of a build URL, as encoded in the URL:
/// `http://ci/job/a/job/b/12/` -> `a/b`.
pub fn job_name_from_url(build_url: &str) -> String {
    let Ok(url) = Url::parse(build_url) else {
        return String::new();
    };
    let Some(mut segments) = url.path_segments() else {
        return String::new();
    };
    let mut names = Vec::new();
    while let Some(segment) = segments.next() {
        if segment == "job" {
            if let Some(name) = segments.next() {
                names.push(name);
            }
        }
    }
    names.join("/")
}
