//! Domain entities: read-only projections of remote Jenkins state
//!
//! Nothing here is persisted or cached; every value lives for one invocation.

use serde::Deserialize;

use crate::domain::select::Named;

/// Connection profile resolved from the INI config file.
#[derive(Clone, PartialEq, Eq)]
pub struct Profile {
    /// Section name the profile was read from
    pub name: String,
    pub url: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A job (or folder) as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Slash-separated path including parent folders, e.g. `team/build-main`
    pub full_name: String,
    /// Last path component
    pub name: String,
    pub url: String,
    /// Ball color (`blue`, `red`, `disabled`, ...); folders have none
    pub color: Option<String>,
    pub is_folder: bool,
}

impl Named for Job {
    fn name(&self) -> &str {
        &self.full_name
    }
}

/// Split `a/b/c` into (`a/b`, `c`).
pub fn split_folder(full_name: &str) -> (&str, &str) {
    match full_name.rsplit_once('/') {
        Some((folder, short)) => (folder, short),
        None => ("", full_name),
    }
}

/// Health report entry attached to a job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthReport {
    pub score: i64,
    #[serde(default)]
    pub description: String,
}

/// Reference to a build of a job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildRef {
    pub number: u64,
    #[serde(default)]
    pub url: String,
}

/// Detailed job view from `job/<name>/api/json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub url: String,
    pub color: Option<String>,
    /// Folders carry no `disabled` flag; they count as enabled
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub health_report: Vec<HealthReport>,
    pub last_build: Option<BuildRef>,
    pub last_unstable_build: Option<BuildRef>,
}

impl JobInfo {
    /// Score of the first health report, if the server sent one.
    pub fn health_score(&self) -> Option<i64> {
        self.health_report.first().map(|report| report.score)
    }

    /// Red ball with a health score at or below `max_score`.
    pub fn is_failing(&self, max_score: i64) -> bool {
        self.color.as_deref() == Some("red")
            && self.health_score().is_some_and(|score| score <= max_score)
    }

    /// The most recent build is also the most recent unstable build.
    pub fn is_unstable(&self) -> bool {
        match (&self.last_unstable_build, &self.last_build) {
            (Some(unstable), Some(last)) => unstable.number == last.number,
            _ => false,
        }
    }
}

/// A node (agent or built-in) as listed by `computer/api/json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub offline: bool,
}

impl Named for Node {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Label assigned to a node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Detailed node view from `computer/<name>/api/json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub offline: bool,
    #[serde(default)]
    pub num_executors: u32,
    #[serde(default)]
    pub assigned_labels: Vec<Label>,
}

impl NodeInfo {
    /// Assigned labels without the implicit self-label named after the node.
    pub fn labels_excluding(&self, node_name: &str) -> Vec<String> {
        self.assigned_labels
            .iter()
            .filter(|label| label.name != node_name)
            .map(|label| label.name.clone())
            .collect()
    }
}

/// A build currently occupying an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningBuild {
    /// Job path derived from the build URL
    pub name: String,
    pub number: u64,
    pub url: String,
    pub node: String,
    pub executor: u32,
}

/// Detailed build view from `<build url>/api/json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub full_display_name: String,
    /// Start time in milliseconds since the epoch
    pub timestamp: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub built_on: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(color: &str, scores: &[i64]) -> JobInfo {
        JobInfo {
            name: "job".into(),
            full_name: "job".into(),
            url: "http://ci/job/job/".into(),
            color: Some(color.into()),
            disabled: false,
            health_report: scores
                .iter()
                .map(|score| HealthReport {
                    score: *score,
                    description: String::new(),
                })
                .collect(),
            last_build: None,
            last_unstable_build: None,
        }
    }

    #[test]
    fn given_nested_name_when_splitting_then_returns_folder_and_short_name() {
        assert_eq!(split_folder("a/b/c"), ("a/b", "c"));
        assert_eq!(split_folder("top"), ("", "top"));
    }

    #[test]
    fn given_red_job_with_low_score_when_checking_failing_then_true() {
        assert!(info("red", &[0, 100]).is_failing(0));
        assert!(info("red", &[20]).is_failing(40));
    }

    #[test]
    fn given_red_job_above_max_score_when_checking_failing_then_false() {
        assert!(!info("red", &[60]).is_failing(40));
    }

    #[test]
    fn given_blue_or_unscored_job_when_checking_failing_then_false() {
        assert!(!info("blue", &[0]).is_failing(0));
        assert!(!info("red", &[]).is_failing(100));
    }

    #[test]
    fn given_last_build_unstable_when_checking_unstable_then_true() {
        let mut job = info("yellow", &[]);
        job.last_build = Some(BuildRef { number: 7, url: String::new() });
        job.last_unstable_build = Some(BuildRef { number: 7, url: String::new() });
        assert!(job.is_unstable());

        job.last_build = Some(BuildRef { number: 8, url: String::new() });
        assert!(!job.is_unstable());
    }

    #[test]
    fn given_job_info_json_when_deserializing_then_reads_camel_case_fields() {
        let json = r#"{
            "_class": "hudson.model.FreeStyleProject",
            "name": "build",
            "fullName": "team/build",
            "url": "http://ci/job/team/job/build/",
            "color": "red",
            "disabled": true,
            "healthReport": [{"score": 20, "description": "Build stability"}],
            "lastBuild": {"number": 3, "url": "http://ci/job/team/job/build/3/"},
            "lastUnstableBuild": null
        }"#;
        let info: JobInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.full_name, "team/build");
        assert!(info.disabled);
        assert_eq!(info.health_score(), Some(20));
        assert_eq!(info.last_build.map(|b| b.number), Some(3));
        assert!(info.last_unstable_build.is_none());
    }

    #[test]
    fn given_node_labels_when_excluding_self_then_drops_own_name() {
        let info = NodeInfo {
            display_name: "agent-1".into(),
            offline: false,
            num_executors: 2,
            assigned_labels: vec![
                Label { name: "agent-1".into() },
                Label { name: "linux".into() },
                Label { name: "docker".into() },
            ],
        };
        assert_eq!(info.labels_excluding("agent-1"), vec!["linux", "docker"]);
    }
}
