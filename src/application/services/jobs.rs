//! Job service
//!
//! Every operation lists the jobs, keeps those matching the selector and then
//! acts on each survivor in listing order. Mutations report a [`JobEvent`] per
//! affected job as they happen; a failing job stops the run without undoing
//! earlier ones.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::ApplicationResult;
use crate::domain::{for_each, select, Job, JobInfo, NamePattern, Substitution};
use crate::infrastructure::{InfraResult, JenkinsApi};

/// Which jobs an operation applies to.
#[derive(Debug, Clone)]
pub struct JobSelector {
    pub pattern: NamePattern,
    /// How many folder levels to descend when listing (0 = top level only)
    pub folder_depth: usize,
}

impl JobSelector {
    pub fn new(pattern: NamePattern) -> Self {
        Self {
            pattern,
            folder_depth: 0,
        }
    }

    pub fn with_folder_depth(mut self, folder_depth: usize) -> Self {
        self.folder_depth = folder_depth;
        self
    }
}

/// Status of one affected job; `Display` gives the line shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Disabling { name: String },
    Deleted { name: String },
    Copying { from: String, to: String },
    CopySkipped { target: String },
}

impl fmt::Display for JobEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobEvent::Disabling { name } => write!(f, "Disable job {name}"),
            JobEvent::Deleted { name } => write!(f, "Deleted job {name}"),
            JobEvent::Copying { from, to } => write!(f, "Copy job {from:60} -> {to}"),
            JobEvent::CopySkipped { target } => {
                write!(f, "Job {target} already exists. skipping copy ...")
            }
        }
    }
}

/// Service for listing and mutating jobs.
pub struct JobService {
    api: Arc<dyn JenkinsApi>,
}

impl JobService {
    /// Create a new job service.
    pub fn new(api: Arc<dyn JenkinsApi>) -> Self {
        Self { api }
    }

    /// Jobs whose full name matches the selector, in listing order.
    pub fn list(&self, selector: &JobSelector) -> ApplicationResult<Vec<Job>> {
        let jobs = self.api.get_jobs(selector.folder_depth)?;
        let total = jobs.len();
        let selected = select(jobs, &selector.pattern);
        debug!(
            "list: {} of {} jobs match '{}'",
            selected.len(),
            total,
            selector.pattern.as_str()
        );
        Ok(selected)
    }

    /// Disable every matching job. Returns the number of jobs disabled.
    pub fn disable(
        &self,
        selector: &JobSelector,
        mut notify: impl FnMut(&JobEvent),
    ) -> ApplicationResult<usize> {
        let jobs = self.list(selector)?;
        let count = for_each(&jobs, |job| {
            notify(&JobEvent::Disabling {
                name: job.full_name.clone(),
            });
            self.api.disable_job(&job.full_name)
        })?;
        info!("disabled {} jobs", count);
        Ok(count)
    }

    /// Delete every matching job; with `disabled_only`, enabled jobs are left
    /// alone. Returns the number of jobs deleted.
    pub fn delete(
        &self,
        selector: &JobSelector,
        disabled_only: bool,
        mut notify: impl FnMut(&JobEvent),
    ) -> ApplicationResult<usize> {
        let jobs = self.list(selector)?;
        let mut deleted = 0;
        for_each(&jobs, |job| -> InfraResult<()> {
            if disabled_only && !self.api.get_job_info(&job.full_name)?.disabled {
                debug!("delete: skipping enabled job {}", job.full_name);
                return Ok(());
            }
            self.api.delete_job(&job.full_name)?;
            deleted += 1;
            notify(&JobEvent::Deleted {
                name: job.full_name.clone(),
            });
            Ok(())
        })?;
        info!("deleted {} jobs", deleted);
        Ok(deleted)
    }

    /// Hand the `config.xml` of every matching job to `emit`.
    pub fn configs(
        &self,
        selector: &JobSelector,
        mut emit: impl FnMut(&Job, &str),
    ) -> ApplicationResult<usize> {
        let jobs = self.list(selector)?;
        let count = for_each(&jobs, |job| -> InfraResult<()> {
            let config = self.api.get_job_config(&job.full_name)?;
            emit(job, &config);
            Ok(())
        })?;
        Ok(count)
    }

    /// Copy every matching job to the name produced by `rename`.
    ///
    /// Jobs the substitution leaves unchanged are not copied; existing targets
    /// are reported and skipped. Returns the number of copies made.
    pub fn copy(
        &self,
        selector: &JobSelector,
        rename: &Substitution,
        mut notify: impl FnMut(&JobEvent),
    ) -> ApplicationResult<usize> {
        let jobs = self.list(selector)?;
        let mut copied = 0;
        for_each(&jobs, |job| -> InfraResult<()> {
            let target = rename.apply(&job.full_name);
            if target == job.full_name {
                debug!("copy: {} unchanged by substitution", job.full_name);
                return Ok(());
            }
            if self.api.job_exists(&target)? {
                notify(&JobEvent::CopySkipped { target });
                return Ok(());
            }
            notify(&JobEvent::Copying {
                from: job.full_name.clone(),
                to: target.clone(),
            });
            self.api.copy_job(&job.full_name, &target)?;
            copied += 1;
            Ok(())
        })?;
        info!("copied {} jobs", copied);
        Ok(copied)
    }

    /// Details of every matching job, in listing order.
    pub fn infos(&self, selector: &JobSelector) -> ApplicationResult<Vec<JobInfo>> {
        let jobs = self.list(selector)?;
        let infos = jobs
            .iter()
            .map(|job| self.api.get_job_info(&job.full_name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(infos)
    }

    /// Matching jobs that are red with a health score of at most `max_score`.
    pub fn failing(&self, selector: &JobSelector, max_score: i64) -> ApplicationResult<Vec<JobInfo>> {
        Ok(self
            .infos(selector)?
            .into_iter()
            .filter(|info| info.is_failing(max_score))
            .collect())
    }

    /// Matching jobs whose last build is unstable.
    pub fn unstable(&self, selector: &JobSelector) -> ApplicationResult<Vec<JobInfo>> {
        Ok(self
            .infos(selector)?
            .into_iter()
            .filter(JobInfo::is_unstable)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_events_when_displayed_then_match_status_lines() {
        assert_eq!(
            JobEvent::Disabling { name: "a".into() }.to_string(),
            "Disable job a"
        );
        assert_eq!(
            JobEvent::Deleted { name: "a".into() }.to_string(),
            "Deleted job a"
        );
        assert_eq!(
            JobEvent::CopySkipped { target: "b".into() }.to_string(),
            "Job b already exists. skipping copy ..."
        );
    }

    #[test]
    fn given_copy_event_when_displayed_then_pads_source_to_sixty_columns() {
        let line = JobEvent::Copying {
            from: "build-main".into(),
            to: "build-release".into(),
        }
        .to_string();
        assert_eq!(line, format!("Copy job {:<60} -> build-release", "build-main"));
        assert_eq!(line.find("->"), Some("Copy job ".len() + 61));
    }
}
