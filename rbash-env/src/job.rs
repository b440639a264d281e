//! Background job bookkeeping.
//!
//! Grounded on `yash_env::job`'s `Job`/`JobSet` shape. Actually spawning
//! and waiting on processes is an external collaborator (§1), so unlike
//! the teacher this module does not depend on `nix`: a job only needs to
//! remember the PID a named external interface handed back and whatever
//! status that interface later reports, both representable with `libc`
//! types this workspace already depends on.

use libc::pid_t;

/// Last known status of a job's process.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobStatus {
    Running,
    Exited(i32),
    Signaled(i32),
    Stopped(i32),
}

/// A backgrounded pipeline.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Job {
    pub pid: pid_t,
    pub status: JobStatus,
    /// Source text of the command, for `jobs` builtin output.
    pub name: String,
}

impl Job {
    pub fn new(pid: pid_t, name: impl Into<String>) -> Self {
        Job {
            pid,
            status: JobStatus::Running,
            name: name.into(),
        }
    }
}

/// Collection of jobs known to a session.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JobSet {
    jobs: Vec<Job>,
    last_async_pid: Option<pid_t>,
}

impl JobSet {
    pub fn push(&mut self, job: Job) -> usize {
        self.last_async_pid = Some(job.pid);
        self.jobs.push(job);
        self.jobs.len() - 1
    }

    pub fn get(&self, id: usize) -> std::option::Option<&Job> {
        self.jobs.get(id)
    }

    pub fn get_mut(&mut self, id: usize) -> std::option::Option<&mut Job> {
        self.jobs.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    /// PID for the `$!` special parameter.
    pub fn last_async_pid(&self) -> std::option::Option<pid_t> {
        self.last_async_pid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushing_a_job_tracks_last_async_pid() {
        let mut jobs = JobSet::default();
        let id = jobs.push(Job::new(123, "sleep 1 &"));
        assert_eq!(jobs.last_async_pid(), Some(123));
        assert_eq!(jobs.get(id).unwrap().pid, 123);
    }
}
