// This file is part of posh, a POSIX-conformant command-shell interpreter
// core.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Job control bookkeeping (spec.md §3 "Job", §5 "Cancellation and
//! timeouts").

use slab::Slab;

#[doc(no_inline)]
pub use nix::unistd::Pid;

/// Lifecycle state of a job as a whole.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobState {
    Running,
    Stopped,
    Done,
    Terminated,
}

/// One process belonging to a job (spec.md §3 "Job": "ordered list of
/// processes each with pid, state, exit status, command-line string,
/// notified flag").
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JobProcess {
    pub pid: Pid,
    pub state: JobState,
    /// `WEXITSTATUS`/`128+signo`, `None` while still running.
    pub exit_status: std::option::Option<i32>,
    pub command_line: String,
    pub notified: bool,
}

impl JobProcess {
    #[must_use]
    pub fn new(pid: Pid, command_line: impl Into<String>) -> Self {
        JobProcess {
            pid,
            state: JobState::Running,
            exit_status: None,
            command_line: command_line.into(),
            notified: false,
        }
    }
}

/// A pipeline's process group, tracked as one job (spec.md §3 "Job").
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Job {
    pub id: usize,
    pub pgid: Pid,
    pub state: JobState,
    pub processes: Vec<JobProcess>,
}

impl Job {
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self.state, JobState::Done | JobState::Terminated)
    }
}

/// The shell's job table.
///
/// Backed by a [`Slab`] so a job's id *is* its slab key: assigning ids
/// and reaping completed jobs are both O(1) instead of a linear scan
/// over a growing `Vec` (spec.md §3: "job IDs are unique;
/// `current`/`previous` reference members still present; a
/// completed-and-fully-notified job is reaped (removed) from the
/// table").
#[derive(Clone, Debug, Default)]
pub struct JobStore {
    jobs: Slab<Job>,
    current: std::option::Option<usize>,
    previous: std::option::Option<usize>,
    last_async_pid: std::option::Option<Pid>,
}

impl JobStore {
    #[must_use]
    pub fn new() -> Self {
        JobStore::default()
    }

    pub fn add(&mut self, pgid: Pid, processes: Vec<JobProcess>) -> usize {
        let id = self.jobs.insert(Job {
            id: 0,
            pgid,
            state: JobState::Running,
            processes,
        });
        self.jobs[id].id = id;
        self.previous = self.current;
        self.current = Some(id);
        id
    }

    #[must_use]
    pub fn get(&self, id: usize) -> std::option::Option<&Job> {
        self.jobs.get(id)
    }

    pub fn get_mut(&mut self, id: usize) -> std::option::Option<&mut Job> {
        self.jobs.get_mut(id)
    }

    #[must_use]
    pub fn current(&self) -> std::option::Option<&Job> {
        self.current.and_then(|id| self.get(id))
    }

    #[must_use]
    pub fn previous(&self) -> std::option::Option<&Job> {
        self.previous.and_then(|id| self.get(id))
    }

    pub fn set_last_async_pid(&mut self, pid: Pid) {
        self.last_async_pid = Some(pid);
    }

    /// `$!`.
    #[must_use]
    pub fn last_async_pid(&self) -> std::option::Option<Pid> {
        self.last_async_pid
    }

    /// Removes every job that is done and has had every process
    /// notified, as POSIX requires for `jobs`/prompt reporting.
    pub fn reap_notified(&mut self) {
        let done: Vec<usize> = self
            .jobs
            .iter()
            .filter(|(_, job)| job.is_done() && job.processes.iter().all(|p| p.notified))
            .map(|(id, _)| id)
            .collect();
        for id in done {
            self.jobs.remove(id);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().map(|(_, job)| job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_assigns_unique_ids_and_tracks_current() {
        let mut store = JobStore::new();
        let a = store.add(Pid::from_raw(100), vec![JobProcess::new(Pid::from_raw(100), "a")]);
        let b = store.add(Pid::from_raw(200), vec![JobProcess::new(Pid::from_raw(200), "b")]);
        assert_ne!(a, b);
        assert_eq!(store.current().unwrap().id, b);
        assert_eq!(store.previous().unwrap().id, a);
    }

    #[test]
    fn reap_removes_fully_notified_done_jobs() {
        let mut store = JobStore::new();
        let id = store.add(Pid::from_raw(1), vec![JobProcess::new(Pid::from_raw(1), "a")]);
        {
            let job = store.get_mut(id).unwrap();
            job.state = JobState::Done;
            job.processes[0].notified = true;
        }
        store.reap_notified();
        assert!(store.get(id).is_none());
    }
}
