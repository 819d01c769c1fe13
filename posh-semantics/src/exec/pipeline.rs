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

//! Pipeline execution (spec.md §4.3 "Pipeline"). A single-command
//! pipeline never forks; `!` negation is applied by the caller
//! ([`crate::exec::Interp::exec_pipeline`]), not here.

use crate::error::ExecError;
use crate::exec::ControlFlow;
use crate::exec::Interp;
use posh_env::frame::FrameKind;
use posh_env::option::PipeFail;

/// Runs `pipeline`'s commands, wiring a pipe between each consecutive
/// pair, and leaves the aggregated exit status in `interp`'s frame.
pub fn run(interp: &mut Interp, pipeline: &posh_syntax::ast::Pipeline) -> Result<ControlFlow, ExecError> {
    let [only] = pipeline.commands.as_slice() else {
        return run_forked(interp, &pipeline.commands);
    };
    interp.exec_command(only)
}

fn run_forked(interp: &mut Interp, commands: &[std::rc::Rc<posh_syntax::ast::Command>]) -> Result<ControlFlow, ExecError> {
    let n = commands.len();
    let mut read_ends = Vec::with_capacity(n.saturating_sub(1));
    let mut pids = Vec::with_capacity(n);

    let mut pgid: std::option::Option<nix::unistd::Pid> = None;
    let mut prev_read: std::option::Option<i32> = None;
    for (i, command) in commands.iter().enumerate() {
        let is_last = i + 1 == n;
        let next_pipe = if is_last { None } else { Some(interp.system.pipe()?) };

        match interp.system.fork()? {
            posh_env::system::ForkResult::Child => {
                let own_pgid = pgid.unwrap_or_else(|| interp.system.getpid());
                let _ = interp.system.setpgid(interp.system.getpid(), own_pgid);
                if let Some(read_fd) = prev_read {
                    let _ = interp.system.dup2(read_fd, 0);
                    let _ = interp.system.close(read_fd);
                }
                if let Some((read_fd, write_fd)) = next_pipe {
                    let _ = interp.system.close(read_fd);
                    let _ = interp.system.dup2(write_fd, 1);
                    let _ = interp.system.close(write_fd);
                }
                let command = command.clone();
                let outcome = interp.with_child_frame(FrameKind::PipelineMember, None, |interp| {
                    interp.exec_command(&command)
                });
                let status = match outcome {
                    Ok(ControlFlow::Exit(code) | ControlFlow::Return(code)) => code,
                    Ok(_) => interp.status(),
                    Err(_) => 127,
                };
                let _ = crate::trap_dispatch::run_exit_trap(interp);
                interp.system.exit(status);
            }
            posh_env::system::ForkResult::Parent(pid) => {
                let own_pgid = *pgid.get_or_insert(pid);
                let _ = interp.system.setpgid(pid, own_pgid);
                pids.push(pid);
                if let Some(read_fd) = prev_read {
                    let _ = interp.system.close(read_fd);
                }
                if let Some((read_fd, write_fd)) = next_pipe {
                    let _ = interp.system.close(write_fd);
                    read_ends.push(read_fd);
                    prev_read = Some(read_fd);
                }
            }
        }
    }

    let job_id = pgid.map(|pg| {
        let processes = pids.iter().map(|pid| posh_env::job::JobProcess::new(*pid, "")).collect();
        interp.jobs.add(pg, processes)
    });

    let mut statuses = Vec::with_capacity(n);
    for pid in &pids {
        statuses.push(wait_for(interp, *pid)?);
    }

    if let Some(id) = job_id {
        if let Some(job) = interp.jobs.get_mut(id) {
            job.state = posh_env::job::JobState::Done;
            for (process, status) in job.processes.iter_mut().zip(statuses.iter().copied()) {
                process.state = posh_env::job::JobState::Done;
                process.exit_status = Some(status);
                process.notified = true;
            }
        }
        interp.jobs.reap_notified();
    }

    let pipefail = interp.frame.options().borrow().is_on(PipeFail);
    let reported = if pipefail {
        statuses.iter().copied().find(|s| *s != 0).unwrap_or(0)
    } else {
        statuses.last().copied().unwrap_or(0)
    };
    interp.set_status(reported);
    Ok(ControlFlow::Normal)
}

/// Blocks until `pid` has exited or been killed by a signal, mapping the
/// outcome the way POSIX's `$?` does (used by [`crate::exec::subshell`]
/// too, since both wait on a forked child the same way).
pub(crate) fn wait_for(interp: &mut Interp, pid: nix::unistd::Pid) -> Result<i32, ExecError> {
    loop {
        match interp.system.wait(Some(pid), true)? {
            posh_env::system::WaitStatus::Exited(_, code) => return Ok(code),
            posh_env::system::WaitStatus::Signaled(_, signal) => return Ok(128 + signal as i32),
            posh_env::system::WaitStatus::Stopped(..) | posh_env::system::WaitStatus::StillRunning => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_syntax::ast::{Command, Pipeline, SimpleCommand};

    fn empty_command() -> std::rc::Rc<Command> {
        std::rc::Rc::new(Command::Simple(SimpleCommand {
            assigns: Vec::new(),
            words: Vec::new(),
            redirs: Vec::new(),
        }))
    }

    #[test]
    fn single_command_pipeline_runs_in_frame_without_forking() {
        let mut interp = crate::tests::test_interp();
        let pipeline = Pipeline {
            commands: vec![empty_command()],
            negation: false,
        };
        let flow = run(&mut interp, &pipeline).unwrap();
        assert_eq!(flow, ControlFlow::Normal);
        assert_eq!(interp.status(), 0);
    }
}
