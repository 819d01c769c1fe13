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

//! The executor (spec.md §4.3). [`Interp`] is the running interpreter:
//! the current [`Frame`] plus the [`System`] handle it drives, threaded
//! through every node-dispatch function in this module's children.

pub mod compound;
pub mod function_call;
pub mod pipeline;
pub mod redir;
pub mod simple_command;
pub mod subshell;

use crate::command_cache::CommandCache;
use crate::error::ExecError;
use nix::unistd::Pid;
use posh_env::frame::{Frame, FrameKind};
use posh_syntax::ast::{AndOr, AndOrList, Command, Item, List, Pipeline};
use std::rc::Rc;

/// Tagged result of executing a node (spec.md §4.3 "Control-flow
/// signalling"). `Normal` carries no payload of its own; the resulting
/// exit status is always left in `interp.frame.last_exit_status()`.
/// `Error` is represented by `Result::Err` instead of a variant here, and
/// `NotImpl` does not apply since every AST node kind is handled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ControlFlow {
    Normal,
    Break(u32),
    Continue(u32),
    Return(i32),
    Exit(i32),
}

/// The running interpreter: current frame and host handle.
pub struct Interp {
    pub frame: Rc<Frame>,
    pub system: Box<dyn posh_env::system::System>,
    pub command_cache: CommandCache,
    /// `$!`: the pid of the most recently started asynchronous list.
    pub last_async_pid: std::option::Option<Pid>,
    /// The exit status of the most recently completed command
    /// substitution, consulted by a handful of expansions (spec.md §4.2)
    /// that report it separately from `$?` since a substitution nested
    /// inside a larger word must not clobber the enclosing command's
    /// status.
    pub last_command_subst_status: std::option::Option<i32>,
    /// The shell's job table (spec.md §3 "Job"). Lives on `Interp`
    /// rather than `Frame`: a job table is process-wide state, and a
    /// `fork`'d subshell or pipeline member gets its own copy of this
    /// whole struct for free, the same way the real OS gives it a fresh
    /// process rather than a nested scope.
    pub jobs: posh_env::job::JobStore,
    /// Depth of "condition of if/while/until" or "left of &&/||" nesting
    /// currently being evaluated, where `set -e` must not fire (spec.md
    /// §4.3 "set -e (errexit)"). Incremented/decremented by
    /// [`compound`]'s condition evaluators.
    errexit_suppressed: u32,
}

impl Interp {
    #[must_use]
    pub fn new(frame: Frame, system: Box<dyn posh_env::system::System>) -> Self {
        Interp {
            frame: Rc::new(frame),
            system,
            command_cache: CommandCache::new(),
            last_async_pid: None,
            last_command_subst_status: None,
            jobs: posh_env::job::JobStore::new(),
            errexit_suppressed: 0,
        }
    }

    /// Pushes a child frame of `kind`, running `body` with it current,
    /// then restores the parent frame and (if the policy calls for it)
    /// propagates the child's exit status into the parent's `$?`.
    pub fn with_child_frame<R>(
        &mut self,
        kind: FrameKind,
        call_args: std::option::Option<Vec<String>>,
        body: impl FnOnce(&mut Interp) -> R,
    ) -> R {
        let parent = Rc::clone(&self.frame);
        self.frame = Rc::new(Frame::new_child(&parent, kind, call_args));
        let affects_parent = self.frame.policy().affects_parent_status;
        let result = body(self);
        let status = self.frame.last_exit_status();
        self.frame = parent;
        if affects_parent {
            self.set_status(status);
        }
        result
    }

    /// Runs `body` with errexit suppressed for its duration (spec.md
    /// §4.3: conditions of `if`/`while`/`until` and the non-final member
    /// of an AND/OR list never trigger `set -e`).
    pub fn with_errexit_suppressed<R>(&mut self, body: impl FnOnce(&mut Interp) -> R) -> R {
        self.errexit_suppressed += 1;
        let result = body(self);
        self.errexit_suppressed -= 1;
        result
    }

    /// Sets `$?` on the current frame.
    ///
    /// `Frame`'s stores are `Rc<RefCell<_>>` but `last_exit_status` is a
    /// plain field, so mutating it requires either unique ownership of
    /// the `Rc<Frame>` or rebuilding it; since nothing else holds a
    /// clone of `self.frame` while it is current, `Rc::get_mut` always
    /// succeeds in practice, with the rebuild as a defensive fallback.
    pub fn set_status(&mut self, status: i32) {
        if let Some(frame) = Rc::get_mut(&mut self.frame) {
            frame.set_last_exit_status(status);
        } else {
            let mut frame = (*self.frame).clone();
            frame.set_last_exit_status(status);
            self.frame = Rc::new(frame);
        }
    }

    #[must_use]
    pub fn status(&self) -> i32 {
        self.frame.last_exit_status()
    }

    /// Runs a [`List`] (spec.md §4.3 "command list").
    pub fn exec_list(&mut self, list: &List) -> Result<ControlFlow, ExecError> {
        for item in &list.0 {
            let flow = self.exec_item(item)?;
            if flow != ControlFlow::Normal {
                return Ok(flow);
            }
            // A safe point between AST nodes (spec.md §4.5).
            let flow = crate::trap_dispatch::poll(self)?;
            if flow != ControlFlow::Normal {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::Normal)
    }

    fn exec_item(&mut self, item: &Item) -> Result<ControlFlow, ExecError> {
        if item.is_async {
            self.exec_background(&item.and_or)
        } else {
            self.exec_and_or_list(&item.and_or)
        }
    }

    /// `list &`: starts the list without waiting for it (spec.md §4.4
    /// "Background"). The exit status of an asynchronous list is always
    /// zero, per POSIX, regardless of what the backgrounded list does.
    fn exec_background(&mut self, and_or: &AndOrList) -> Result<ControlFlow, ExecError> {
        match self.system.fork()? {
            posh_env::system::ForkResult::Child => {
                let and_or = and_or.clone();
                let outcome = self.with_child_frame(FrameKind::Background, None, |interp| {
                    interp.exec_and_or_list(&and_or)
                });
                let status = match outcome {
                    Ok(ControlFlow::Exit(code) | ControlFlow::Return(code)) => code,
                    Ok(_) => self.status(),
                    Err(_) => 127,
                };
                let _ = crate::trap_dispatch::run_exit_trap(self);
                self.system.exit(status);
            }
            posh_env::system::ForkResult::Parent(pid) => {
                let _ = self.system.setpgid(pid, pid);
                self.last_async_pid = Some(pid);
                self.jobs.set_last_async_pid(pid);
                self.jobs.add(pid, vec![posh_env::job::JobProcess::new(pid, "")]);
                self.set_status(0);
                Ok(ControlFlow::Normal)
            }
        }
    }

    pub fn exec_and_or_list(&mut self, list: &AndOrList) -> Result<ControlFlow, ExecError> {
        let flow = self.exec_pipeline(&list.first, list.rest.is_empty())?;
        if flow != ControlFlow::Normal {
            return Ok(flow);
        }
        let mut status = self.status();
        for (index, (connective, pipeline)) in list.rest.iter().enumerate() {
            let run = match connective {
                AndOr::AndThen => status == 0,
                AndOr::OrElse => status != 0,
            };
            if !run {
                continue;
            }
            let is_last = index + 1 == list.rest.len();
            let flow = self.exec_pipeline(pipeline, is_last)?;
            if flow != ControlFlow::Normal {
                return Ok(flow);
            }
            status = self.status();
        }
        Ok(ControlFlow::Normal)
    }

    fn exec_pipeline(&mut self, pipeline: &Pipeline, is_final_in_list: bool) -> Result<ControlFlow, ExecError> {
        let flow = crate::exec::pipeline::run(self, pipeline)?;
        if flow != ControlFlow::Normal {
            return Ok(flow);
        }
        let raw = self.status();
        let reported = if pipeline.negation { i32::from(raw == 0) } else { raw };
        self.set_status(reported);
        if is_final_in_list {
            if let Some(flow) = self.maybe_errexit(reported) {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::Normal)
    }

    /// Runs one [`Command`] (the unit a [`Pipeline`] is made of).
    pub fn exec_command(&mut self, command: &Command) -> Result<ControlFlow, ExecError> {
        match command {
            Command::Simple(simple) => simple_command::run(self, simple),
            Command::Compound(full) => compound::run(self, full),
            Command::Function(def) => {
                self.frame
                    .functions()
                    .borrow_mut()
                    .define(def.name.clone(), Rc::new(def.clone()));
                self.set_status(0);
                Ok(ControlFlow::Normal)
            }
        }
    }

    /// `set -e`: turns a nonzero status into an `Exit` signal, unless
    /// errexit is off, disabled by the current frame's policy (trap
    /// bodies), or suppressed by an enclosing condition/AND-OR context.
    fn maybe_errexit(&mut self, status: i32) -> std::option::Option<ControlFlow> {
        if status == 0 || self.errexit_suppressed > 0 {
            return None;
        }
        let errexit_on = self.frame.options().borrow().is_on(posh_env::option::ErrExit);
        if errexit_on && self.frame.policy().errexit_enabled {
            Some(ControlFlow::Exit(status))
        } else {
            None
        }
    }
}
