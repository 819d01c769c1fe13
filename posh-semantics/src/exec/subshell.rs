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

//! `( list )` (spec.md §4.3 "Subshell"): forks, runs `list` in a
//! [`FrameKind::Subshell`] child frame with COPY-scoped stores, and maps
//! the child's outcome back to a plain exit status the same way a real
//! `waitpid` would.

use crate::error::ExecError;
use crate::exec::{pipeline, ControlFlow, Interp};
use posh_env::frame::FrameKind;
use posh_syntax::ast::List;

pub fn run(interp: &mut Interp, list: &List) -> Result<ControlFlow, ExecError> {
    match interp.system.fork()? {
        posh_env::system::ForkResult::Child => {
            let list = list.clone();
            let outcome = interp.with_child_frame(FrameKind::Subshell, None, |interp| interp.exec_list(&list));
            let status = match outcome {
                Ok(ControlFlow::Exit(code) | ControlFlow::Return(code)) => code,
                Ok(_) => interp.status(),
                Err(_) => 127,
            };
            let _ = crate::trap_dispatch::run_exit_trap(interp);
            interp.system.exit(status);
        }
        posh_env::system::ForkResult::Parent(pid) => {
            let status = pipeline::wait_for(interp, pid)?;
            interp.set_status(status);
            Ok(ControlFlow::Normal)
        }
    }
}

// No unit tests here: `VirtualSystem::wait` always reports
// `StillRunning` (SPEC_FULL.md §10), so the parent branch above would
// spin forever under the test double, the same limitation noted on
// `expand::command_subst` and `pipeline::run_forked`'s multi-command path.
