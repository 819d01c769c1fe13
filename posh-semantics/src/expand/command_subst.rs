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

//! Command substitution (spec.md §4.2 "`$(...)`/backquoted form: run in a
//! subshell, capture stdout, strip trailing newlines").
//!
//! The body is run by *this* crate's own executor, inside a forked child
//! that never `exec`s a different program: a fresh [`FrameKind::Subshell`]
//! frame is pushed and [`Interp::exec_list`] walks the re-lexed body
//! directly in that child process. Forking still isolates the
//! substitution as its own subshell (POSIX requires a substitution not
//! affect the calling shell's variables or cwd), but since `fork` only
//! duplicates the process image rather than replacing it, every
//! unexported variable, function and alias the calling shell knows about
//! is automatically visible to the substituted command with no envp
//! serialization at all — the same property the teacher's
//! `yash-semantics/src/expansion/initial/command_subst.rs` gets from
//! forking and then calling its own `read_eval_loop` in-process, which
//! this is grounded on. Turning the raw body text into something
//! [`Interp::exec_list`] can run goes through
//! [`crate::reentrant::parse_simple_command_sequence`]; see that module
//! for the bounded grammar it accepts.

use crate::error::ExpansionError;
use crate::exec::{ControlFlow, Interp};
use crate::field::{all_unquoted, MarkedText};
use posh_env::frame::FrameKind;
use posh_syntax::source::{Location, Source};

const READ_CHUNK: usize = 4096;

/// Runs `body` as a shell command, capturing its standard output with
/// trailing newlines removed. `location` is the command substitution
/// part's own source location, carried along as the parent of the
/// re-lexed body's [`Source::CommandSubstitution`] tag.
pub fn expand(interp: &mut Interp, body: &str, location: &Location) -> Result<MarkedText, ExpansionError> {
    let (reader, writer) = interp.system.pipe()?;

    match interp.system.fork()? {
        posh_env::system::ForkResult::Child => {
            let _ = interp.system.close(reader);
            if writer != 1 {
                if interp.system.dup2(writer, 1).is_ok() {
                    let _ = interp.system.close(writer);
                }
            }
            let source = Source::CommandSubstitution {
                parent: Box::new(location.clone()),
            };
            let outcome = crate::reentrant::parse_simple_command_sequence(source, body)
                .map_err(crate::error::ExecError::from)
                .and_then(|list| interp.with_child_frame(FrameKind::Subshell, None, |interp| interp.exec_list(&list)));
            let status = match outcome {
                Ok(ControlFlow::Exit(code) | ControlFlow::Return(code)) => code,
                Ok(_) => interp.status(),
                Err(_) => 127,
            };
            let _ = crate::trap_dispatch::run_exit_trap(interp);
            interp.system.exit(status);
        }
        posh_env::system::ForkResult::Parent(pid) => {
            let _ = interp.system.close(writer);
            let mut output = Vec::new();
            let mut buf = [0u8; READ_CHUNK];
            loop {
                match interp.system.read(reader, &mut buf) {
                    Ok(0) => break,
                    Ok(n) => output.extend_from_slice(&buf[..n]),
                    Err(nix::errno::Errno::EINTR) => continue,
                    Err(e) => return Err(ExpansionError::System(e)),
                }
            }
            let _ = interp.system.close(reader);

            let mut status = 0;
            loop {
                match interp.system.wait(Some(pid), true)? {
                    posh_env::system::WaitStatus::Exited(_, code) => {
                        status = code;
                        break;
                    }
                    posh_env::system::WaitStatus::Signaled(_, signal) => {
                        status = 128 + signal as i32;
                        break;
                    }
                    posh_env::system::WaitStatus::Stopped(..) | posh_env::system::WaitStatus::StillRunning => {
                        continue;
                    }
                }
            }
            interp.last_command_subst_status = Some(status);

            let mut text = String::from_utf8_lossy(&output).into_owned();
            let trimmed_len = text.trim_end_matches('\n').len();
            text.truncate(trimmed_len);
            Ok(all_unquoted(&text))
        }
    }
}
