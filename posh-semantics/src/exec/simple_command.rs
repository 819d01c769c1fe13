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

//! Simple command execution (spec.md §4.3 "Command resolution
//! precedence"): special builtin, function, regular builtin, external
//! program, in that order.
//!
//! The builtin *library* itself is out of scope (spec.md §1, §6): this
//! module only recognizes the four control-flow special builtins
//! (`break`, `continue`, `return`, `exit`), since they are the only
//! builtins whose effect (`ControlFlow`) nothing outside this crate can
//! express. Every other name that isn't a function or an external
//! program is "command not found".

use crate::error::ExecError;
use crate::exec::{redir, ControlFlow, Interp};
use crate::expand;
use posh_env::frame::FrameKind;
use posh_syntax::ast::SimpleCommand;

/// Runs one simple command: expand assignments and words, apply
/// redirections, then dispatch by name.
pub fn run(interp: &mut Interp, command: &SimpleCommand) -> Result<ControlFlow, ExecError> {
    let guard = redir::apply_scoped(interp, &command.redirs)?;
    let flow = run_inner(interp, command);
    guard.undo(interp);
    flow
}

fn run_inner(interp: &mut Interp, command: &SimpleCommand) -> Result<ControlFlow, ExecError> {
    if command.words.is_empty() {
        for assign in &command.assigns {
            assign_persistent(interp, assign)?;
        }
        interp.set_status(0);
        return Ok(ControlFlow::Normal);
    }

    let mut fields = expand::expand_words(interp, &command.words)?;
    let name = fields.remove(0).0;

    if let Some(flow) = control_flow_builtin(interp, &name, &fields) {
        return flow;
    }

    let guard = apply_temporary_assignments(interp, command)?;

    let flow = if let Some(function) = interp.frame.functions().borrow().get(&name).cloned() {
        crate::exec::function_call::run(interp, &function, &name, &fields)
    } else {
        run_external(interp, &name, &fields)
    };
    guard.restore(interp);
    flow
}

fn assign_persistent(interp: &mut Interp, assign: &posh_syntax::ast::Assign) -> Result<(), ExecError> {
    let value = expand::expand_assignment_value(interp, &assign.value)?;
    interp
        .frame
        .variables()
        .borrow_mut()
        .assign(assign.name.clone(), value, false, false)
        .map_err(crate::error::ExpansionError::from)?;
    Ok(())
}

/// Saved pre-assignment state for one variable, so an assignment-prefix
/// (spec.md §4.3: visible to the invoked command, not the shell
/// afterward) can be undone once that command returns.
struct TempAssign {
    name: String,
    previous: std::option::Option<posh_env::variable::Variable>,
}

struct TempAssignGuard {
    saved: Vec<TempAssign>,
}

impl TempAssignGuard {
    fn restore(self, interp: &mut Interp) {
        let mut variables = interp.frame.variables().borrow_mut();
        for TempAssign { name, previous } in self.saved.into_iter().rev() {
            match previous {
                Some(variable) => match variable.value {
                    Some(value) => {
                        let _ = variables.assign(name.clone(), value, false, false);
                        variables.export(&name, variable.is_exported);
                    }
                    None => variables.export(&name, variable.is_exported),
                },
                None => {
                    let _ = variables.unset(&name);
                }
            }
        }
    }
}

/// Applies `command`'s assignment-prefixes, always exported, for the
/// duration of the command this prefixes (spec.md §4.3: "as if `export`
/// were run for the duration of the command"), returning a guard that
/// restores each variable's prior state.
fn apply_temporary_assignments(interp: &mut Interp, command: &SimpleCommand) -> Result<TempAssignGuard, ExecError> {
    let mut saved = Vec::with_capacity(command.assigns.len());
    for assign in &command.assigns {
        let previous = interp.frame.variables().borrow().get(&assign.name).cloned();
        let value = expand::expand_assignment_value(interp, &assign.value)?;
        interp
            .frame
            .variables()
            .borrow_mut()
            .assign(assign.name.clone(), value, true, false)
            .map_err(crate::error::ExpansionError::from)?;
        saved.push(TempAssign { name: assign.name.clone(), previous });
    }
    Ok(TempAssignGuard { saved })
}

/// `break`/`continue`/`return`/`exit` (spec.md §4.3 "Control-flow
/// signalling"). Returns `None` when `name` isn't one of these, so the
/// caller falls through to function/external resolution.
fn control_flow_builtin(
    interp: &mut Interp,
    name: &str,
    args: &[crate::field::Field],
) -> std::option::Option<Result<ControlFlow, ExecError>> {
    let count = || args.first().and_then(|f| f.as_str().parse::<u32>().ok()).unwrap_or(1).max(1);
    let code = || {
        args.first()
            .and_then(|f| f.as_str().parse::<i32>().ok())
            .unwrap_or_else(|| interp.status())
    };
    match name {
        "break" => Some(Ok(ControlFlow::Break(count()))),
        "continue" => Some(Ok(ControlFlow::Continue(count()))),
        "return" => Some(Ok(ControlFlow::Return(code()))),
        "exit" => Some(Ok(ControlFlow::Exit(code()))),
        _ => None,
    }
}

fn run_external(interp: &mut Interp, name: &str, args: &[crate::field::Field]) -> Result<ControlFlow, ExecError> {
    let path = resolve_external(interp, name);
    let Some(path) = path else {
        return Err(ExecError::CommandNotFound(name.to_string()));
    };

    match interp.system.fork()? {
        posh_env::system::ForkResult::Child => {
            let argv = build_argv(name, args);
            let envp = build_envp(interp);
            let _ = interp.system.execve(&path, &argv, &envp);
            interp.system.exit(127);
        }
        posh_env::system::ForkResult::Parent(pid) => {
            let status = crate::exec::pipeline::wait_for(interp, pid)?;
            interp.set_status(status);
            Ok(ControlFlow::Normal)
        }
    }
}

fn resolve_external(interp: &mut Interp, name: &str) -> std::option::Option<unix_path::PathBuf> {
    if name.contains('/') {
        let path = unix_path::PathBuf::from(name);
        return interp.system.is_executable_file(&path).then_some(path);
    }

    let generation = interp.frame.variables().borrow().generation();
    if let Some(cached) = interp.command_cache.get(name, generation) {
        return Some(cached);
    }

    let path_var = interp.frame.variables().borrow().get("PATH").and_then(|v| match &v.value {
        Some(posh_env::variable::Value::Scalar(s)) => Some(s.clone()),
        _ => None,
    });
    let dirs: Vec<String> = match &path_var {
        Some(s) => s.split(':').map(str::to_string).collect(),
        None => vec![String::new()],
    };
    for dir in dirs {
        let candidate = if dir.is_empty() {
            unix_path::PathBuf::from(name)
        } else {
            unix_path::Path::new(&dir).join(name)
        };
        if interp.system.is_executable_file(&candidate) {
            interp.command_cache.insert(name, candidate.clone(), generation);
            return Some(candidate);
        }
    }
    None
}

fn build_argv(name: &str, args: &[crate::field::Field]) -> Vec<unix_str::UnixString> {
    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push(unix_str::UnixString::from_bytes(name.as_bytes().to_vec()));
    argv.extend(args.iter().map(|f| unix_str::UnixString::from_bytes(f.0.as_bytes().to_vec())));
    argv
}

fn build_envp(interp: &Interp) -> Vec<unix_str::UnixString> {
    interp
        .frame
        .variables()
        .borrow()
        .exported_sorted_iter()
        .filter_map(|(name, var)| {
            var.value
                .as_ref()
                .map(|v| unix_str::UnixString::from_bytes(format!("{name}={}", v.as_joined(' ')).into_bytes()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_syntax::ast::{Assign, AssignValue, Word};
    use posh_syntax::source::Location;
    use posh_syntax::token::{Part, PartKind, Quoting};

    fn literal_word(s: &str) -> Word {
        Word {
            parts: vec![Part {
                kind: PartKind::Literal(s.to_string()),
                quoting: Quoting::UNQUOTED,
                location: Location::dummy("test"),
            }],
            location: Location::dummy("test"),
        }
    }

    #[test]
    fn assignment_only_command_updates_the_current_frame() {
        let mut interp = crate::tests::test_interp();
        let command = SimpleCommand {
            assigns: vec![Assign { name: "x".into(), value: AssignValue::Scalar(literal_word("1")), location: Location::dummy("test") }],
            words: Vec::new(),
            redirs: Vec::new(),
        };
        run(&mut interp, &command).unwrap();
        assert_eq!(
            interp.frame.variables().borrow().get("x").unwrap().value,
            Some(posh_env::variable::Value::scalar("1"))
        );
    }

    #[test]
    fn break_with_no_args_signals_break_one() {
        let mut interp = crate::tests::test_interp();
        let command = SimpleCommand { assigns: Vec::new(), words: vec![literal_word("break")], redirs: Vec::new() };
        let flow = run(&mut interp, &command).unwrap();
        assert_eq!(flow, ControlFlow::Break(1));
    }

    #[test]
    fn exit_with_explicit_code() {
        let mut interp = crate::tests::test_interp();
        let command = SimpleCommand { assigns: Vec::new(), words: vec![literal_word("exit"), literal_word("3")], redirs: Vec::new() };
        let flow = run(&mut interp, &command).unwrap();
        assert_eq!(flow, ControlFlow::Exit(3));
    }

    #[test]
    fn unknown_command_is_not_found() {
        let mut interp = crate::tests::test_interp();
        let command = SimpleCommand { assigns: Vec::new(), words: vec![literal_word("nope")], redirs: Vec::new() };
        let err = run(&mut interp, &command).unwrap_err();
        assert!(matches!(err, ExecError::CommandNotFound(n) if n == "nope"));
    }
}
