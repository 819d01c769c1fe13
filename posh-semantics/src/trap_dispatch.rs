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

//! Trap dispatcher (spec.md §4.5 "Trap dispatcher", §9 "Global state").
//!
//! A platform signal handler takes no user context and may only touch
//! `sig_atomic_t`-sized state, so the pending-signal record here is a
//! single process-wide bitmask, written only by [`mark_pending`] and
//! read cooperatively by [`poll`] at the safe points spec.md names:
//! between AST nodes, around blocking waits, and after each redirection
//! restore. `posh_env::system::real::RealSystem`'s own `Catch`
//! disposition installs a no-op handler for exactly this reason — the
//! handler that actually flips a bit is [`install_catching_handler`]
//! below, installed directly with `nix::sys::signal::sigaction` rather
//! than routed back through the `System` trait, since the trait has no
//! way to hand back a `Box<dyn FnMut>` to an `extern "C"` callback.
//!
//! [`run_action`] parses the trap body with
//! [`crate::reentrant::parse_simple_command_sequence`] and runs it with
//! [`Interp::exec_list`] directly in the current process — no fork, no
//! separate program. This is required, not just convenient: `dispatch`
//! and `run_exit_trap` both already push the trap's
//! [`FrameKind::Trap`] child frame, whose policy SHARE-scopes variables,
//! functions and traps with the invoking frame (spec.md §4.5: the
//! action runs "as if read from input" in the shell's own frame), so
//! `x=1; trap 'echo $x' EXIT` must see `x`, and a trap that itself
//! assigns a variable must have that assignment visible to the rest of
//! the running shell once the trap returns. Forking (as
//! `expand::command_subst` does) would isolate any such effect in a
//! child the parent can never observe again.

use crate::error::ExecError;
use crate::exec::{ControlFlow, Interp};
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use posh_env::frame::FrameKind;
use posh_env::trap::Action;
use posh_syntax::source::Source;
use std::sync::atomic::{AtomicU64, Ordering};

/// Signals with a bit set here have been delivered and not yet dispatched.
static PENDING_MASK: AtomicU64 = AtomicU64::new(0);

/// Signals currently inside their own trap action, blocking recursive
/// entry (spec.md §4.5: "recursive entry on the same signal is blocked").
static HANDLING_MASK: AtomicU64 = AtomicU64::new(0);

fn bit_of(signal: Signal) -> u64 {
    1u64 << (signal as i32 - 1)
}

/// The real signal handler: records `signum` as pending and returns
/// immediately. Async-signal-safe, since a `fetch_or` on a static
/// `AtomicU64` is the only thing it does.
extern "C" fn mark_pending(signum: libc::c_int) {
    if (1..=64).contains(&signum) {
        PENDING_MASK.fetch_or(1u64 << (signum - 1), Ordering::SeqCst);
    }
}

/// Installs the real pending-flag handler for `signal`. Call this
/// whenever a `trap` command configures a `Command` or bare-catch
/// action for `signal`; a `trap '' SIG` (ignore) or reset-to-default
/// instead goes through `System::sigaction` directly, since those
/// dispositions don't need cooperative polling.
pub fn install_catching_handler(signal: Signal) -> nix::Result<()> {
    let action = SigAction::new(SigHandler::Handler(mark_pending), SaFlags::SA_RESTART, SigSet::empty());
    // SAFETY: `mark_pending` only performs one atomic fetch_or on a
    // static, which is async-signal-safe.
    unsafe { signal::sigaction(signal, &action) }.map(|_| ())
}

/// Runs the action of every signal that has fired since the last poll
/// (spec.md §4.5's safe-point check), most-recently-added first.
/// Returns as soon as a trap body yields non-`Normal` control flow (a
/// `break`/`continue`/`return`/`exit` inside the trap action).
pub fn poll(interp: &mut Interp) -> Result<ControlFlow, ExecError> {
    loop {
        let mask = PENDING_MASK.load(Ordering::SeqCst);
        let Some(signal) = next_pending(mask) else {
            return Ok(ControlFlow::Normal);
        };
        PENDING_MASK.fetch_and(!bit_of(signal), Ordering::SeqCst);
        let flow = dispatch(interp, signal)?;
        if flow != ControlFlow::Normal {
            return Ok(flow);
        }
    }
}

fn next_pending(mask: u64) -> std::option::Option<Signal> {
    (1..=64).find(|n| mask & (1u64 << (n - 1)) != 0).and_then(|n| Signal::try_from(n).ok())
}

fn dispatch(interp: &mut Interp, signal: Signal) -> Result<ControlFlow, ExecError> {
    if HANDLING_MASK.load(Ordering::SeqCst) & bit_of(signal) != 0 {
        return Ok(ControlFlow::Normal);
    }
    let Some(trap) = interp.frame.traps().borrow().get_signal(signal).cloned() else {
        return Ok(ControlFlow::Normal);
    };
    let Action::Command(body) = trap.action else {
        return Ok(ControlFlow::Normal);
    };

    HANDLING_MASK.fetch_or(bit_of(signal), Ordering::SeqCst);
    let result = interp.with_child_frame(FrameKind::Trap, None, |interp| run_action(interp, &body));
    HANDLING_MASK.fetch_and(!bit_of(signal), Ordering::SeqCst);
    result
}

/// Runs the shell's `EXIT` pseudo-trap (spec.md §3 "The EXIT
/// pseudo-signal (number 0) is stored separately", §4.5 "invoked once,
/// on normal shell termination"). Callers are every frame kind whose
/// policy sets `exit_trap_runs` (top-level, subshell, background,
/// pipeline member), immediately before the process-terminating exit
/// (or, for top-level, before the interpreter returns).
pub fn run_exit_trap(interp: &mut Interp) -> Result<(), ExecError> {
    let Action::Command(body) = interp.frame.traps().borrow().exit().action.clone() else {
        return Ok(());
    };
    interp.with_child_frame(FrameKind::Trap, None, |interp| run_action(interp, &body))?;
    Ok(())
}

/// Parses `body` and runs it with [`Interp::exec_list`] in the caller's
/// current frame (the already-pushed `FrameKind::Trap` child). See this
/// module's doc comment for why this must not fork.
fn run_action(interp: &mut Interp, body: &str) -> Result<ControlFlow, ExecError> {
    let source = Source::Trap {
        parent: Box::new(posh_syntax::source::Location::dummy(body)),
    };
    let list = crate::reentrant::parse_simple_command_sequence(source, body)?;
    interp.exec_list(&list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_of_maps_signal_one_to_the_low_bit() {
        assert_eq!(bit_of(Signal::SIGHUP), 1);
    }

    #[test]
    fn poll_is_a_no_op_when_nothing_is_pending() {
        let mut interp = crate::tests::test_interp();
        let flow = poll(&mut interp).unwrap();
        assert_eq!(flow, ControlFlow::Normal);
    }

    #[test]
    fn run_exit_trap_is_a_no_op_when_no_exit_trap_is_set() {
        let mut interp = crate::tests::test_interp();
        run_exit_trap(&mut interp).unwrap();
        assert_eq!(interp.status(), 0);
    }

    #[test]
    fn dispatch_skips_a_signal_with_no_configured_trap() {
        let mut interp = crate::tests::test_interp();
        let flow = dispatch(&mut interp, Signal::SIGUSR1).unwrap();
        assert_eq!(flow, ControlFlow::Normal);
    }

    #[test]
    fn exit_trap_reads_and_mutates_unexported_variables_in_place() {
        use posh_env::variable::Value;

        let mut interp = crate::tests::test_interp();
        interp
            .frame
            .variables()
            .borrow_mut()
            .assign("x", Value::Scalar("1".into()), false, false)
            .unwrap();
        interp.frame.traps().borrow_mut().set_exit(Action::Command("y=$x".into()));

        run_exit_trap(&mut interp).unwrap();

        let vars = interp.frame.variables().borrow();
        assert_eq!(vars.get("y").and_then(|v| v.value.as_ref()), Some(&Value::Scalar("1".into())));
    }
}
