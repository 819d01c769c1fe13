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

//! Trap actions (spec.md §3 "Trap action", §4.5 "Trap dispatcher").

use nix::sys::signal::Signal;
use std::collections::BTreeMap;
use thiserror::Error;

/// What a trap condition should do when it fires.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Action {
    /// No action configured; the platform default disposition applies.
    Default,
    /// The condition is ignored (`trap '' COND`).
    Ignore,
    /// Run this command string as if read from input (`trap 'cmd' COND`).
    Command(String),
}

/// One trap entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trap {
    pub action: Action,
}

impl Trap {
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self.action, Action::Ignore)
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self.action, Action::Default)
    }
}

impl Default for Trap {
    fn default() -> Self {
        Trap {
            action: Action::Default,
        }
    }
}

/// Non-catchable signals rejected by [`TrapSet::set_signal`] (spec.md §3
/// "Non-catchable signals (KILL, STOP) are rejected at set time").
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{signal}: cannot catch, ignore or block this signal")]
pub struct NotCatchableError {
    pub signal: Signal,
}

/// The set of configured traps for one frame.
///
/// The `EXIT` pseudo-condition (spec.md's "pseudo-signal (number 0)") is
/// stored apart from real signals since it never corresponds to a platform
/// disposition.
#[derive(Clone, Debug, Default)]
pub struct TrapSet {
    signals: BTreeMap<Signal, Trap>,
    exit: Trap,
}

const NOT_CATCHABLE: [Signal; 2] = [Signal::SIGKILL, Signal::SIGSTOP];

impl TrapSet {
    #[must_use]
    pub fn new() -> Self {
        TrapSet::default()
    }

    pub fn set_signal(&mut self, signal: Signal, action: Action) -> Result<(), NotCatchableError> {
        if NOT_CATCHABLE.contains(&signal) {
            return Err(NotCatchableError { signal });
        }
        self.signals.insert(signal, Trap { action });
        Ok(())
    }

    #[must_use]
    pub fn get_signal(&self, signal: Signal) -> std::option::Option<&Trap> {
        self.signals.get(&signal)
    }

    pub fn set_exit(&mut self, action: Action) {
        self.exit = Trap { action };
    }

    #[must_use]
    pub fn exit(&self) -> &Trap {
        &self.exit
    }

    /// Resets every non-ignored trap to [`Action::Default`] (spec.md §4.4
    /// "traps.resets_non_ignored": subshell and background frames).
    /// Ignored traps (`trap '' SIG`) are preserved, per POSIX.
    pub fn reset_non_ignored(&mut self) {
        for trap in self.signals.values_mut() {
            if !trap.is_ignored() {
                trap.action = Action::Default;
            }
        }
        if !self.exit.is_ignored() {
            self.exit.action = Action::Default;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Signal, &Trap)> {
        self.signals.iter().map(|(&s, t)| (s, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_and_stop_are_rejected() {
        let mut traps = TrapSet::new();
        assert!(traps
            .set_signal(Signal::SIGKILL, Action::Ignore)
            .is_err());
        assert!(traps
            .set_signal(Signal::SIGSTOP, Action::Ignore)
            .is_err());
    }

    #[test]
    fn reset_non_ignored_preserves_ignored_traps() {
        let mut traps = TrapSet::new();
        traps.set_signal(Signal::SIGINT, Action::Ignore).unwrap();
        traps
            .set_signal(Signal::SIGTERM, Action::Command("echo bye".into()))
            .unwrap();
        traps.reset_non_ignored();
        assert!(traps.get_signal(Signal::SIGINT).unwrap().is_ignored());
        assert!(traps.get_signal(Signal::SIGTERM).unwrap().is_default());
    }
}
