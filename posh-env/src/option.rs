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

//! Shell option state (spec.md §4.3 "set -e (errexit)" and its siblings).
//!
//! [`OptionSet`] only tracks whether each option is on or off; applying the
//! resulting behavior (e.g. actually aborting on errexit) is the
//! executor's job.

use enumset::{EnumSet, EnumSetType};
use std::fmt;
use std::ops::Not;

/// State of an option.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum State {
    On,
    Off,
}

pub use State::{Off, On};

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            On => "on",
            Off => "off",
        })
    }
}

impl Not for State {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            On => Off,
            Off => On,
        }
    }
}

/// A shell option named by the `set`/`set -o` family (SPEC_FULL.md §4.3).
#[derive(Clone, Copy, Debug, EnumSetType, Hash)]
#[enumset(no_super_impls)]
pub enum Option {
    AllExport,
    ErrExit,
    IgnoreEof,
    Monitor,
    NoClobber,
    NoExec,
    NoGlob,
    NoUnset,
    PipeFail,
    Verbose,
    Vi,
    XTrace,
}

pub use self::Option::{
    AllExport, ErrExit, IgnoreEof, Monitor, NoClobber, NoExec, NoGlob, NoUnset, PipeFail, Verbose,
    Vi, XTrace,
};

impl Option {
    /// The option's long name as used by `set -o name`.
    #[must_use]
    pub fn long_name(self) -> &'static str {
        match self {
            AllExport => "allexport",
            ErrExit => "errexit",
            IgnoreEof => "ignoreeof",
            Monitor => "monitor",
            NoClobber => "noclobber",
            NoExec => "noexec",
            NoGlob => "noglob",
            NoUnset => "nounset",
            PipeFail => "pipefail",
            Verbose => "verbose",
            Vi => "vi",
            XTrace => "xtrace",
        }
    }

    /// The short option letter used on the command line or by `set -X`,
    /// if this option has one (`pipefail` does not).
    #[must_use]
    pub fn short_letter(self) -> std::option::Option<char> {
        match self {
            AllExport => Some('a'),
            ErrExit => Some('e'),
            NoClobber => Some('C'),
            NoExec => Some('n'),
            NoGlob => Some('f'),
            NoUnset => Some('u'),
            Verbose => Some('v'),
            XTrace => Some('x'),
            Monitor | IgnoreEof | PipeFail | Vi => None,
        }
    }
}

/// The set of options that are currently on.
///
/// Off is the default for every option (spec.md's POSIX baseline); on
/// a freshly created top-level frame, the executor is responsible for
/// turning on whatever the CLI's `-o`/short-flag arguments ask for.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OptionSet(EnumSet<Option>);

impl OptionSet {
    #[must_use]
    pub fn new() -> Self {
        OptionSet(EnumSet::new())
    }

    #[must_use]
    pub fn get(&self, option: Option) -> State {
        if self.0.contains(option) {
            On
        } else {
            Off
        }
    }

    pub fn set(&mut self, option: Option, state: State) {
        match state {
            On => {
                self.0.insert(option);
            }
            Off => {
                self.0.remove(option);
            }
        }
    }

    #[must_use]
    pub fn is_on(&self, option: Option) -> bool {
        self.get(option) == On
    }

    /// Iterates over every option and its current state, in a stable
    /// order, for `set -o`/`set +o` listing.
    pub fn iter(&self) -> impl Iterator<Item = (Option, State)> + '_ {
        EnumSet::<Option>::all()
            .iter()
            .map(move |o| (o, self.get(o)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all_off() {
        let options = OptionSet::new();
        assert_eq!(options.get(ErrExit), Off);
        assert_eq!(options.get(PipeFail), Off);
    }

    #[test]
    fn set_and_get_roundtrip() {
        let mut options = OptionSet::new();
        options.set(ErrExit, On);
        assert!(options.is_on(ErrExit));
        options.set(ErrExit, Off);
        assert!(!options.is_on(ErrExit));
    }

    #[test]
    fn not_flips_state() {
        assert_eq!(!On, Off);
        assert_eq!(!Off, On);
    }
}
