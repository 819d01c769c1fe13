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

//! Error types for word expansion and execution (spec.md §7 "Error
//! handling design"). Kept separate from [`posh_env::error::EnvError`],
//! which only covers store/frame bookkeeping, since these arise from
//! actually interpreting a command.

use posh_syntax::source::Location;
use thiserror::Error;

/// An error raised while expanding a word (spec.md §4.2).
#[derive(Clone, Debug, Error)]
pub enum ExpansionError {
    #[error("{name}: parameter not set")]
    Unset { name: String },

    #[error("{message}")]
    Explicit { message: String },

    #[error(transparent)]
    ReadOnly(#[from] posh_env::variable::ReadOnlyError),

    #[error("{0}")]
    Arith(String),

    #[error("ambiguous redirect: expansion produced more than one field")]
    AmbiguousRedirect,

    #[error("command substitution failed: {0}")]
    System(#[from] nix::errno::Errno),
}

/// An error raised while executing a command (spec.md §4.3, §7
/// "RuntimeError").
#[derive(Clone, Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Expansion(#[from] ExpansionError),

    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("{construct}: {message}")]
    Redirection { construct: String, message: String },

    #[error("{0}: not in a loop")]
    NotInLoop(String),

    #[error("return: not in a function or dot script")]
    NotInFunctionOrScript,

    #[error(transparent)]
    Env(#[from] posh_env::error::EnvError),

    #[error(transparent)]
    System(#[from] nix::errno::Errno),
}

impl ExecError {
    /// Diagnostic location, when the error originates at a specific point
    /// in the source (spec.md §7: errors are reported with a location
    /// when one is available).
    #[must_use]
    pub fn location(&self) -> std::option::Option<&Location> {
        None
    }
}
