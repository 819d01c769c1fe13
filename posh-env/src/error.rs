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

//! Errors that can arise purely from store/frame bookkeeping (spec.md §7
//! "RuntimeError": fork/pipe/dup2 failure, and the read-only/non-catchable
//! rejections each store already reports on its own). Expansion-time and
//! execution-time errors (`ExpansionError`, `ExecError`, ...) belong to
//! `posh-semantics`, which is where those operations actually happen.

use crate::trap::NotCatchableError;
use crate::variable::ReadOnlyError;
use thiserror::Error;

/// Unifies this crate's store-level errors for callers that need one
/// `?`-able type rather than matching each store's own error.
#[derive(Clone, Debug, Error)]
pub enum EnvError {
    #[error(transparent)]
    ReadOnly(#[from] ReadOnlyError),

    #[error(transparent)]
    NotCatchable(#[from] NotCatchableError),

    #[error("system call failed: {0}")]
    System(#[from] nix::errno::Errno),
}
