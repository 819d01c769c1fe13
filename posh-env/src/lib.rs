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

//! Value stores, the frame/policy stack, and the host `System` abstraction
//! for a POSIX shell core.
//!
//! This crate owns everything spec.md calls "state": variables, positional
//! parameters, the fd table, traps, options, functions, aliases and jobs,
//! plus the [`frame`] module that nests them per construct and the
//! [`system`] module that abstracts over the real OS vs. an in-memory test
//! double. Parsing ([`posh_syntax`]) and the expander/executor that act on
//! this state (`posh-semantics`) are separate crates.

pub mod alias;
pub mod error;
pub mod fd;
pub mod frame;
pub mod function;
pub mod job;
pub mod option;
pub mod positional;
pub mod system;
pub mod trap;
pub mod variable;
