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

//! Word expansion, executor and trap dispatch semantics for a
//! POSIX-conformant shell core (spec.md §4.2, §4.3, §4.5).

pub mod command_cache;
pub mod error;
pub mod exec;
pub mod expand;
pub mod field;
mod reentrant;
pub mod trap_dispatch;

#[cfg(test)]
pub(crate) mod tests {
    use crate::exec::Interp;
    use posh_env::frame::Frame;
    use posh_env::system::virtual_::VirtualSystem;

    /// A minimal top-level [`Interp`] over a fresh [`VirtualSystem`], for
    /// expander/executor unit tests that don't care about inherited
    /// environment or argv.
    #[must_use]
    pub(crate) fn test_interp() -> Interp {
        let frame = Frame::new_top_level(
            "posh",
            Vec::new(),
            std::iter::empty::<(String, String)>(),
            unix_path::PathBuf::from("/"),
        );
        Interp::new(frame, Box::new(VirtualSystem::new()))
    }
}
