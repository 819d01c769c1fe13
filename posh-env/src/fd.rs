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

//! The file-descriptor table (spec.md §3 "Fd table entry", §4.3
//! "Redirection engine").
//!
//! The table does not own actual OS file descriptors; it is bookkeeping
//! the executor consults to decide where to save/restore across a
//! redirection, while [`crate::system::System`] performs the real
//! `dup2`/`open`/`close` calls.

use bitflags::bitflags;
use posh_syntax::ast::Fd;
use std::collections::BTreeMap;

bitflags! {
    /// Flags on one [`FdEntry`] (spec.md §3 "Fd table entry").
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct FdFlags: u8 {
        /// This fd currently holds a redirection target, not its
        /// original destination.
        const REDIRECTED = 1 << 0;
        /// This entry is a saved copy of another fd's original target,
        /// to be restored and then closed when the redirection's scope
        /// ends.
        const SAVE_COPY  = 1 << 1;
        /// Close-on-exec: set on every save-copy fd so external programs
        /// never inherit it (spec.md §5 "Fd hygiene").
        const CLOEXEC    = 1 << 2;
        /// The fd is currently open at the OS level.
        const OPEN       = 1 << 3;
    }
}

/// One file descriptor's bookkeeping entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FdEntry {
    pub fd: Fd,
    pub flags: FdFlags,
    /// Path the fd was opened from, if it was a file redirection (used
    /// only for diagnostics; the OS fd itself is the source of truth).
    pub backing_path: std::option::Option<String>,
    /// For a save-copy entry, the fd number whose original target this
    /// one preserves.
    pub original_of: std::option::Option<Fd>,
}

impl FdEntry {
    #[must_use]
    pub fn open(fd: Fd) -> Self {
        FdEntry {
            fd,
            flags: FdFlags::OPEN,
            backing_path: None,
            original_of: None,
        }
    }
}

/// The fd table: a sparse, ordered map from fd number to entry.
///
/// Invariant (spec.md §3): the table records the highest live fd so a
/// save-copy's slot can be picked without a linear scan.
#[derive(Clone, Debug, Default)]
pub struct FdTable {
    entries: BTreeMap<i32, FdEntry>,
}

impl FdTable {
    #[must_use]
    pub fn new() -> Self {
        FdTable::default()
    }

    #[must_use]
    pub fn get(&self, fd: Fd) -> std::option::Option<&FdEntry> {
        self.entries.get(&fd.0)
    }

    pub fn insert(&mut self, entry: FdEntry) {
        self.entries.insert(entry.fd.0, entry);
    }

    pub fn remove(&mut self, fd: Fd) -> std::option::Option<FdEntry> {
        self.entries.remove(&fd.0)
    }

    #[must_use]
    pub fn highest_live_fd(&self) -> std::option::Option<Fd> {
        self.entries
            .keys()
            .next_back()
            .copied()
            .map(Fd)
    }

    /// The first unused fd number at or above `min` (spec.md §4.3:
    /// "saved to a high-numbered fd (first free at >= 10)").
    #[must_use]
    pub fn first_free_at_or_above(&self, min: i32) -> Fd {
        let mut candidate = min;
        while self.entries.contains_key(&candidate) {
            candidate += 1;
        }
        Fd(candidate)
    }

    /// Lowest fd number at or above `min` the table considers used,
    /// ignoring any value already claimed by `self`; used by `n<&m`/
    /// `n>&m` default-target selection and by the deep-COPY clone for
    /// a subshell frame.
    pub fn iter(&self) -> impl Iterator<Item = &FdEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_free_skips_used_fds() {
        let mut table = FdTable::new();
        table.insert(FdEntry::open(Fd(10)));
        table.insert(FdEntry::open(Fd(11)));
        assert_eq!(table.first_free_at_or_above(10), Fd(12));
    }

    #[test]
    fn highest_live_fd_tracks_max() {
        let mut table = FdTable::new();
        table.insert(FdEntry::open(Fd(0)));
        table.insert(FdEntry::open(Fd(3)));
        assert_eq!(table.highest_live_fd(), Some(Fd(3)));
    }
}
