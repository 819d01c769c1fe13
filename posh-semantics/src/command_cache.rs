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

//! The external-command hash table (spec.md §4.3 "[EXPANDED] Command
//! hashing").
//!
//! Successful `PATH` lookups are cached by command name so a loop calling
//! the same external program repeatedly does not re-scan `PATH` on every
//! iteration. The cache is invalidated whenever `PATH` is reassigned,
//! detected cheaply via the variable store's generation counter rather
//! than string-comparing the value on every lookup.

use std::collections::HashMap;
use unix_path::PathBuf;

#[derive(Clone, Debug, Default)]
pub struct CommandCache {
    entries: HashMap<String, PathBuf>,
    /// The variable store generation the cache was last validated
    /// against; a mismatch means `PATH` (or some other variable) may
    /// have changed and the whole cache is stale.
    generation: u64,
}

impl CommandCache {
    #[must_use]
    pub fn new() -> Self {
        CommandCache::default()
    }

    /// Drops every entry if `current_generation` has moved past what the
    /// cache was built against, then returns a fresh lookup opportunity.
    fn validate(&mut self, current_generation: u64) {
        if self.generation != current_generation {
            self.entries.clear();
            self.generation = current_generation;
        }
    }

    #[must_use]
    pub fn get(&mut self, name: &str, current_generation: u64) -> std::option::Option<PathBuf> {
        self.validate(current_generation);
        self.entries.get(name).cloned()
    }

    pub fn insert(&mut self, name: impl Into<String>, path: PathBuf, current_generation: u64) {
        self.validate(current_generation);
        self.entries.insert(name.into(), path);
    }

    /// `hash -r` / `set +h` support.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_recalls_a_path() {
        let mut cache = CommandCache::new();
        cache.insert("ls", PathBuf::from("/bin/ls"), 1);
        assert_eq!(cache.get("ls", 1), Some(PathBuf::from("/bin/ls")));
    }

    #[test]
    fn generation_bump_invalidates_cache() {
        let mut cache = CommandCache::new();
        cache.insert("ls", PathBuf::from("/bin/ls"), 1);
        assert_eq!(cache.get("ls", 2), None);
    }

    #[test]
    fn clear_drops_everything_without_a_generation_bump() {
        let mut cache = CommandCache::new();
        cache.insert("ls", PathBuf::from("/bin/ls"), 1);
        cache.clear();
        assert_eq!(cache.get("ls", 1), None);
    }
}
