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

//! Alias definitions (spec.md §4.4 "aliases.scope").
//!
//! Alias *substitution* happens in the (out-of-scope) parser; this store
//! only holds the definitions a frame sees, since the frame/policy stack
//! governs whether they are shared or copied across a fork.

use std::collections::HashMap;
use std::rc::Rc;

/// A single alias definition.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alias {
    pub name: String,
    pub replacement: String,
    /// A global alias may be substituted anywhere a word is recognized;
    /// a non-global one only at a command-word position.
    pub is_global: bool,
}

/// A frame's alias store.
#[derive(Clone, Debug, Default)]
pub struct AliasSet {
    aliases: HashMap<String, Rc<Alias>>,
}

impl AliasSet {
    #[must_use]
    pub fn new() -> Self {
        AliasSet::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> std::option::Option<&Rc<Alias>> {
        self.aliases.get(name)
    }

    pub fn define(&mut self, name: impl Into<String>, replacement: impl Into<String>, is_global: bool) {
        let name = name.into();
        self.aliases.insert(
            name.clone(),
            Rc::new(Alias {
                name,
                replacement: replacement.into(),
                is_global,
            }),
        );
    }

    pub fn unset(&mut self, name: &str) -> bool {
        self.aliases.remove(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<Alias>> {
        self.aliases.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_lookup() {
        let mut aliases = AliasSet::new();
        aliases.define("ll", "ls -l", false);
        assert_eq!(aliases.get("ll").unwrap().replacement, "ls -l");
        assert!(!aliases.get("ll").unwrap().is_global);
    }
}
