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

//! Shell variables: values, per-variable metadata, and the variable store
//! (spec.md §3 "Variable entry", §4.2 "Assignment-value expansion").

use either::{Left, Right};
use itertools::Itertools;
use std::collections::HashMap;
use thiserror::Error;

/// Value of a variable: a scalar string, or an array (spec.md §4.3
/// "positional parameters" use the array shape too, but those live in
/// [`crate::positional`], not here).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Scalar(String),
    Array(Vec<String>),
}

use Value::{Array, Scalar};

impl Value {
    #[must_use]
    pub fn scalar<S: Into<String>>(value: S) -> Self {
        Scalar(value.into())
    }

    #[must_use]
    pub fn array<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Array(values.into_iter().map(Into::into).collect())
    }

    /// Splits a scalar at `:`; returns array items unsplit, matching
    /// `PATH`-like colon-separated variable semantics (spec.md §6
    /// "PATH is re-scanned ... empty components mean the current
    /// directory").
    pub fn split_colon(&self) -> impl Iterator<Item = &str> {
        match self {
            Scalar(value) => Left(value.split(':')),
            Array(values) => Right(values.iter().map(String::as_str)),
        }
    }

    /// Scalar string form used by parameter expansion when no subscript
    /// is given: a scalar as-is, an array joined by the first byte of
    /// `IFS` (or a space if `IFS` is unset/empty), matching `$*`-style
    /// joining for a plain `$name` reference to an array.
    #[must_use]
    pub fn as_joined(&self, separator: char) -> String {
        match self {
            Scalar(value) => value.clone(),
            Array(values) => values.join(&separator.to_string()),
        }
    }
}

/// A single shell variable and its metadata (spec.md §3 "Variable entry").
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Variable {
    /// `None` if declared (`typeset x`) but never assigned.
    pub value: Option<Value>,
    pub is_exported: bool,
    pub is_read_only: bool,
}

impl Variable {
    #[must_use]
    pub fn new<S: Into<String>>(value: S) -> Self {
        Variable {
            value: Some(Value::scalar(value)),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn new_array<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Variable {
            value: Some(Value::array(values)),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn exported(mut self) -> Self {
        self.is_exported = true;
        self
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.is_read_only = true;
        self
    }
}

/// Error assigning to or unsetting a read-only variable (spec.md §4.2
/// "${var:=word} ... errors on read-only").
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{name}: readonly variable")]
pub struct ReadOnlyError {
    pub name: String,
}

/// True if `name` is a syntactically valid variable name (spec.md §3
/// "Name validity").
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// A frame's variable store.
///
/// Carries a monotonically increasing `generation` counter bumped on every
/// mutating operation, used by the executor's command-hash cache to detect
/// `PATH` reassignment (SPEC_FULL.md §3 "Generation counters").
#[derive(Clone, Debug, Default)]
pub struct VariableSet {
    vars: HashMap<String, Variable>,
    generation: u64,
}

impl VariableSet {
    #[must_use]
    pub fn new() -> Self {
        VariableSet::default()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn get(&self, name: &str) -> std::option::Option<&Variable> {
        self.vars.get(name)
    }

    /// Assigns a variable, rejecting the write if it already exists and is
    /// read-only. `export` and `read_only` only ever turn those flags on;
    /// they do not clear a flag already set by an earlier `export`/
    /// `readonly` call on the same name.
    pub fn assign(
        &mut self,
        name: impl Into<String>,
        value: Value,
        export: bool,
        read_only: bool,
    ) -> Result<(), ReadOnlyError> {
        let name = name.into();
        if let Some(existing) = self.vars.get(&name) {
            if existing.is_read_only {
                return Err(ReadOnlyError { name });
            }
        }
        let entry = self.vars.entry(name).or_default();
        entry.value = Some(value);
        entry.is_exported |= export;
        entry.is_read_only |= read_only;
        self.generation += 1;
        Ok(())
    }

    pub fn export(&mut self, name: &str, exported: bool) {
        if let Some(entry) = self.vars.get_mut(name) {
            entry.is_exported = exported;
            self.generation += 1;
        }
    }

    pub fn set_read_only(&mut self, name: &str) {
        if let Some(entry) = self.vars.get_mut(name) {
            entry.is_read_only = true;
            self.generation += 1;
        }
    }

    pub fn unset(&mut self, name: &str) -> Result<bool, ReadOnlyError> {
        if let Some(existing) = self.vars.get(name) {
            if existing.is_read_only {
                return Err(ReadOnlyError {
                    name: name.to_string(),
                });
            }
        }
        let removed = self.vars.remove(name).is_some();
        if removed {
            self.generation += 1;
        }
        Ok(removed)
    }

    /// All variables marked exported, for projecting into a child process
    /// environment (spec.md §3 "Exported entries are projected into the
    /// child process environment").
    pub fn exported_iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.vars
            .iter()
            .filter(|(_, v)| v.is_exported)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Like [`VariableSet::exported_iter`], but name-sorted, for
    /// projecting a deterministic `envp` into a child process (spec.md
    /// §6 "Environment produced to children") and for `export -p`
    /// listing, where POSIX implementations traditionally print in a
    /// stable order.
    pub fn exported_sorted_iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.exported_iter().sorted_by_key(|(name, _)| *name)
    }

    /// Populates the store from a process environment (top-level frame
    /// construction; spec.md §4.4 "variables.init_from_envp").
    pub fn init_from_envp<I, K, V>(&mut self, envp: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in envp {
            let k = k.into();
            if is_valid_name(&k) {
                self.vars.insert(k, Variable::new(v.into()).exported());
            }
        }
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_validity() {
        assert!(is_valid_name("_foo"));
        assert!(is_valid_name("FOO_1"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("1foo"));
        assert!(!is_valid_name("foo-bar"));
    }

    #[test]
    fn assign_and_read_back() {
        let mut vars = VariableSet::new();
        vars.assign("x", Value::scalar("1"), false, false).unwrap();
        assert_eq!(vars.get("x").unwrap().value, Some(Value::scalar("1")));
        assert_eq!(vars.generation(), 1);
    }

    #[test]
    fn read_only_rejects_reassignment() {
        let mut vars = VariableSet::new();
        vars.assign("x", Value::scalar("1"), false, true).unwrap();
        let err = vars.assign("x", Value::scalar("2"), false, false).unwrap_err();
        assert_eq!(err.name, "x");
    }

    #[test]
    fn export_filters_exported_only() {
        let mut vars = VariableSet::new();
        vars.assign("a", Value::scalar("1"), true, false).unwrap();
        vars.assign("b", Value::scalar("2"), false, false).unwrap();
        let exported: Vec<_> = vars.exported_iter().map(|(k, _)| k).collect();
        assert_eq!(exported, ["a"]);
    }

    #[test]
    fn exported_sorted_iter_is_name_order() {
        let mut vars = VariableSet::new();
        vars.assign("ZOO", Value::scalar("1"), true, false).unwrap();
        vars.assign("ALPHA", Value::scalar("2"), true, false).unwrap();
        let names: Vec<_> = vars.exported_sorted_iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["ALPHA", "ZOO"]);
    }
}
