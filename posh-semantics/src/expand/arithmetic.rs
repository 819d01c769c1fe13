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

//! Arithmetic expansion (spec.md §4.2 "if Arithmetic, evaluate via
//! `yash-arith`"). The real `yash-arith` crate does the parsing and
//! evaluation; this module is the adapter binding its `Env` trait to
//! [`posh_env`]'s variable store.

use crate::error::ExpansionError;
use crate::exec::Interp;
use posh_env::variable::Value;
use std::convert::Infallible;
use std::ops::Range;

/// `yash_arith::Env::get_variable` returns a borrowed `&str`, which can't
/// point into a `RefCell`-guarded store across the call; this adapter
/// instead snapshots variable reads into owned strings up front and
/// applies assignments back to the real store as they occur, matching
/// the teacher's own `yash-env`-to-`yash-arith` bridge in spirit
/// (`yash-semantics/src/expansion/initial/arith.rs`) while working
/// around the lifetime mismatch with a `RefCell`-backed store.
struct SnapshotEnv<'a> {
    interp: &'a mut Interp,
    cache: std::collections::HashMap<String, std::option::Option<String>>,
}

impl yash_arith::Env for SnapshotEnv<'_> {
    type GetVariableError = Infallible;
    type AssignVariableError = Infallible;

    fn get_variable(&self, name: &str) -> Result<std::option::Option<&str>, Infallible> {
        Ok(self.cache.get(name).and_then(|v| v.as_deref()))
    }

    fn assign_variable(
        &mut self,
        name: &str,
        value: String,
        _location: Range<usize>,
    ) -> Result<(), Infallible> {
        let _ = self
            .interp
            .frame
            .variables()
            .borrow_mut()
            .assign(name, Value::scalar(value.clone()), false, false);
        self.cache.insert(name.to_string(), Some(value));
        Ok(())
    }
}

fn read_variable(interp: &Interp, name: &str) -> std::option::Option<String> {
    match name {
        "#" => Some(interp.frame.positional().borrow().count().to_string()),
        "?" => Some(interp.status().to_string()),
        _ if name.chars().all(|c| c.is_ascii_digit()) && !name.is_empty() => {
            let n: usize = name.parse().ok()?;
            interp.frame.positional().borrow().get(n).map(str::to_string)
        }
        _ => {
            let variables = interp.frame.variables().borrow();
            match &variables.get(name)?.value {
                Some(Value::Scalar(s)) => Some(s.clone()),
                Some(Value::Array(a)) => a.first().cloned(),
                None => None,
            }
        }
    }
}

/// Scans `expression` for bare identifiers that look like variable names
/// so the snapshot cache can be pre-populated; `yash_arith` re-reads the
/// same name multiple times during a single evaluation (once per operand
/// occurrence) but never introduces a name that wasn't in the source.
fn candidate_names(expression: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut chars = expression.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c == '_' || c.is_ascii_alphabetic() {
            let mut end = start + c.len_utf8();
            while let Some(&(i, c)) = chars.peek() {
                if c == '_' || c.is_ascii_alphanumeric() {
                    end = i + c.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            names.push(expression[start..end].to_string());
        }
    }
    names
}

/// Evaluates an arithmetic expression body (spec.md §4.2).
pub fn expand(interp: &mut Interp, expression: &str) -> Result<i64, ExpansionError> {
    let mut cache = std::collections::HashMap::new();
    for name in candidate_names(expression) {
        let value = read_variable(interp, &name);
        cache.insert(name, value);
    }
    let mut env = SnapshotEnv { interp, cache };
    match yash_arith::eval(expression, &mut env) {
        Ok(yash_arith::Value::Integer(n)) => Ok(n),
        Err(e) => Err(ExpansionError::Arith(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_interp;

    #[test]
    fn evaluates_simple_arithmetic() {
        let mut interp = test_interp();
        assert_eq!(expand(&mut interp, "1 + 2 * 3").unwrap(), 7);
    }

    #[test]
    fn reads_a_shell_variable() {
        let mut interp = test_interp();
        interp
            .frame
            .variables()
            .borrow_mut()
            .assign("x", Value::scalar("10"), false, false)
            .unwrap();
        assert_eq!(expand(&mut interp, "x + 1").unwrap(), 11);
    }

    #[test]
    fn assigns_a_shell_variable() {
        let mut interp = test_interp();
        expand(&mut interp, "x = 5").unwrap();
        assert_eq!(
            interp.frame.variables().borrow().get("x").unwrap().value,
            Some(Value::scalar("5"))
        );
    }
}
