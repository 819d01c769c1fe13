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

//! Positional parameters (spec.md §3 "Positional parameters").
//!
//! `$0` is stored apart from `$1..`: function calls overlay the numbered
//! parameters but never touch `arg0` (spec.md §4.3 "`$0` is inherited (not
//! set to function name)").

/// A frame's positional-parameter record.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Positional {
    arg0: String,
    params: Vec<String>,
}

impl Positional {
    #[must_use]
    pub fn new(arg0: impl Into<String>, params: Vec<String>) -> Self {
        Positional {
            arg0: arg0.into(),
            params,
        }
    }

    #[must_use]
    pub fn arg0(&self) -> &str {
        &self.arg0
    }

    pub fn set_arg0(&mut self, arg0: impl Into<String>) {
        self.arg0 = arg0.into();
    }

    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// `$#`.
    #[must_use]
    pub fn count(&self) -> usize {
        self.params.len()
    }

    /// `$n` for `1 <= n <= $#`, `None` otherwise (including `n == 0`,
    /// which is `arg0` and handled separately by the expander).
    #[must_use]
    pub fn get(&self, n: usize) -> std::option::Option<&str> {
        if n == 0 {
            None
        } else {
            self.params.get(n - 1).map(String::as_str)
        }
    }

    /// Replaces the numbered parameters, used by `set --` and by a
    /// function call overlaying its call arguments (spec.md §4.4
    /// "positional.argn_init").
    pub fn set_params(&mut self, params: Vec<String>) {
        self.params = params;
    }

    /// A function-call frame's positional parameters, built from the
    /// call's argument words while inheriting the caller's `arg0`
    /// (spec.md §4.3 "Function definition / call").
    #[must_use]
    pub fn for_function_call(arg0: impl Into<String>, call_args: Vec<String>) -> Self {
        Positional::new(arg0, call_args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg0_is_separate_from_numbered_params() {
        let pos = Positional::new("sh", vec!["a".into(), "b".into()]);
        assert_eq!(pos.arg0(), "sh");
        assert_eq!(pos.count(), 2);
        assert_eq!(pos.get(1), Some("a"));
        assert_eq!(pos.get(0), None);
        assert_eq!(pos.get(3), None);
    }
}
