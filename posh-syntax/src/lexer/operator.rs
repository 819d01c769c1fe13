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

//! Operator table and maximal-munch matching (spec.md §4.1).

/// The recognized shell operators, longest-first so the lexer can match
/// by maximal munch with a simple linear scan.
const OPERATORS: &[&str] = &[
    "<<-", // must precede "<<" and "<"
    "<<", "<&", "<>", "<", "||", "|", ">>", ">&", ">|", ">", "&&", "&", ";;", ";", "(", ")",
];

/// Attempts to match the longest operator starting at `input`. Returns the
/// matched text on success.
#[must_use]
pub fn match_operator(input: &str) -> Option<&'static str> {
    OPERATORS
        .iter()
        .find(|op| input.starts_with(*op))
        .copied()
}

/// First character of every recognized operator, used by the lexer to
/// decide whether to attempt an operator match before falling back to
/// scanning a word.
#[must_use]
pub fn starts_operator(c: char) -> bool {
    matches!(c, '<' | '>' | '|' | '&' | ';' | '(' | ')')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maximal_munch_prefers_longest() {
        assert_eq!(match_operator("<<-x"), Some("<<-"));
        assert_eq!(match_operator("<<x"), Some("<<"));
        assert_eq!(match_operator("<x"), Some("<"));
        assert_eq!(match_operator(";;x"), Some(";;"));
        assert_eq!(match_operator(";x"), Some(";"));
    }

    #[test]
    fn non_operator_does_not_match() {
        assert_eq!(match_operator("echo"), None);
    }
}
