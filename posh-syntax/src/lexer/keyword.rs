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

//! Reserved-word recognition (spec.md §4.1, SPEC_FULL.md §4.1 expansion).
//!
//! `[[` is deliberately absent: it is a bash extension outside the POSIX
//! grammar this core targets.

const KEYWORDS: &[&str] = &[
    "if", "then", "elif", "else", "fi", "do", "done", "case", "esac", "while", "until", "for",
    "in", "!", "{", "}",
];

/// True if `text` is a reserved word. Only meaningful when the candidate
/// word is a single unquoted, unexpanded literal at a command-word
/// position (spec.md §4.1: "A word that fully matches a reserved word at
/// the start of a command position becomes a keyword").
#[must_use]
pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_keywords() {
        assert!(is_keyword("while"));
        assert!(is_keyword("{"));
        assert!(!is_keyword("whilex"));
        assert!(!is_keyword("[["));
    }
}
