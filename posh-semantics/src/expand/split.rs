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

//! Field splitting (spec.md §4.2 "Field splitting"), grounded on the
//! teacher's `yash-semantics/src/expansion/split.rs`/`split/ifs.rs`:
//! unquoted characters found in `$IFS` delimit fields; a run of IFS
//! whitespace at either end of the text is trimmed rather than
//! producing an empty field, a run of pure IFS whitespace in the middle
//! collapses to a single boundary, and every IFS non-whitespace
//! character is its own boundary (so adjacent non-whitespace separators
//! do produce empty fields between them).

use crate::field::MarkedText;

pub const DEFAULT_IFS: &str = " \t\n";

/// Splits `text` on unquoted `$IFS` characters. An empty `ifs` disables
/// splitting entirely (the whole text, one field). A purely
/// IFS-whitespace `text` (nothing but separators, none of them quoted)
/// disappears rather than producing a lone empty field.
#[must_use]
pub fn split(text: &MarkedText, ifs: &str) -> Vec<MarkedText> {
    if text.is_empty() {
        return Vec::new();
    }
    if ifs.is_empty() {
        return vec![text.clone()];
    }

    let is_sep = |c: &crate::field::MarkedChar| !c.quoted && ifs.contains(c.value);

    let mut fields = Vec::new();
    let mut current = MarkedText::new();
    let mut i = 0;
    let n = text.len();
    let mut at_start = true;

    while i < n {
        if is_sep(&text[i]) {
            let mut nonws_count = 0;
            while i < n && is_sep(&text[i]) {
                if !text[i].value.is_whitespace() {
                    nonws_count += 1;
                }
                i += 1;
            }
            let at_end = i == n;
            let boundaries = if nonws_count == 0 {
                if at_start || at_end {
                    0
                } else {
                    1
                }
            } else {
                nonws_count
            };
            for _ in 0..boundaries {
                fields.push(std::mem::take(&mut current));
            }
            at_start = false;
        } else {
            current.push(text[i]);
            i += 1;
            at_start = false;
        }
    }

    if !fields.is_empty() || !current.is_empty() {
        fields.push(current);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::all_unquoted;

    fn texts(s: &str) -> MarkedText {
        all_unquoted(s)
    }

    fn joined(fields: &[MarkedText]) -> Vec<String> {
        fields.iter().map(|f| f.iter().map(|c| c.value).collect()).collect()
    }

    #[test]
    fn trims_leading_and_trailing_whitespace() {
        let fields = split(&texts("  a b  "), DEFAULT_IFS);
        assert_eq!(joined(&fields), vec!["a", "b"]);
    }

    #[test]
    fn pure_whitespace_disappears() {
        let fields = split(&texts("   "), DEFAULT_IFS);
        assert!(fields.is_empty());
    }

    #[test]
    fn middle_whitespace_run_collapses_to_one_boundary() {
        let fields = split(&texts("a   b"), DEFAULT_IFS);
        assert_eq!(joined(&fields), vec!["a", "b"]);
    }

    #[test]
    fn adjacent_non_whitespace_separators_yield_empty_fields() {
        let fields = split(&texts("a::b"), ":");
        assert_eq!(joined(&fields), vec!["a", "", "b"]);
    }

    #[test]
    fn leading_non_whitespace_separator_yields_leading_empty_field() {
        let fields = split(&texts(":a"), ":");
        assert_eq!(joined(&fields), vec!["", "a"]);
    }

    #[test]
    fn trailing_non_whitespace_separator_yields_trailing_empty_field() {
        let fields = split(&texts("a:"), ":");
        assert_eq!(joined(&fields), vec!["a", ""]);
    }

    #[test]
    fn quoted_separators_are_not_separators() {
        let mut text = all_unquoted("a");
        text.push(crate::field::MarkedChar::quoted(' '));
        text.extend(all_unquoted("b"));
        let fields = split(&text, DEFAULT_IFS);
        assert_eq!(joined(&fields), vec!["a b"]);
    }

    #[test]
    fn empty_ifs_disables_splitting() {
        let fields = split(&texts("a b"), "");
        assert_eq!(joined(&fields), vec!["a b"]);
    }
}
