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

//! Pattern matching shared by `${var#pattern}`-family trims (spec.md §4.2
//! "Parameter operators") and pathname expansion (spec.md §4.2 "Pathname
//! expansion"), both backed by the real `yash_fnmatch` crate.

use crate::field::MarkedText;
use yash_fnmatch::{Config, Pattern, PatternChar};

fn to_pattern_chars(text: &MarkedText) -> impl Iterator<Item = PatternChar> + Clone + '_ {
    text.iter().map(|c| {
        if c.quoted {
            PatternChar::Literal(c.value)
        } else {
            PatternChar::Normal(c.value)
        }
    })
}

/// Removes the shortest/longest prefix or suffix of `value` matching
/// `pattern`, or returns `value` unchanged if the pattern is malformed or
/// does not match (spec.md: "a broken pattern matches nothing rather than
/// erroring").
#[must_use]
pub fn trim(value: &str, pattern: &str, is_prefix: bool, longest: bool) -> String {
    let pattern_chars = crate::field::all_unquoted(pattern);
    let mut config = Config::default();
    if !is_prefix {
        config.anchor_end = true;
    }
    if !longest {
        config.shortest_match = true;
    }
    let Ok(pattern) = Pattern::parse_with_config(to_pattern_chars(&pattern_chars), config) else {
        return value.to_string();
    };
    match pattern.find(value) {
        Some(range) => {
            let mut value = value.to_string();
            value.drain(range);
            value
        }
        None => value.to_string(),
    }
}

/// `case`'s pattern match (spec.md §4.3 "Case"): no anchoring options,
/// since a `case` pattern always matches the whole subject rather than a
/// prefix/suffix.
#[must_use]
pub fn case_pattern_matches(pattern: &MarkedText, subject: &str) -> bool {
    let Ok(pattern) = Pattern::parse_with_config(to_pattern_chars(pattern), Config::default()) else {
        return false;
    };
    pattern.is_match(subject)
}

/// Expands one field as a pathname pattern (spec.md §4.2): if the field
/// contains no unquoted glob metacharacter, or matches nothing, the field
/// is returned unchanged (POSIX: a pattern that matches no pathname is
/// left as-is rather than removed). Matches are returned in byte-sorted
/// order; a leading `.` in a path component only matches a literal
/// leading `.` in the pattern, never `*`/`?`/a bracket expression.
#[must_use]
pub fn expand_pattern(field: &MarkedText, cwd: &unix_path::Path) -> Vec<String> {
    use std::os::unix::ffi::OsStrExt;

    let has_unquoted_meta = field.iter().any(|c| !c.quoted && "*?[".contains(c.value));
    if !has_unquoted_meta {
        return Vec::new();
    }
    let mut config = Config::default();
    config.literal_period = true;
    let Ok(pattern) = Pattern::parse_with_config(to_pattern_chars(field), config) else {
        return Vec::new();
    };

    // `std::fs` wants a native `std::path::Path`; `cwd` is a portable
    // `unix_path::Path` so bytes round-trip without encoding surprises.
    let std_cwd = std::path::PathBuf::from(std::ffi::OsStr::from_bytes(cwd.as_os_str().as_bytes()));

    let mut matches = Vec::new();
    if let Ok(entries) = std::fs::read_dir(&std_cwd) {
        for entry in entries.flatten() {
            let name = entry.file_name();
            if let Some(name) = name.to_str() {
                if pattern.is_match(name) {
                    matches.push(name.to_string());
                }
            }
        }
    }
    matches.sort();
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortest_prefix_trim() {
        assert_eq!(trim("123123123", "*2", true, false), "3123123");
    }

    #[test]
    fn longest_prefix_trim() {
        assert_eq!(trim("123123123", "*2", true, true), "3");
    }

    #[test]
    fn longest_suffix_trim() {
        assert_eq!(trim("123123123", "2*", false, true), "1");
    }

    #[test]
    fn no_match_keeps_value_unchanged() {
        assert_eq!(trim("abc", "zzz", true, false), "abc");
    }
}
