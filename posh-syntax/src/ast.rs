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

//! Abstract syntax tree types the (external) parser builds from [`Token`]s
//! and the executor (an external, downstream crate) walks.
//!
//! This crate does not build these values from source text — that is the
//! parser's job (out of scope per spec.md §1) — it only defines their
//! shape, the way `spec.md` §4.3 enumerates "AST node kinds handled" and
//! §6 describes the parser/executor interface.

use crate::source::Location;
use crate::token::Part;
use std::rc::Rc;

/// A word: an ordered sequence of parts plus its overall source location.
///
/// This plays the role of `spec.md`'s word [`Token`] once it has been
/// placed into the AST by the parser.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Word {
    pub parts: Vec<Part>,
    pub location: Location,
}

impl Word {
    /// Returns the word's text if it is made up of only unquoted/quoted
    /// literal parts (no expansion), concatenated. Used by the parser to
    /// recognize keywords and by the executor to recognize literal glob
    /// patterns and delimiter words.
    #[must_use]
    pub fn as_literal(&self) -> Option<String> {
        let mut out = String::new();
        for part in &self.parts {
            match &part.kind {
                crate::token::PartKind::Literal(s) => out.push_str(s),
                _ => return None,
            }
        }
        Some(out)
    }
}

/// Value assigned by an [`Assign`]: either a scalar word or an array of
/// words (the array form is a POSIXly non-portable extension, kept since
/// the teacher's grammar keeps it and the `typeset -a` family of builtins
/// in the wider ecosystem depends on it).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AssignValue {
    Scalar(Word),
    Array(Vec<Word>),
}

/// `name=value` appearing as an assignment-prefix on a simple command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assign {
    pub name: String,
    pub value: AssignValue,
    pub location: Location,
}

/// File descriptor newtype, matching spec.md's "Fd table entry".
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fd(pub i32);

impl Fd {
    pub const STDIN: Fd = Fd(0);
    pub const STDOUT: Fd = Fd(1);
    pub const STDERR: Fd = Fd(2);
}

/// Redirection operator (spec.md §4.3 "Redirection engine").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirOp {
    /// `n< file`
    FileIn,
    /// `n<> file`
    FileInOut,
    /// `n> file`
    FileOut,
    /// `n>> file`
    FileAppend,
    /// `n>| file`
    FileClobber,
    /// `n<&m` / `n<&-`
    FdIn,
    /// `n>&m` / `n>&-`
    FdOut,
}

/// A here-document attached to a `<<` or `<<-` redirection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HereDoc {
    /// The delimiter word as written; `delimiter.as_literal()` is `Some`
    /// unless the delimiter was quoted only in part, which the parser
    /// rejects.
    pub delimiter: Word,
    /// Whether the delimiter appeared with any quoting. Unquoted
    /// delimiters mark the body for parameter/command/arithmetic
    /// expansion with no field splitting or pathname expansion
    /// (spec.md §4.1 "Heredoc").
    pub delimiter_was_quoted: bool,
    /// `<<-`: strip leading tabs from each body line before comparing
    /// against the delimiter and before storing.
    pub remove_leading_tabs: bool,
    /// Raw, unexpanded body text, already tab-stripped if applicable.
    pub body: String,
}

/// What a [`Redir`] attaches to a file descriptor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RedirBody {
    Normal { operator: RedirOp, operand: Word },
    HereDoc(Rc<HereDoc>),
}

/// A single redirection (spec.md §3 "Fd table entry", §4.3 "Redirection
/// engine").
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redir {
    /// Explicit `n` prefix, or `None` to use the operator's default fd.
    pub fd: Option<Fd>,
    pub body: RedirBody,
}

impl Redir {
    #[must_use]
    pub fn fd_or_default(&self) -> Fd {
        use RedirOp::*;
        self.fd.unwrap_or(match &self.body {
            RedirBody::Normal { operator, .. } => match operator {
                FileIn | FileInOut | FdIn => Fd::STDIN,
                FileOut | FileAppend | FileClobber | FdOut => Fd::STDOUT,
            },
            RedirBody::HereDoc(_) => Fd::STDIN,
        })
    }
}

/// A command consisting of assignments, words and redirections
/// (spec.md §4.3).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SimpleCommand {
    pub assigns: Vec<Assign>,
    pub words: Vec<Word>,
    pub redirs: Vec<Redir>,
}

impl SimpleCommand {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigns.is_empty() && self.words.is_empty() && self.redirs.is_empty()
    }
}

/// `elif`/`then` clause of an `if` compound command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ElifThen {
    pub condition: List,
    pub body: List,
}

/// One `pattern) body ;;` branch of a `case` compound command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseItem {
    pub patterns: Vec<Word>,
    pub body: List,
}

/// A command that contains other commands (spec.md §4.3).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompoundCommand {
    /// `{ list; }` brace group: no fork, control flow transparent.
    Brace(List),
    /// `( list )` subshell: forked, COPY-scoped.
    Subshell(Rc<List>),
    For {
        name: Word,
        /// `None` means "in \"$@\"" (the default when `in …` is omitted).
        values: Option<Vec<Word>>,
        body: List,
    },
    While { condition: List, body: List },
    Until { condition: List, body: List },
    If {
        condition: List,
        body: List,
        elifs: Vec<ElifThen>,
        r#else: Option<List>,
    },
    Case { subject: Word, items: Vec<CaseItem> },
}

/// A compound command together with any redirections attached to it as a
/// whole (spec.md §4.3: "Redirections attached to a compound command apply
/// to the whole compound").
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FullCompoundCommand {
    pub command: CompoundCommand,
    pub redirs: Vec<Redir>,
}

/// `name() { body; }` or `function name { body; }`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub name_location: Location,
    pub body: Rc<FullCompoundCommand>,
}

/// One element of a [`Pipeline`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Simple(SimpleCommand),
    Compound(FullCompoundCommand),
    Function(FunctionDefinition),
}

/// Commands connected by `|` (spec.md §4.3 "Pipeline").
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pipeline {
    /// At least one command; shared via `Rc` so forked children do not
    /// need to clone the AST.
    pub commands: Vec<Rc<Command>>,
    /// Leading `!`.
    pub negation: bool,
}

/// Connective between two pipelines in an [`AndOrList`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AndOr {
    AndThen,
    OrElse,
}

/// Pipelines connected by `&&`/`||`, left-associative.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AndOrList {
    pub first: Pipeline,
    pub rest: Vec<(AndOr, Pipeline)>,
}

/// One `;`- or `&`-terminated element of a [`List`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Item {
    pub and_or: Rc<AndOrList>,
    /// Whether this item is terminated by `&` (run asynchronously/in the
    /// background) rather than `;`/newline.
    pub is_async: bool,
}

/// A sequence of commands: the root AST node, also the body of any
/// compound command (spec.md §4.3 "command list").
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct List(pub Vec<Item>);
