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

//! The redirection engine (spec.md §4.3 "Redirection engine").
//!
//! Grounded on the teacher's `RedirGuard`: redirections are applied one at
//! a time, each push onto a save-record stack, and the stack is unwound in
//! reverse either to restore the prior fd (ordinary scoped redirections)
//! or just to drop the backing save fds (`exec`'s permanent form).

use crate::error::ExecError;
use crate::exec::Interp;
use crate::expand;
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use posh_syntax::ast::{Fd, Redir, RedirBody, RedirOp};

const MIN_SAVE_FD: i32 = 10;

/// One undo step: `original` is the fd a redirection aimed at; `save`,
/// when present, is where its prior target was parked so it can be
/// `dup2`'d back; `None` means the fd had nothing open before.
struct SavedFd {
    original: Fd,
    save: std::option::Option<Fd>,
}

/// Performs `redirs` in order, recording how to undo each (spec.md:
/// "Before applying a redirection to fd n, the prior fd n is saved ...
/// the save-record is pushed onto a per-command redirection stack").
pub fn apply_scoped(interp: &mut Interp, redirs: &[Redir]) -> Result<RedirGuard, ExecError> {
    let mut guard = RedirGuard { saved: Vec::new() };
    for redir in redirs {
        let saved = apply_one(interp, redir)?;
        guard.saved.push(saved);
    }
    Ok(guard)
}

/// `exec`'s redirections: applied directly with no save record, so they
/// outlive the current frame (spec.md "[EXPANDED] `exec`").
pub fn apply_permanent(interp: &mut Interp, redirs: &[Redir]) -> Result<(), ExecError> {
    for redir in redirs {
        apply_one(interp, redir)?;
    }
    Ok(())
}

/// Holds the undo stack for one set of scoped redirections; drop (via
/// [`RedirGuard::undo`]) restores every fd in reverse order.
pub struct RedirGuard {
    saved: Vec<SavedFd>,
}

impl RedirGuard {
    /// Restores every fd this guard recorded, most-recent first.
    pub fn undo(self, interp: &mut Interp) {
        for SavedFd { original, save } in self.saved.into_iter().rev() {
            match save {
                Some(save) => {
                    let _ = interp.system.dup2(save.0, original.0);
                    let _ = interp.system.close(save.0);
                }
                None => {
                    let _ = interp.system.close(original.0);
                }
            }
        }
    }
}

fn save_original(interp: &mut Interp, target: Fd) -> std::option::Option<Fd> {
    let was_open = interp.frame.fds().borrow().get(target).is_some();
    if !was_open {
        return None;
    }
    let save_fd = interp.frame.fds().borrow().first_free_at_or_above(MIN_SAVE_FD);
    interp.system.dup2(target.0, save_fd.0).ok()?;
    Some(save_fd)
}

fn mark_open(interp: &mut Interp, fd: Fd) {
    use posh_env::fd::{FdEntry, FdFlags};
    interp
        .frame
        .fds()
        .borrow_mut()
        .insert(FdEntry {
            fd,
            flags: FdFlags::OPEN,
            backing_path: None,
            original_of: None,
        });
}

fn apply_one(interp: &mut Interp, redir: &Redir) -> Result<SavedFd, ExecError> {
    let target = redir.fd_or_default();
    let save = save_original(interp, target);

    let result = match &redir.body {
        RedirBody::Normal { operator, operand } => apply_normal(interp, target, *operator, operand),
        RedirBody::HereDoc(here_doc) => apply_heredoc(interp, target, here_doc),
    };

    match result {
        Ok(()) => {
            mark_open(interp, target);
            Ok(SavedFd { original: target, save })
        }
        Err(e) => {
            // Restore immediately; this redirection never took effect.
            if let Some(save) = save {
                let _ = interp.system.dup2(save.0, target.0);
                let _ = interp.system.close(save.0);
            }
            Err(e)
        }
    }
}

fn open_flags(operator: RedirOp) -> (OFlag, bool) {
    use RedirOp::{FileAppend, FileClobber, FileIn, FileInOut, FileOut};
    match operator {
        FileIn => (OFlag::O_RDONLY, false),
        FileInOut => (OFlag::O_RDWR | OFlag::O_CREAT, false),
        FileOut => (OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC, true),
        FileClobber => (OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC, false),
        FileAppend => (OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND, true),
        RedirOp::FdIn | RedirOp::FdOut => unreachable!("fd-duplication operators open no file"),
    }
}

fn apply_normal(interp: &mut Interp, target: Fd, operator: RedirOp, operand: &posh_syntax::ast::Word) -> Result<(), ExecError> {
    match operator {
        RedirOp::FdIn | RedirOp::FdOut => {
            let field = expand::expand_redirection_target(interp, operand)?;
            if field.as_str() == "-" {
                let _ = interp.system.close(target.0);
                return Ok(());
            }
            let source: i32 = field
                .as_str()
                .parse()
                .map_err(|_| ExecError::Redirection {
                    construct: "redirection".to_string(),
                    message: format!("{}: not a valid file descriptor", field.as_str()),
                })?;
            interp.system.dup2(source, target.0)?;
            Ok(())
        }
        _ => {
            let field = expand::expand_redirection_target(interp, operand)?;
            let (mut flags, respects_noclobber) = open_flags(operator);
            if respects_noclobber && interp.frame.options().borrow().is_on(posh_env::option::NoClobber) {
                flags |= OFlag::O_EXCL;
            }
            let path = unix_path::Path::new(field.as_str());
            let opened = interp.system.open(path, flags.bits(), Mode::from_bits_truncate(0o666))?;
            if opened != target.0 {
                interp.system.dup2(opened, target.0)?;
                let _ = interp.system.close(opened);
            }
            Ok(())
        }
    }
}

fn apply_heredoc(interp: &mut Interp, target: Fd, here_doc: &posh_syntax::ast::HereDoc) -> Result<(), ExecError> {
    let body = if here_doc.delimiter_was_quoted {
        here_doc.body.clone()
    } else {
        let expanded = expand::expand_parts(
            interp,
            &[posh_syntax::token::Part::literal(
                here_doc.body.clone(),
                posh_syntax::token::Quoting::UNQUOTED,
                here_doc.delimiter.location.clone(),
            )],
        )?;
        crate::field::Field::from(expanded).0
    };

    let (reader, writer) = interp.system.pipe()?;
    let mut written = 0;
    let bytes = body.as_bytes();
    while written < bytes.len() {
        written += interp.system.write(writer, &bytes[written..])?;
    }
    let _ = interp.system.close(writer);
    if reader != target.0 {
        interp.system.dup2(reader, target.0)?;
        let _ = interp.system.close(reader);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_syntax::ast::HereDoc;
    use posh_syntax::source::Location;
    use posh_syntax::token::{Part, PartKind, Quoting};

    fn literal_word(s: &str) -> posh_syntax::ast::Word {
        posh_syntax::ast::Word {
            parts: vec![Part {
                kind: PartKind::Literal(s.to_string()),
                quoting: Quoting::UNQUOTED,
                location: Location::dummy("test"),
            }],
            location: Location::dummy("test"),
        }
    }

    #[test]
    fn unquoted_heredoc_body_lands_on_stdin() {
        let mut interp = crate::tests::test_interp();
        let here_doc = HereDoc {
            delimiter: literal_word("EOF"),
            delimiter_was_quoted: false,
            remove_leading_tabs: false,
            body: "hello\n".to_string(),
        };
        let redir = Redir {
            fd: None,
            body: RedirBody::HereDoc(std::rc::Rc::new(here_doc)),
        };
        let guard = apply_scoped(&mut interp, &[redir]).unwrap();
        let mut buf = [0u8; 16];
        let n = interp.system.read(0, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello\n");
        guard.undo(&mut interp);
    }

    #[test]
    fn fd_close_operator_closes_target() {
        let mut interp = crate::tests::test_interp();
        let redir = Redir {
            fd: Some(Fd(1)),
            body: RedirBody::Normal {
                operator: RedirOp::FdOut,
                operand: literal_word("-"),
            },
        };
        let guard = apply_scoped(&mut interp, &[redir]).unwrap();
        assert!(interp.system.write(1, b"x").is_err());
        guard.undo(&mut interp);
    }
}
