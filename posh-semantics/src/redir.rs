// This file is part of posh, a job-control POSIX shell.
// Copyright (C) 2026 The posh authors
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

//! Redirection
//!
//! A redirection modifies a file descriptor of the shell before a command
//! runs. This module performs redirections whose operands have already been
//! [expanded](ExpandedRedir::expand):
//!
//! - `N<file` opens the file for reading.
//! - `N>file` opens the file for writing, creating or truncating it.
//! - `N>>file` opens the file for appending, creating it if needed.
//! - `N<&M` and `N>&M` make `N` a copy of `M`.
//! - `N<&-` and `N>&-` close `N`.
//!
//! Redirections are performed in a [`RedirGuard`], which saves the original
//! file descriptors so that they can be restored after the command finishes.

use crate::expansion;
use posh_env::Env;
use posh_env::io::Fd;
use posh_env::io::MIN_INTERNAL_FD;
use posh_env::semantics::Field;
use posh_env::system::Errno;
use posh_env::system::Mode;
use posh_env::system::OFlag;
use posh_syntax::source::Location;
use posh_syntax::syntax::Redir;
use posh_syntax::syntax::RedirOp;
use std::ffi::CString;
use std::ops::Deref;
use std::ops::DerefMut;
use thiserror::Error;

/// Redirection whose operand has been expanded
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExpandedRedir {
    /// File descriptor that is modified by this redirection
    pub fd: Fd,
    /// Type of the redirection
    pub op: RedirOp,
    /// Expanded operand
    pub operand: Field,
}

impl ExpandedRedir {
    /// Expands the operand of a redirection.
    ///
    /// The operand must expand to exactly one field.
    pub fn expand(env: &Env, redir: &Redir) -> expansion::Result<Self> {
        Ok(ExpandedRedir {
            fd: redir.fd_or_default(),
            op: redir.op,
            operand: expansion::expand_redir_target(env, &redir.operand)?,
        })
    }
}

/// Types of errors that may occur in the redirection
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum ErrorCause {
    /// The file descriptor is used by the shell internally.
    #[error("file descriptor {0} is reserved by the shell")]
    ReservedFd(Fd),

    /// The pathname contains a null character.
    #[error("{0}: the pathname contains a null character")]
    NulByte(String),

    /// Error while opening a file.
    #[error("{0}: {desc}", desc = .1.desc())]
    OpenFile(String, Errno),

    /// The operand of `<&` or `>&` is not a file descriptor.
    #[error("{0}: not a valid file descriptor")]
    MalformedFd(String),

    /// The file descriptor could not be duplicated or saved.
    #[error("{0}: {desc}", desc = .1.desc())]
    FdNotOverwritten(Fd, Errno),
}

/// Explanation of a redirection error
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    pub cause: ErrorCause,
    pub location: Location,
}

/// Record of a file descriptor modified by a redirection
#[derive(Clone, Copy, Debug)]
struct SavedFd {
    /// File descriptor modified by the redirection
    original: Fd,
    /// Copy of the original file descriptor, if it was open
    save: Option<Fd>,
}

/// File descriptor prepared from the redirection operand
#[derive(Clone, Copy, Debug)]
enum FdSpec {
    /// File descriptor specifically opened for the redirection
    Owned(Fd),
    /// Existing file descriptor
    Borrowed(Fd),
    /// The target file descriptor is to be closed.
    Closed,
}

fn open_file(env: &mut Env, flags: OFlag, operand: &Field) -> Result<FdSpec, ErrorCause> {
    let path = CString::new(operand.value.as_str())
        .map_err(|_| ErrorCause::NulByte(operand.value.clone()))?;
    let mode = Mode::from_bits_truncate(0o666);
    match env.system.open(&path, flags, mode) {
        Ok(fd) => Ok(FdSpec::Owned(fd)),
        Err(errno) => Err(ErrorCause::OpenFile(operand.value.clone(), errno)),
    }
}

fn copy_fd(operand: &Field) -> Result<FdSpec, ErrorCause> {
    if operand.value == "-" {
        return Ok(FdSpec::Closed);
    }
    match operand.value.parse() {
        Ok(fd) if fd >= 0 => Ok(FdSpec::Borrowed(Fd(fd))),
        _ => Err(ErrorCause::MalformedFd(operand.value.clone())),
    }
}

fn prepare(env: &mut Env, redir: &ExpandedRedir) -> Result<FdSpec, ErrorCause> {
    use RedirOp::*;
    match redir.op {
        FileIn => open_file(env, OFlag::O_RDONLY, &redir.operand),
        FileOut => open_file(
            env,
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            &redir.operand,
        ),
        FileAppend => open_file(
            env,
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND,
            &redir.operand,
        ),
        FdIn | FdOut => copy_fd(&redir.operand),
    }
}

/// Performs a redirection.
fn perform(env: &mut Env, redir: &ExpandedRedir) -> Result<SavedFd, ErrorCause> {
    let target = redir.fd;
    if target >= MIN_INTERNAL_FD {
        return Err(ErrorCause::ReservedFd(target));
    }

    // Save the current open file description at `target`
    let save = match env.system.dup(target, MIN_INTERNAL_FD, true) {
        Ok(save) => Some(save),
        Err(Errno::EBADF) => None,
        Err(errno) => return Err(ErrorCause::FdNotOverwritten(target, errno)),
    };
    let discard_save = |env: &mut Env| {
        if let Some(save) = save {
            let _ = env.system.close(save);
        }
    };

    let fd_spec = match prepare(env, redir) {
        Ok(fd_spec) => fd_spec,
        Err(cause) => {
            discard_save(env);
            return Err(cause);
        }
    };

    let result = match fd_spec {
        FdSpec::Owned(fd) if fd == target => Ok(()),
        FdSpec::Owned(fd) => {
            let result = env.system.dup2(fd, target);
            let _ = env.system.close(fd);
            result.map(drop)
        }
        FdSpec::Borrowed(fd) if fd == target => Ok(()),
        FdSpec::Borrowed(fd) => env.system.dup2(fd, target).map(drop),
        FdSpec::Closed => {
            let _ = env.system.close(target);
            Ok(())
        }
    };
    if let Err(errno) = result {
        discard_save(env);
        return Err(ErrorCause::FdNotOverwritten(target, errno));
    }

    tracing::trace!(fd = %target, op = %redir.op, operand = %redir.operand, "redirected");
    Ok(SavedFd {
        original: target,
        save,
    })
}

/// `Env` wrapper for performing redirections
///
/// This is an RAII-style wrapper of [`Env`] in which redirections are
/// performed. A `RedirGuard` keeps track of file descriptors affected by
/// redirections so that we can restore the file descriptors to the state
/// before performing the redirections.
///
/// There are two ways to clear file descriptors saved in the `RedirGuard`.
/// One is [`undo_redirs`](Self::undo_redirs), which restores the file
/// descriptors to the original state, and the other is
/// [`preserve_redirs`](Self::preserve_redirs), which removes the saved file
/// descriptors without restoring the state and thus makes the effect of the
/// redirections permanent.
///
/// When an instance of `RedirGuard` is dropped, `undo_redirs` is implicitly
/// called. That means you need to call `preserve_redirs` explicitly to
/// preserve the redirections' effect.
#[derive(Debug)]
pub struct RedirGuard<'e> {
    /// Environment in which redirections are performed
    env: &'e mut Env,
    /// Records of file descriptors that have been modified by redirections
    saved_fds: Vec<SavedFd>,
}

impl Deref for RedirGuard<'_> {
    type Target = Env;
    fn deref(&self) -> &Env {
        self.env
    }
}

impl DerefMut for RedirGuard<'_> {
    fn deref_mut(&mut self) -> &mut Env {
        self.env
    }
}

impl Drop for RedirGuard<'_> {
    fn drop(&mut self) {
        self.undo_redirs()
    }
}

impl<'e> RedirGuard<'e> {
    /// Creates a new `RedirGuard`.
    pub fn new(env: &'e mut Env) -> Self {
        let saved_fds = Vec::new();
        RedirGuard { env, saved_fds }
    }

    /// Performs a redirection.
    ///
    /// If successful, this function saves internally a backing copy of the
    /// file descriptor affected by the redirection.
    pub fn perform_redir(&mut self, redir: &ExpandedRedir) -> Result<(), Error> {
        match perform(self.env, redir) {
            Ok(saved_fd) => {
                self.saved_fds.push(saved_fd);
                Ok(())
            }
            Err(cause) => Err(Error {
                cause,
                location: redir.operand.origin,
            }),
        }
    }

    /// Performs redirections.
    ///
    /// If the redirection fails for an item, the remainders are ignored, but
    /// the effects of the preceding items are not canceled.
    pub fn perform_redirs<'a, I>(&mut self, redirs: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = &'a ExpandedRedir>,
    {
        redirs
            .into_iter()
            .try_for_each(|redir| self.perform_redir(redir))
    }

    /// Undoes the effect of the redirections.
    ///
    /// This function restores the file descriptors affected by redirections
    /// to the original state and closes internal backing file descriptors,
    /// which were used for restoration and are no longer needed.
    pub fn undo_redirs(&mut self) {
        for SavedFd { original, save } in self.saved_fds.drain(..).rev() {
            if let Some(save) = save {
                let _ = self.env.system.dup2(save, original);
                let _ = self.env.system.close(save);
            } else {
                let _ = self.env.system.close(original);
            }
        }
    }

    /// Makes the redirections permanent.
    ///
    /// This function closes internal backing file descriptors without
    /// restoring the original file descriptor state.
    pub fn preserve_redirs(&mut self) {
        for SavedFd { save, .. } in self.saved_fds.drain(..) {
            if let Some(save) = save {
                let _ = self.env.system.close(save);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use posh_env::system::SystemEx as _;
    use posh_env::system::r#virtual::{FileBody, Inode};
    use posh_env_test_helper::{assert_stdout, virtual_env};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn redir(fd: i32, op: RedirOp, operand: &str) -> ExpandedRedir {
        ExpandedRedir {
            fd: Fd(fd),
            op,
            operand: Field::dummy(operand),
        }
    }

    #[test]
    fn expand_operand() {
        let mut env = Env::new_virtual();
        env.variables.assign("f", "out.txt");
        let syntax = Redir {
            fd: Some(Fd(2)),
            op: RedirOp::FileOut,
            operand: posh_syntax::syntax::Word::dummy("$f"),
        };
        let redir = ExpandedRedir::expand(&env, &syntax).unwrap();
        assert_eq!(redir, self::redir(2, RedirOp::FileOut, "out.txt"));
    }

    #[test]
    fn file_out_creates_file_and_undo_restores_stdout() {
        let (mut env, state) = virtual_env();
        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(1, RedirOp::FileOut, "/tmp/out"))
            .unwrap();
        guard.system.write_all(Fd::STDOUT, b"to file\n").unwrap();
        drop(guard);
        env.system.write_all(Fd::STDOUT, b"to stdout\n").unwrap();

        let content = state.borrow().file_content("/tmp/out").unwrap();
        assert_eq!(content, b"to file\n");
        assert_stdout(&state, |stdout| assert_eq!(stdout, "to stdout\n"));
    }

    #[test]
    fn file_out_truncates_and_append_appends() {
        let (mut env, state) = virtual_env();
        let file = Rc::new(RefCell::new(Inode::new("old\n")));
        state
            .borrow_mut()
            .file_system
            .save("/tmp/f", Rc::clone(&file))
            .unwrap();

        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(1, RedirOp::FileAppend, "/tmp/f"))
            .unwrap();
        guard.system.write_all(Fd::STDOUT, b"new\n").unwrap();
        drop(guard);
        assert_matches!(&file.borrow().body, FileBody::Regular { content, .. } => {
            assert_eq!(content, b"old\nnew\n");
        });

        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(1, RedirOp::FileOut, "/tmp/f"))
            .unwrap();
        drop(guard);
        assert_matches!(&file.borrow().body, FileBody::Regular { content, .. } => {
            assert_eq!(content, b"");
        });
    }

    #[test]
    fn file_in_reads_file() {
        let (mut env, state) = virtual_env();
        let file = Rc::new(RefCell::new(Inode::new("input")));
        state.borrow_mut().file_system.save("/in", file).unwrap();

        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(0, RedirOp::FileIn, "/in"))
            .unwrap();
        let mut buffer = [0; 10];
        let count = guard.system.read(Fd::STDIN, &mut buffer).unwrap();
        assert_eq!(&buffer[..count], b"input");
    }

    #[test]
    fn unopenable_file_is_an_error() {
        let mut env = Env::new_virtual();
        let mut guard = RedirGuard::new(&mut env);
        let error = guard
            .perform_redir(&redir(0, RedirOp::FileIn, "/no/such/file"))
            .unwrap_err();
        assert_eq!(
            error.cause,
            ErrorCause::OpenFile("/no/such/file".to_owned(), Errno::ENOENT)
        );
        assert_eq!(
            error.to_string(),
            format!("/no/such/file: {}", Errno::ENOENT.desc())
        );
    }

    #[test]
    fn fd_out_copies_fd() {
        let (mut env, state) = virtual_env();
        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(2, RedirOp::FdOut, "1"))
            .unwrap();
        guard.system.write_all(Fd::STDERR, b"error\n").unwrap();
        drop(guard);
        assert_stdout(&state, |stdout| assert_eq!(stdout, "error\n"));
        env.system.write_all(Fd::STDERR, b"restored\n").unwrap();
        let stderr = state.borrow().file_content("/dev/stderr").unwrap();
        assert_eq!(stderr, b"restored\n");
    }

    #[test]
    fn fd_out_closes_fd_with_hyphen() {
        let mut env = Env::new_virtual();
        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(1, RedirOp::FdOut, "-"))
            .unwrap();
        assert_eq!(guard.system.write(Fd::STDOUT, b"x"), Err(Errno::EBADF));
        drop(guard);
        assert_eq!(env.system.write(Fd::STDOUT, b"x"), Ok(1));
    }

    #[test]
    fn malformed_fd_is_an_error() {
        let mut env = Env::new_virtual();
        let mut guard = RedirGuard::new(&mut env);
        let error = guard
            .perform_redir(&redir(1, RedirOp::FdOut, "x"))
            .unwrap_err();
        assert_eq!(error.cause, ErrorCause::MalformedFd("x".to_owned()));
    }

    #[test]
    fn copying_closed_fd_is_an_error() {
        let mut env = Env::new_virtual();
        let mut guard = RedirGuard::new(&mut env);
        let error = guard
            .perform_redir(&redir(1, RedirOp::FdOut, "5"))
            .unwrap_err();
        assert_eq!(error.cause, ErrorCause::FdNotOverwritten(Fd(1), Errno::EBADF));
        drop(guard);
        assert_eq!(env.system.write(Fd::STDOUT, b"x"), Ok(1));
    }

    #[test]
    fn reserved_fd_is_rejected() {
        let mut env = Env::new_virtual();
        let mut guard = RedirGuard::new(&mut env);
        let error = guard
            .perform_redir(&redir(10, RedirOp::FileOut, "/tmp/x"))
            .unwrap_err();
        assert_eq!(error.cause, ErrorCause::ReservedFd(Fd(10)));
    }

    #[test]
    fn redirecting_closed_fd_and_undoing_closes_it() {
        let mut env = Env::new_virtual();
        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(5, RedirOp::FileOut, "/tmp/five"))
            .unwrap();
        assert_eq!(guard.system.write(Fd(5), b"x"), Ok(1));
        drop(guard);
        assert_eq!(env.system.write(Fd(5), b"x"), Err(Errno::EBADF));
    }

    #[test]
    fn preserved_redirection_stays() {
        let (mut env, state) = virtual_env();
        let mut guard = RedirGuard::new(&mut env);
        guard
            .perform_redir(&redir(1, RedirOp::FileOut, "/tmp/kept"))
            .unwrap();
        guard.preserve_redirs();
        drop(guard);
        env.system.write_all(Fd::STDOUT, b"kept\n").unwrap();
        let content = state.borrow().file_content("/tmp/kept").unwrap();
        assert_eq!(content, b"kept\n");
        assert_stdout(&state, |stdout| assert_eq!(stdout, ""));
    }

    #[test]
    fn later_redirection_wins() {
        let (mut env, state) = virtual_env();
        let mut guard = RedirGuard::new(&mut env);
        let redirs = [
            redir(1, RedirOp::FileOut, "/tmp/first"),
            redir(1, RedirOp::FileOut, "/tmp/second"),
        ];
        guard.perform_redirs(&redirs).unwrap();
        guard.system.write_all(Fd::STDOUT, b"x").unwrap();
        drop(guard);
        let state = state.borrow();
        assert_eq!(state.file_content("/tmp/first").unwrap(), b"");
        assert_eq!(state.file_content("/tmp/second").unwrap(), b"x");
    }
}
