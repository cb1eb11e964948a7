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

//! Type definitions for I/O.

#[doc(no_inline)]
pub use posh_syntax::syntax::Fd;

/// Minimum file descriptor the shell may occupy for its internal use
///
/// File descriptors below `MIN_INTERNAL_FD` are reserved for the user. When
/// the shell needs to open a file descriptor that is invisible to the user,
/// such as the terminal or a saved copy of a redirected descriptor, it should
/// be kept at `MIN_INTERNAL_FD` or above. Use
/// [`move_fd_internal`](crate::system::SystemEx::move_fd_internal) to move a
/// file descriptor there.
pub const MIN_INTERNAL_FD: Fd = Fd(10);
