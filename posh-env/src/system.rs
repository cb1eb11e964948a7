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

//! [System] and its implementors.

pub mod real;
pub mod r#virtual;

use crate::Env;
use crate::io::Fd;
use crate::io::MIN_INTERNAL_FD;
use crate::job::Pid;
use crate::job::ProcessState;
use crate::semantics::ExitStatus;
#[doc(no_inline)]
pub use nix::errno::Errno;
#[doc(no_inline)]
pub use nix::fcntl::OFlag;
#[doc(no_inline)]
pub use nix::sys::signal::SigSet;
#[doc(no_inline)]
pub use nix::sys::signal::SigmaskHow;
#[doc(no_inline)]
pub use nix::sys::signal::Signal;
#[doc(no_inline)]
pub use nix::sys::stat::Mode;
use std::ffi::CStr;
use std::ffi::CString;
use std::ffi::OsString;
use std::fmt::Debug;
use std::path::PathBuf;

/// Result type of system calls
pub type Result<T> = std::result::Result<T, Errno>;

/// API to the system-managed parts of the environment.
///
/// The `System` trait defines a collection of methods to access the underlying
/// operating system from the shell as an application program. There are two
/// implementors for this trait: [`RealSystem`](self::real::RealSystem) and
/// [`VirtualSystem`](self::virtual::VirtualSystem).
///
/// All the methods are synchronous. The shell executes one command line at a
/// time and only blocks in [`wait`](Self::wait) and in reading input.
pub trait System: Debug {
    /// Whether there is an executable regular file at the specified path.
    fn is_executable_file(&self, path: &CStr) -> bool;

    /// Whether there is a directory at the specified path.
    fn is_directory(&self, path: &CStr) -> bool;

    /// Whether there is any file at the specified path.
    fn file_exists(&self, path: &CStr) -> bool;

    /// Whether the two paths name the same existing file.
    ///
    /// Symbolic links are followed. Returns false if either file is missing.
    fn is_same_file(&self, path1: &CStr, path2: &CStr) -> bool;

    /// Creates an unnamed pipe.
    ///
    /// This is a thin wrapper around the `pipe` system call.
    /// If successful, returns the reading and writing ends of the pipe.
    fn pipe(&mut self) -> Result<(Fd, Fd)>;

    /// Duplicates a file descriptor.
    ///
    /// This is a thin wrapper around the `fcntl` system call that opens a new
    /// FD that shares the open file description with `from`. The new FD will be
    /// the minimum unused FD not less than `to_min`. The `cloexec` parameter
    /// specifies whether the new FD should have the `CLOEXEC` flag set.
    fn dup(&mut self, from: Fd, to_min: Fd, cloexec: bool) -> Result<Fd>;

    /// Duplicates a file descriptor.
    ///
    /// This is a thin wrapper around the `dup2` system call. If successful,
    /// returns `Ok(to)`.
    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd>;

    /// Opens a file descriptor.
    ///
    /// This is a thin wrapper around the `open` system call.
    fn open(&mut self, path: &CStr, flags: OFlag, mode: Mode) -> Result<Fd>;

    /// Closes a file descriptor.
    ///
    /// This is a thin wrapper around the `close` system call.
    ///
    /// This function returns `Ok(())` when the FD is already closed.
    fn close(&mut self, fd: Fd) -> Result<()>;

    /// Tests if a file descriptor is associated with a terminal device.
    fn isatty(&self, fd: Fd) -> bool;

    /// Reads from the file descriptor.
    ///
    /// This is a thin wrapper around the `read` system call.
    /// If successful, returns the number of bytes read.
    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize>;

    /// Writes to the file descriptor.
    ///
    /// This is a thin wrapper around the `write` system call.
    /// If successful, returns the number of bytes written, which may be less
    /// than the buffer length. See also [`SystemEx::write_all`].
    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize>;

    /// Returns the names of the entries in a directory.
    ///
    /// The `.` and `..` entries are not included. The order of the entries is
    /// unspecified.
    fn read_dir(&self, path: &CStr) -> Result<Vec<OsString>>;

    /// Gets and sets the signal blocking mask.
    ///
    /// This is a thin wrapper around the `sigprocmask` system call. Returns
    /// the mask that was in effect before the call.
    fn sigmask(&mut self, how: SigmaskHow, signals: &SigSet) -> Result<SigSet>;

    /// Gets and sets the disposition of a signal.
    ///
    /// Returns the previous disposition.
    fn sigaction(&mut self, signal: Signal, handling: SignalHandling) -> Result<SignalHandling>;

    /// Returns the process ID of the current process.
    #[must_use]
    fn getpid(&self) -> Pid;

    /// Returns the process ID of the parent process.
    #[must_use]
    fn getppid(&self) -> Pid;

    /// Returns the process group ID of the current process.
    #[must_use]
    fn getpgrp(&self) -> Pid;

    /// Modifies the process group ID of a process.
    ///
    /// This is a thin wrapper around the `setpgid` system call. A `pid` of 0
    /// means the current process. A `pgid` of 0 means the same value as `pid`.
    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<()>;

    /// Returns the current foreground process group ID of the terminal.
    ///
    /// This is a thin wrapper around the `tcgetpgrp` system call.
    fn tcgetpgrp(&self, fd: Fd) -> Result<Pid>;

    /// Switches the foreground process group of the terminal.
    ///
    /// This is a thin wrapper around the `tcsetpgrp` system call. If the
    /// calling process is not in the foreground, it receives `SIGTTOU` unless
    /// the signal is blocked or ignored. Use [`SystemEx::tcsetpgrp_with_block`]
    /// to avoid being stopped by the signal.
    fn tcsetpgrp(&mut self, fd: Fd, pgid: Pid) -> Result<()>;

    /// Creates a new child process.
    ///
    /// This is a thin wrapper around the `fork` system call. Users of `Env`
    /// should not call it directly. Instead, use
    /// [`Subshell`](crate::subshell::Subshell) so that the child process is
    /// arranged properly.
    ///
    /// If successful, this function returns a [`ChildProcessStarter`]. The
    /// caller must call it exactly once with the task the child process
    /// performs. In the parent process, the starter returns the child's
    /// process ID. In the child process, the starter runs the task and exits
    /// with the exit status left in the `Env`.
    fn new_child_process(&mut self) -> Result<ChildProcessStarter>;

    /// Reports updated status of a child process.
    ///
    /// This is a thin wrapper around the `waitpid` system call. If `target` is
    /// `None`, any child is waited for. Stopped children are reported as well
    /// as terminated ones.
    ///
    /// With [`WaitMode::NoHang`], this function returns `Ok(None)` if there is
    /// no child whose status has changed. With [`WaitMode::Block`], the
    /// function blocks until there is one. In either mode, `Err(ECHILD)` is
    /// returned if there is no child to wait for.
    fn wait(&mut self, target: Option<Pid>, mode: WaitMode) -> Result<Option<(Pid, ProcessState)>>;

    /// Replaces the current process with an external utility.
    ///
    /// This is a thin wrapper around the `execve` system call. If successful,
    /// the real implementation never returns. The virtual implementation runs
    /// the simulated program to completion and returns its exit status.
    fn execve(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Result<ExitStatus>;

    /// Returns the current working directory path.
    fn getcwd(&self) -> Result<PathBuf>;

    /// Changes the working directory.
    fn chdir(&mut self, path: &CStr) -> Result<()>;
}

/// Whether [`System::wait`] blocks
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WaitMode {
    /// Block until a child changes its state.
    Block,
    /// Return immediately if no child has changed its state.
    NoHang,
}

/// How a signal is handled by the current process
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SignalHandling {
    /// Perform the default action for the signal.
    #[default]
    Default,
    /// Ignore the signal.
    Ignore,
}

/// Task executed in a child process
pub type ChildProcessTask = Box<dyn FnOnce(&mut Env)>;

/// Abstract function that starts a child process
///
/// [`System::new_child_process`] returns a child process starter. You need to
/// pass the parent environment and a task to run in the child.
pub type ChildProcessStarter = Box<dyn FnOnce(&mut Env, ChildProcessTask) -> Pid>;

/// Extension for [`System`]
///
/// This trait provides some extension methods for `System`.
pub trait SystemEx: System {
    /// Moves a file descriptor to [`MIN_INTERNAL_FD`] or larger.
    ///
    /// This function can be used to make sure a file descriptor used by the
    /// shell does not conflict with file descriptors used by the user.
    /// [`MIN_INTERNAL_FD`] is the minimum file descriptor number the shell
    /// uses internally. This function moves the file descriptor to a number
    /// larger than or equal to [`MIN_INTERNAL_FD`].
    ///
    /// If the given file descriptor is less than [`MIN_INTERNAL_FD`], this
    /// function duplicates the file descriptor with [`System::dup`] and closes
    /// the original one. Otherwise, this function does nothing.
    ///
    /// The new file descriptor will have the CLOEXEC flag set when it is
    /// dupped.
    fn move_fd_internal(&mut self, from: Fd) -> Result<Fd> {
        if from >= MIN_INTERNAL_FD {
            return Ok(from);
        }

        let new = self.dup(from, MIN_INTERNAL_FD, true)?;
        self.close(from)?;
        Ok(new)
    }

    /// Writes the whole buffer to the file descriptor.
    ///
    /// This function calls [`System::write`] repeatedly until the whole
    /// buffer is written or an error other than `EINTR` occurs.
    fn write_all(&mut self, fd: Fd, mut buffer: &[u8]) -> Result<()> {
        while !buffer.is_empty() {
            match self.write(fd, buffer) {
                Ok(0) => return Err(Errno::EIO),
                Ok(count) => buffer = &buffer[count..],
                Err(Errno::EINTR) => (),
                Err(errno) => return Err(errno),
            }
        }
        Ok(())
    }

    /// Switches the foreground process group with SIGTTOU blocked.
    ///
    /// This is a convenience function to change the foreground process group
    /// safely. If you call [`tcsetpgrp`](System::tcsetpgrp) from a background
    /// process, the process is stopped by SIGTTOU by default. To prevent this
    /// effect, SIGTTOU must be blocked or ignored when `tcsetpgrp` is called.
    /// This function uses [`sigmask`](System::sigmask) to block SIGTTOU before
    /// calling `tcsetpgrp` and also to restore the original signal mask after
    /// `tcsetpgrp`.
    fn tcsetpgrp_with_block(&mut self, fd: Fd, pgid: Pid) -> Result<()> {
        let mut ttou = SigSet::empty();
        ttou.add(Signal::SIGTTOU);
        let old_mask = self.sigmask(SigmaskHow::SIG_BLOCK, &ttou)?;

        let result = self.tcsetpgrp(fd, pgid);

        let result_2 = self.sigmask(SigmaskHow::SIG_SETMASK, &old_mask);
        result.and(result_2.map(drop))
    }
}

impl<T: System + ?Sized> SystemEx for T {}
