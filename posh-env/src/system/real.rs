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

//! Implementation of `System` that actually interacts with the system.

use super::ChildProcessStarter;
use super::ChildProcessTask;
use super::Errno;
use super::Mode;
use super::OFlag;
use super::Result;
use super::SigSet;
use super::SigmaskHow;
use super::Signal;
use super::SignalHandling;
use super::System;
use super::WaitMode;
use crate::Env;
use crate::io::Fd;
use crate::job::Pid;
use crate::job::ProcessState;
use crate::semantics::ExitStatus;
use nix::sys::signal::SaFlags;
use nix::sys::signal::SigAction;
use nix::sys::signal::SigHandler;
use nix::sys::wait::WaitPidFlag;
use nix::sys::wait::WaitStatus;
use std::ffi::CStr;
use std::ffi::CString;
use std::ffi::OsStr;
use std::ffi::OsString;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::path::PathBuf;

fn is_executable(path: &CStr) -> bool {
    unsafe { libc::faccessat(libc::AT_FDCWD, path.as_ptr(), libc::X_OK, libc::AT_EACCESS) == 0 }
}

fn file_type(path: &CStr) -> Option<libc::mode_t> {
    let mut stat = MaybeUninit::<libc::stat>::uninit();
    unsafe {
        if libc::stat(path.as_ptr(), stat.as_mut_ptr()) != 0 {
            return None;
        }
        Some(stat.assume_init().st_mode & libc::S_IFMT)
    }
}

fn file_id(path: &CStr) -> Option<(libc::dev_t, libc::ino_t)> {
    let mut stat = MaybeUninit::<libc::stat>::uninit();
    unsafe {
        if libc::stat(path.as_ptr(), stat.as_mut_ptr()) != 0 {
            return None;
        }
        let stat = stat.assume_init();
        Some((stat.st_dev, stat.st_ino))
    }
}

/// Retries a system call while it fails with `EINTR`.
fn retry<T, F: FnMut() -> Result<T>>(mut f: F) -> Result<T> {
    loop {
        match f() {
            Err(Errno::EINTR) => (),
            result => return result,
        }
    }
}

/// Implementation of `System` that actually interacts with the system.
///
/// `RealSystem` is an empty `struct` because the underlying operating system
/// manages the system's internal state.
#[derive(Debug)]
pub struct RealSystem(());

impl RealSystem {
    /// Returns an instance of `RealSystem`.
    ///
    /// # Safety
    ///
    /// This function is marked `unsafe` because improper use of `RealSystem`
    /// may lead to undefined behavior. Remember that most operations performed
    /// on the system by [`Env`] are not thread-safe. You should never use
    /// `RealSystem` in a multi-threaded program, and it is your responsibility
    /// to make sure you are using only one instance of `RealSystem` in the
    /// process.
    pub unsafe fn new() -> Self {
        RealSystem(())
    }
}

impl System for RealSystem {
    fn is_executable_file(&self, path: &CStr) -> bool {
        file_type(path) == Some(libc::S_IFREG) && is_executable(path)
    }

    fn is_directory(&self, path: &CStr) -> bool {
        file_type(path) == Some(libc::S_IFDIR)
    }

    fn file_exists(&self, path: &CStr) -> bool {
        file_type(path).is_some()
    }

    fn is_same_file(&self, path1: &CStr, path2: &CStr) -> bool {
        match (file_id(path1), file_id(path2)) {
            (Some(id1), Some(id2)) => id1 == id2,
            _ => false,
        }
    }

    fn pipe(&mut self) -> Result<(Fd, Fd)> {
        let mut fds = [0; 2];
        Errno::result(unsafe { libc::pipe(fds.as_mut_ptr()) })?;
        Ok((Fd(fds[0]), Fd(fds[1])))
    }

    fn dup(&mut self, from: Fd, to_min: Fd, cloexec: bool) -> Result<Fd> {
        let command = if cloexec {
            libc::F_DUPFD_CLOEXEC
        } else {
            libc::F_DUPFD
        };
        Errno::result(unsafe { libc::fcntl(from.0, command, to_min.0) }).map(Fd)
    }

    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd> {
        retry(|| Errno::result(unsafe { libc::dup2(from.0, to.0) }).map(Fd))
    }

    fn open(&mut self, path: &CStr, flags: OFlag, mode: Mode) -> Result<Fd> {
        retry(|| {
            let fd = unsafe {
                libc::open(
                    path.as_ptr(),
                    flags.bits(),
                    libc::c_uint::from(mode.bits()),
                )
            };
            Errno::result(fd).map(Fd)
        })
    }

    fn close(&mut self, fd: Fd) -> Result<()> {
        match Errno::result(unsafe { libc::close(fd.0) }) {
            Ok(_) | Err(Errno::EBADF) | Err(Errno::EINTR) => Ok(()),
            Err(errno) => Err(errno),
        }
    }

    fn isatty(&self, fd: Fd) -> bool {
        unsafe { libc::isatty(fd.0) != 0 }
    }

    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize> {
        retry(|| {
            let count = unsafe { libc::read(fd.0, buffer.as_mut_ptr().cast(), buffer.len()) };
            Errno::result(count).map(|count| count as usize)
        })
    }

    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize> {
        retry(|| {
            let count = unsafe { libc::write(fd.0, buffer.as_ptr().cast(), buffer.len()) };
            Errno::result(count).map(|count| count as usize)
        })
    }

    fn read_dir(&self, path: &CStr) -> Result<Vec<OsString>> {
        let path = Path::new(OsStr::from_bytes(path.to_bytes()));
        let to_errno = |error: std::io::Error| Errno::from_raw(error.raw_os_error().unwrap_or(0));
        std::fs::read_dir(path)
            .map_err(to_errno)?
            .map(|entry| entry.map(|entry| entry.file_name()).map_err(to_errno))
            .collect()
    }

    fn sigmask(&mut self, how: SigmaskHow, signals: &SigSet) -> Result<SigSet> {
        let mut old_mask = SigSet::empty();
        nix::sys::signal::sigprocmask(how, Some(signals), Some(&mut old_mask))?;
        Ok(old_mask)
    }

    fn sigaction(&mut self, signal: Signal, handling: SignalHandling) -> Result<SignalHandling> {
        let handler = match handling {
            SignalHandling::Default => SigHandler::SigDfl,
            SignalHandling::Ignore => SigHandler::SigIgn,
        };
        let new_action = SigAction::new(handler, SaFlags::empty(), SigSet::empty());
        // SAFETY: No signal handler function is installed.
        let old_action = unsafe { nix::sys::signal::sigaction(signal, &new_action) }?;
        Ok(match old_action.handler() {
            SigHandler::SigIgn => SignalHandling::Ignore,
            _ => SignalHandling::Default,
        })
    }

    fn getpid(&self) -> Pid {
        nix::unistd::getpid()
    }

    fn getppid(&self) -> Pid {
        nix::unistd::getppid()
    }

    fn getpgrp(&self) -> Pid {
        nix::unistd::getpgrp()
    }

    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<()> {
        nix::unistd::setpgid(pid, pgid)
    }

    fn tcgetpgrp(&self, fd: Fd) -> Result<Pid> {
        Errno::result(unsafe { libc::tcgetpgrp(fd.0) }).map(Pid::from_raw)
    }

    fn tcsetpgrp(&mut self, fd: Fd, pgid: Pid) -> Result<()> {
        Errno::result(unsafe { libc::tcsetpgrp(fd.0, pgid.as_raw()) }).map(drop)
    }

    /// Creates a new child process.
    ///
    /// This implementation calls the `fork` system call and returns both in the
    /// parent and child process. In the parent, the returned starter ignores
    /// its arguments and returns the child process ID. In the child, the
    /// starter runs the task and exits the process.
    fn new_child_process(&mut self) -> Result<ChildProcessStarter> {
        use nix::unistd::ForkResult::*;
        // SAFETY: The process is single-threaded, which the one-instance
        // contract of RealSystem::new guarantees.
        match unsafe { nix::unistd::fork()? } {
            Parent { child } => Ok(Box::new(move |_env: &mut Env, _task: ChildProcessTask| child)),
            Child => Ok(Box::new(|env: &mut Env, task: ChildProcessTask| {
                task(env);
                std::process::exit(env.exit_status.0)
            })),
        }
    }

    fn wait(&mut self, target: Option<Pid>, mode: WaitMode) -> Result<Option<(Pid, ProcessState)>> {
        let mut options = WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        if mode == WaitMode::NoHang {
            options |= WaitPidFlag::WNOHANG;
        }
        let status = retry(|| nix::sys::wait::waitpid(target, Some(options)))?;
        let state = match status {
            WaitStatus::StillAlive => return Ok(None),
            WaitStatus::Exited(_, code) => ProcessState::Exited(ExitStatus(code)),
            WaitStatus::Signaled(_, signal, core_dump) => {
                ProcessState::Signaled { signal, core_dump }
            }
            WaitStatus::Stopped(_, signal) => ProcessState::Stopped(signal),
            _ => ProcessState::Running,
        };
        let pid = status.pid().ok_or(Errno::ECHILD)?;
        Ok(Some((pid, state)))
    }

    fn execve(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Result<ExitStatus> {
        loop {
            match nix::unistd::execve(path, args, envs) {
                Err(Errno::EINTR) => (),
                Err(errno) => return Err(errno),
                Ok(never) => match never {},
            }
        }
    }

    fn getcwd(&self) -> Result<PathBuf> {
        nix::unistd::getcwd()
    }

    fn chdir(&mut self, path: &CStr) -> Result<()> {
        nix::unistd::chdir(path)
    }
}
