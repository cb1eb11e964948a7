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

//! System simulated in Rust
//!
//! [`VirtualSystem`] is a pure Rust implementation of [`System`] that
//! simulates the behavior of the underlying system without any interaction
//! with the actual system. `VirtualSystem` is used for testing the behavior of
//! the shell in unit tests.
//!
//! A virtual system has a state shared by the processes in it. The
//! [`SystemState`] contains a hierarchical [`FileSystem`], the set of
//! [`Process`]es, the foreground process group of the controlling terminal,
//! and the [native programs](NativeProgram) that can be exec'ed.
//!
//! Child processes run synchronously: the
//! [starter](crate::system::ChildProcessStarter) returned from
//! [`new_child_process`](System::new_child_process) runs the task to
//! completion (or until the process is stopped) before returning to the
//! parent.

mod file_system;
mod io;
mod process;

pub use self::file_system::*;
pub use self::io::*;
pub use self::process::*;
use super::ChildProcessStarter;
use super::Errno;
use super::OFlag;
use super::Result;
use super::SigSet;
use super::SigmaskHow;
use super::Signal;
use super::SignalHandling;
use super::System;
use super::WaitMode;
use crate::io::Fd;
use crate::job::Pid;
use crate::job::ProcessState;
use crate::semantics::ExitStatus;
use std::cell::Ref;
use std::cell::RefCell;
use std::cell::RefMut;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::ffi::CStr;
use std::ffi::CString;
use std::ffi::OsStr;
use std::ffi::OsString;
use std::fmt::Debug;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

/// Simulated system
///
/// A `VirtualSystem` is a handle to a [`SystemState`] combined with the
/// process ID of the process the handle acts for. Cloning a `VirtualSystem`
/// yields another handle to the same state.
#[derive(Clone, Debug)]
pub struct VirtualSystem {
    /// State of the system
    pub state: Rc<RefCell<SystemState>>,

    /// Process ID of the process that is interacting with the system
    pub process_id: Pid,
}

/// Program that runs in place of a native executable file
///
/// The function receives the system of the executing process, the argument
/// strings (including the command name), and the environment strings in
/// `name=value` form. Its return value is the exit status of the process.
#[derive(Clone)]
pub struct NativeProgram(pub Rc<dyn Fn(&mut VirtualSystem, &[String], &[String]) -> ExitStatus>);

impl Debug for NativeProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NativeProgram(_)")
    }
}

impl NativeProgram {
    /// Wraps a function into a native program.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut VirtualSystem, &[String], &[String]) -> ExitStatus + 'static,
    {
        NativeProgram(Rc::new(f))
    }
}

/// State of the virtual system
#[derive(Clone, Debug, Default)]
pub struct SystemState {
    /// Processes running in the system
    pub processes: BTreeMap<Pid, Process>,

    /// Foreground process group of the controlling terminal
    ///
    /// `None` means there is no controlling terminal.
    pub foreground: Option<Pid>,

    /// File system
    pub file_system: FileSystem,

    /// Programs run by [`execve`](System::execve), indexed by path
    pub programs: HashMap<PathBuf, NativeProgram>,
}

impl SystemState {
    /// Returns the content of the regular file or terminal at the path.
    ///
    /// Returns `None` if there is no such file.
    #[must_use]
    pub fn file_content<P: AsRef<Path>>(&self, path: P) -> Option<Vec<u8>> {
        let file = self.file_system.get(path).ok()?;
        match &file.borrow().body {
            FileBody::Regular { content, .. } | FileBody::Terminal { content } => {
                Some(content.clone())
            }
            _ => None,
        }
    }

    /// Saves a native executable file and registers the program for it.
    pub fn install_program<P: AsRef<Path>>(&mut self, path: P, program: NativeProgram) {
        let path = FileSystem::canonical_path(path.as_ref());
        let inode = Rc::new(RefCell::new(Inode::native_executable()));
        // Parent components are created as needed, so this cannot fail for
        // a fresh path.
        let _ = self.file_system.save(&path, inode);
        self.programs.insert(path, program);
    }
}

impl VirtualSystem {
    /// Creates a virtual system with an almost empty state.
    ///
    /// The system contains one process whose process ID is 2 and parent
    /// process ID is 1. The process forms its own process group.
    ///
    /// The file system contains empty regular files `/dev/stdin`,
    /// `/dev/stdout`, and `/dev/stderr`, opened in the process as FDs 0, 1,
    /// and 2, respectively. The `/tmp` directory exists and is empty. The
    /// working directory is `/`.
    ///
    /// There is no controlling terminal. See
    /// `posh_env_test_helper::stub_tty` to simulate one.
    #[must_use]
    pub fn new() -> VirtualSystem {
        let process_id = Pid::from_raw(2);
        let mut state = SystemState::default();
        let mut process = Process::with_parent_and_group(Pid::from_raw(1), process_id);

        for (fd, path, readable) in [
            (Fd::STDIN, "/dev/stdin", true),
            (Fd::STDOUT, "/dev/stdout", false),
            (Fd::STDERR, "/dev/stderr", false),
        ] {
            let file = Rc::new(RefCell::new(Inode::new(Vec::new())));
            let _ = state.file_system.save(path, Rc::clone(&file));
            let ofd = OpenFileDescription::new(file, readable, !readable, !readable);
            let body = FdBody {
                open_file_description: Rc::new(RefCell::new(ofd)),
                cloexec: false,
            };
            let _ = process.set_fd(fd, body);
        }
        let _ = state
            .file_system
            .save("/tmp", Rc::new(RefCell::new(Inode::directory())));

        state.processes.insert(process_id, process);

        let state = Rc::new(RefCell::new(state));
        VirtualSystem { state, process_id }
    }

    /// Finds the current process from the system state.
    ///
    /// # Panics
    ///
    /// This function will panic if it cannot find a process having
    /// `self.process_id`.
    #[must_use]
    pub fn current_process(&self) -> Ref<'_, Process> {
        Ref::map(self.state.borrow(), |state| {
            &state.processes[&self.process_id]
        })
    }

    /// Finds the current process from the system state.
    ///
    /// # Panics
    ///
    /// This function will panic if it cannot find a process having
    /// `self.process_id`.
    #[must_use]
    pub fn current_process_mut(&mut self) -> RefMut<'_, Process> {
        RefMut::map(self.state.borrow_mut(), |state| {
            state
                .processes
                .get_mut(&self.process_id)
                .expect("current process should exist")
        })
    }

    /// Calls the given closure passing the open file description for the FD.
    ///
    /// Returns `Err(Errno::EBADF)` if the FD is not open.
    fn with_open_file_description<F, R>(&self, fd: Fd, f: F) -> Result<R>
    where
        F: FnOnce(&mut OpenFileDescription) -> Result<R>,
    {
        let process = self.current_process();
        let body = process.get_fd(fd).ok_or(Errno::EBADF)?;
        let ofd = Rc::clone(&body.open_file_description);
        drop(process);
        let mut ofd = ofd.borrow_mut();
        f(&mut ofd)
    }

    /// Converts a path to an absolute path relative to the working directory.
    fn resolve_path(&self, path: &CStr) -> PathBuf {
        let path = Path::new(OsStr::from_bytes(path.to_bytes()));
        let absolute = self.current_process().cwd().join(path);
        FileSystem::canonical_path(&absolute)
    }

    /// Returns the file at the path.
    fn resolve_existing_file(&self, path: &CStr) -> Result<Rc<RefCell<Inode>>> {
        let path = self.resolve_path(path);
        self.state.borrow().file_system.get(path)
    }

    /// Delivers a signal to the current process.
    pub fn raise_signal(&mut self, signal: Signal) {
        self.current_process_mut().raise_signal(signal);
    }

    /// Returns true if the current process has been stopped or terminated.
    #[must_use]
    pub fn is_current_process_suspended(&self) -> bool {
        self.current_process().state() != ProcessState::Running
    }
}

impl Default for VirtualSystem {
    fn default() -> Self {
        VirtualSystem::new()
    }
}

fn to_string(s: &CStr) -> String {
    String::from_utf8_lossy(s.to_bytes()).into_owned()
}

impl System for VirtualSystem {
    fn is_executable_file(&self, path: &CStr) -> bool {
        self.resolve_existing_file(path).is_ok_and(|file| {
            let file = file.borrow();
            matches!(file.body, FileBody::Regular { .. }) && file.permissions.is_executable()
        })
    }

    fn is_directory(&self, path: &CStr) -> bool {
        self.resolve_existing_file(path)
            .is_ok_and(|file| matches!(file.borrow().body, FileBody::Directory { .. }))
    }

    fn file_exists(&self, path: &CStr) -> bool {
        self.resolve_existing_file(path).is_ok()
    }

    fn is_same_file(&self, path1: &CStr, path2: &CStr) -> bool {
        match (self.resolve_existing_file(path1), self.resolve_existing_file(path2)) {
            (Ok(file1), Ok(file2)) => Rc::ptr_eq(&file1, &file2),
            _ => false,
        }
    }

    fn pipe(&mut self) -> Result<(Fd, Fd)> {
        let file = Rc::new(RefCell::new(Inode::fifo()));
        let reader = OpenFileDescription::new(Rc::clone(&file), true, false, false);
        let writer = OpenFileDescription::new(file, false, true, false);
        let reader = FdBody {
            open_file_description: Rc::new(RefCell::new(reader)),
            cloexec: false,
        };
        let writer = FdBody {
            open_file_description: Rc::new(RefCell::new(writer)),
            cloexec: false,
        };

        let mut process = self.current_process_mut();
        let reader = process.open_fd(reader).map_err(|_| Errno::EMFILE)?;
        let writer = match process.open_fd(writer) {
            Ok(writer) => writer,
            Err(_) => {
                process.close_fd(reader);
                return Err(Errno::EMFILE);
            }
        };
        Ok((reader, writer))
    }

    fn dup(&mut self, from: Fd, to_min: Fd, cloexec: bool) -> Result<Fd> {
        let mut process = self.current_process_mut();
        let mut body = process.get_fd(from).ok_or(Errno::EBADF)?.clone();
        body.cloexec = cloexec;
        process.open_fd_ge(to_min, body).map_err(|_| Errno::EMFILE)
    }

    fn dup2(&mut self, from: Fd, to: Fd) -> Result<Fd> {
        let mut process = self.current_process_mut();
        let mut body = process.get_fd(from).ok_or(Errno::EBADF)?.clone();
        if from != to {
            body.cloexec = false;
            process.set_fd(to, body).map_err(|_| Errno::EBADF)?;
        }
        Ok(to)
    }

    fn open(&mut self, path: &CStr, flags: OFlag, _mode: super::Mode) -> Result<Fd> {
        let path = self.resolve_path(path);
        let access_mode = flags & OFlag::O_ACCMODE;
        let (is_readable, is_writable) = if access_mode == OFlag::O_RDONLY {
            (true, false)
        } else if access_mode == OFlag::O_WRONLY {
            (false, true)
        } else {
            (true, true)
        };

        let existing = self.state.borrow().file_system.get(&path);
        let file = match existing {
            Ok(file) => {
                if flags.contains(OFlag::O_CREAT | OFlag::O_EXCL) {
                    return Err(Errno::EEXIST);
                }
                file
            }
            Err(Errno::ENOENT) if flags.contains(OFlag::O_CREAT) => {
                let parent = path.parent().unwrap_or(Path::new("/"));
                let parent = self.state.borrow().file_system.get(parent)?;
                if !matches!(parent.borrow().body, FileBody::Directory { .. }) {
                    return Err(Errno::ENOTDIR);
                }
                let file = Rc::new(RefCell::new(Inode::new(Vec::new())));
                self.state
                    .borrow_mut()
                    .file_system
                    .save(&path, Rc::clone(&file))?;
                file
            }
            Err(errno) => return Err(errno),
        };

        {
            let mut inode = file.borrow_mut();
            match &mut inode.body {
                FileBody::Directory { .. } if is_writable => return Err(Errno::EISDIR),
                FileBody::Regular { content, .. } if flags.contains(OFlag::O_TRUNC) => {
                    content.clear()
                }
                _ => (),
            }
        }

        let ofd = OpenFileDescription::new(
            file,
            is_readable,
            is_writable,
            flags.contains(OFlag::O_APPEND),
        );
        let body = FdBody {
            open_file_description: Rc::new(RefCell::new(ofd)),
            cloexec: flags.contains(OFlag::O_CLOEXEC),
        };
        self.current_process_mut()
            .open_fd(body)
            .map_err(|_| Errno::EMFILE)
    }

    fn close(&mut self, fd: Fd) -> Result<()> {
        self.current_process_mut().close_fd(fd);
        Ok(())
    }

    fn isatty(&self, fd: Fd) -> bool {
        self.with_open_file_description(fd, |ofd| {
            Ok(matches!(ofd.inode().borrow().body, FileBody::Terminal { .. }))
        })
        .unwrap_or(false)
    }

    fn read(&mut self, fd: Fd, buffer: &mut [u8]) -> Result<usize> {
        self.with_open_file_description(fd, |ofd| ofd.read(buffer))
    }

    fn write(&mut self, fd: Fd, buffer: &[u8]) -> Result<usize> {
        let result = self.with_open_file_description(fd, |ofd| ofd.write(buffer));
        if result == Err(Errno::EPIPE) {
            self.raise_signal(Signal::SIGPIPE);
        }
        result
    }

    fn read_dir(&self, path: &CStr) -> Result<Vec<OsString>> {
        let dir = self.resolve_existing_file(path)?;
        let dir = dir.borrow();
        match &dir.body {
            FileBody::Directory { files } => Ok(files.keys().cloned().collect()),
            _ => Err(Errno::ENOTDIR),
        }
    }

    fn sigmask(&mut self, how: SigmaskHow, signals: &SigSet) -> Result<SigSet> {
        Ok(self.current_process_mut().block_signals(how, signals))
    }

    fn sigaction(&mut self, signal: Signal, handling: SignalHandling) -> Result<SignalHandling> {
        Ok(self
            .current_process_mut()
            .set_signal_handling(signal, handling))
    }

    fn getpid(&self) -> Pid {
        self.process_id
    }

    fn getppid(&self) -> Pid {
        self.current_process().ppid()
    }

    fn getpgrp(&self) -> Pid {
        self.current_process().pgid()
    }

    /// Modifies the process group ID of a process.
    ///
    /// The current implementation does not yet support the concept of
    /// sessions.
    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<()> {
        if pgid.as_raw() < 0 {
            return Err(Errno::EINVAL);
        }
        let pid = if pid.as_raw() == 0 {
            self.process_id
        } else {
            pid
        };
        let pgid = if pgid.as_raw() == 0 { pid } else { pgid };

        let mut state = self.state.borrow_mut();
        if pgid != pid && !state.processes.values().any(|p| p.pgid == pgid) {
            return Err(Errno::EPERM);
        }
        let process = state.processes.get_mut(&pid).ok_or(Errno::ESRCH)?;
        if pid != self.process_id && process.ppid != self.process_id {
            return Err(Errno::ESRCH);
        }
        if process.last_exec.is_some() {
            return Err(Errno::EACCES);
        }
        process.pgid = pgid;
        Ok(())
    }

    fn tcgetpgrp(&self, fd: Fd) -> Result<Pid> {
        self.with_open_file_description(fd, |_| Ok(()))?;
        self.state.borrow().foreground.ok_or(Errno::ENOTTY)
    }

    /// Switches the foreground process group.
    ///
    /// If the calling process is not in the foreground, is not blocking
    /// `SIGTTOU`, and is not ignoring it, the process is stopped and this
    /// function fails with `EINTR`.
    fn tcsetpgrp(&mut self, fd: Fd, pgid: Pid) -> Result<()> {
        if !self.isatty(fd) {
            return Err(Errno::ENOTTY);
        }

        let mut state = self.state.borrow_mut();
        if !state.processes.values().any(|p| p.pgid == pgid) {
            return Err(Errno::EPERM);
        }

        let foreground = state.foreground;
        let process = state
            .processes
            .get_mut(&self.process_id)
            .ok_or(Errno::ESRCH)?;
        let in_foreground = foreground.is_none_or(|foreground| foreground == process.pgid);
        if !in_foreground && process.raise_signal(Signal::SIGTTOU) {
            return Err(Errno::EINTR);
        }

        state.foreground = Some(pgid);
        Ok(())
    }

    /// Creates a new child process.
    ///
    /// The returned starter runs the task synchronously in the child and
    /// then returns the child's process ID. When the task returns without the
    /// child being stopped or killed, the child exits with the exit status
    /// left in its `Env`.
    fn new_child_process(&mut self) -> Result<ChildProcessStarter> {
        let mut state = self.state.borrow_mut();
        let process_id = state
            .processes
            .keys()
            .next_back()
            .map_or(Pid::from_raw(2), |pid| Pid::from_raw(pid.as_raw() + 1));
        let parent = state
            .processes
            .get(&self.process_id)
            .ok_or(Errno::ESRCH)?;
        let child = Process::fork_from(self.process_id, parent);
        state.processes.insert(process_id, child);
        drop(state);

        let state = Rc::clone(&self.state);
        Ok(Box::new(move |parent_env, task| {
            let system = VirtualSystem { state, process_id };
            let mut child_env = parent_env.clone_with_system(Box::new(system.clone()));
            task(&mut child_env);

            let exit_status = child_env.exit_status;
            let mut state = system.state.borrow_mut();
            if let Some(process) = state.processes.get_mut(&process_id) {
                if process.state() == ProcessState::Running {
                    process.set_state(ProcessState::Exited(exit_status));
                }
            }
            process_id
        }))
    }

    /// Reports a state change of a child process.
    ///
    /// The virtual system cannot block, so [`WaitMode::Block`] behaves like
    /// [`WaitMode::NoHang`] except that it fails with `ECHILD` instead of
    /// returning `Ok(None)`.
    fn wait(&mut self, target: Option<Pid>, mode: WaitMode) -> Result<Option<(Pid, ProcessState)>> {
        let parent_pid = self.process_id;
        let mut state = self.state.borrow_mut();
        let mut children = state.processes.iter_mut().filter(|(pid, process)| {
            process.ppid == parent_pid
                && target.is_none_or(|target| **pid == target)
                && (process.state().is_alive() || process.state_has_changed())
        });

        let mut any_child = false;
        for (pid, process) in &mut children {
            any_child = true;
            if process.state_has_changed() {
                return Ok(Some((*pid, process.take_state())));
            }
        }

        match (any_child, mode) {
            (true, WaitMode::NoHang) => Ok(None),
            _ => Err(Errno::ECHILD),
        }
    }

    /// Runs the native program registered for the file.
    ///
    /// The file must be an executable regular file. A file that is not a
    /// native executable fails with `ENOEXEC`. FDs with the `cloexec` flag
    /// are closed before the program runs.
    fn execve(&mut self, path: &CStr, args: &[CString], envs: &[CString]) -> Result<ExitStatus> {
        let file = self.resolve_existing_file(path)?;
        let is_native_executable = {
            let file = file.borrow();
            if !file.permissions.is_executable() {
                return Err(Errno::EACCES);
            }
            match file.body {
                FileBody::Regular {
                    is_native_executable,
                    ..
                } => is_native_executable,
                FileBody::Directory { .. } => return Err(Errno::EACCES),
                _ => false,
            }
        };
        if !is_native_executable {
            return Err(Errno::ENOEXEC);
        }

        let resolved = self.resolve_path(path);
        let program = self
            .state
            .borrow()
            .programs
            .get(&resolved)
            .cloned()
            .ok_or(Errno::ENOSYS)?;

        {
            let mut process = self.current_process_mut();
            process.last_exec = Some((path.to_owned(), args.to_owned(), envs.to_owned()));
            process.fds.retain(|_, body| !body.cloexec);
        }

        let args = args.iter().map(|arg| to_string(arg)).collect::<Vec<_>>();
        let envs = envs.iter().map(|env| to_string(env)).collect::<Vec<_>>();
        Ok((program.0)(self, &args, &envs))
    }

    fn getcwd(&self) -> Result<PathBuf> {
        Ok(self.current_process().cwd().clone())
    }

    fn chdir(&mut self, path: &CStr) -> Result<()> {
        let resolved = self.resolve_path(path);
        let file = self.state.borrow().file_system.get(&resolved)?;
        if !matches!(file.borrow().body, FileBody::Directory { .. }) {
            return Err(Errno::ENOTDIR);
        }
        self.current_process_mut().cwd = resolved;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Env;
    use crate::system::SystemEx;
    use assert_matches::assert_matches;

    fn read_all(system: &mut VirtualSystem, fd: Fd) -> Vec<u8> {
        let mut result = Vec::new();
        let mut buffer = [0; 16];
        loop {
            match system.read(fd, &mut buffer) {
                Ok(0) | Err(_) => return result,
                Ok(count) => result.extend_from_slice(&buffer[..count]),
            }
        }
    }

    #[test]
    fn standard_fds_are_open() {
        let mut system = VirtualSystem::new();
        system.write_all(Fd::STDOUT, b"out").unwrap();
        system.write_all(Fd::STDERR, b"err").unwrap();
        let state = system.state.borrow();
        assert_eq!(state.file_content("/dev/stdout").unwrap(), b"out");
        assert_eq!(state.file_content("/dev/stderr").unwrap(), b"err");
    }

    #[test]
    fn pipe_transfers_bytes() {
        let mut system = VirtualSystem::new();
        let (reader, writer) = system.pipe().unwrap();
        assert_eq!(reader, Fd(3));
        assert_eq!(writer, Fd(4));

        system.write_all(writer, b"hello").unwrap();
        system.close(writer).unwrap();
        assert_eq!(read_all(&mut system, reader), b"hello");
    }

    #[test]
    fn writing_to_broken_pipe_raises_sigpipe() {
        let mut system = VirtualSystem::new();
        let (reader, writer) = system.pipe().unwrap();
        system.close(reader).unwrap();
        assert_eq!(system.write(writer, b"x"), Err(Errno::EPIPE));
        assert_eq!(
            system.current_process().state(),
            ProcessState::Signaled {
                signal: Signal::SIGPIPE,
                core_dump: false
            }
        );
    }

    #[test]
    fn dup_respects_minimum_and_cloexec() {
        let mut system = VirtualSystem::new();
        let fd = system.dup(Fd::STDOUT, Fd(10), true).unwrap();
        assert_eq!(fd, Fd(10));
        assert!(system.current_process().get_fd(fd).unwrap().cloexec);

        let fd = system.dup2(fd, Fd(5)).unwrap();
        assert_eq!(fd, Fd(5));
        assert!(!system.current_process().get_fd(fd).unwrap().cloexec);

        assert_eq!(system.dup(Fd(7), Fd(0), false), Err(Errno::EBADF));
    }

    #[test]
    fn open_creates_and_truncates() {
        let mut system = VirtualSystem::new();
        let flags = OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC;
        let fd = system
            .open(c"/tmp/file", flags, super::super::Mode::empty())
            .unwrap();
        assert_eq!(fd, Fd(3));
        system.write_all(fd, b"first").unwrap();
        system.close(fd).unwrap();

        let fd = system
            .open(c"/tmp/file", flags, super::super::Mode::empty())
            .unwrap();
        system.write_all(fd, b"2").unwrap();
        assert_eq!(system.state.borrow().file_content("/tmp/file").unwrap(), b"2");

        let result = system.open(
            c"/tmp/file",
            flags | OFlag::O_EXCL,
            super::super::Mode::empty(),
        );
        assert_eq!(result, Err(Errno::EEXIST));
        let result = system.open(c"/no/such/dir/file", flags, super::super::Mode::empty());
        assert_eq!(result, Err(Errno::ENOENT));
    }

    #[test]
    fn open_relative_to_working_directory() {
        let mut system = VirtualSystem::new();
        system.chdir(c"/tmp").unwrap();
        assert_eq!(system.getcwd().unwrap(), Path::new("/tmp"));
        let fd = system
            .open(
                c"rel",
                OFlag::O_WRONLY | OFlag::O_CREAT,
                super::super::Mode::empty(),
            )
            .unwrap();
        system.close(fd).unwrap();
        assert!(system.state.borrow().file_content("/tmp/rel").is_some());

        assert_eq!(system.chdir(c"rel"), Err(Errno::ENOTDIR));
        assert_eq!(system.chdir(c"/missing"), Err(Errno::ENOENT));
        system.chdir(c"..").unwrap();
        assert_eq!(system.getcwd().unwrap(), Path::new("/"));
    }

    #[test]
    fn child_process_runs_task_and_exits() {
        let system = VirtualSystem::new();
        let state = Rc::clone(&system.state);
        let mut env = Env::with_system(Box::new(system));
        let starter = env.system.new_child_process().unwrap();
        let child = starter(
            &mut env,
            Box::new(|env: &mut Env| {
                env.system.write_all(Fd::STDOUT, b"child").unwrap();
                env.exit_status = ExitStatus(7);
            }),
        );
        assert_eq!(child, Pid::from_raw(3));
        assert_eq!(state.borrow().file_content("/dev/stdout").unwrap(), b"child");

        let result = env.system.wait(None, WaitMode::NoHang);
        assert_eq!(result, Ok(Some((child, ProcessState::Exited(ExitStatus(7))))));
        let result = env.system.wait(None, WaitMode::NoHang);
        assert_eq!(result, Err(Errno::ECHILD));
    }

    #[test]
    fn setpgid_and_getpgrp() {
        let system = VirtualSystem::new();
        let mut env = Env::with_system(Box::new(system));
        let starter = env.system.new_child_process().unwrap();
        let child = starter(
            &mut env,
            Box::new(|env: &mut Env| {
                env.system
                    .setpgid(Pid::from_raw(0), Pid::from_raw(0))
                    .unwrap();
                assert_eq!(env.system.getpgrp(), env.system.getpid());
            }),
        );
        assert_eq!(
            env.system.setpgid(child, Pid::from_raw(42)),
            Err(Errno::EPERM)
        );
        assert_eq!(env.system.getpgrp(), Pid::from_raw(2));
    }

    #[test]
    fn tcsetpgrp_from_background_stops_process() {
        let mut system = VirtualSystem::new();
        {
            let mut state = system.state.borrow_mut();
            let _ = state
                .file_system
                .save("/dev/tty", Rc::new(RefCell::new(Inode::terminal())));
            state.foreground = Some(Pid::from_raw(1));
            state
                .processes
                .insert(Pid::from_raw(1), Process::with_parent_and_group(Pid::from_raw(0), Pid::from_raw(1)));
        }
        let tty = system
            .open(c"/dev/tty", OFlag::O_RDWR, super::super::Mode::empty())
            .unwrap();
        assert!(system.isatty(tty));
        assert!(!system.isatty(Fd::STDOUT));

        assert_eq!(system.tcsetpgrp_with_block(tty, Pid::from_raw(2)), Ok(()));
        assert_eq!(system.tcgetpgrp(tty), Ok(Pid::from_raw(2)));
        assert_eq!(system.current_process().state(), ProcessState::Running);

        system.state.borrow_mut().foreground = Some(Pid::from_raw(1));
        assert_eq!(system.tcsetpgrp(tty, Pid::from_raw(2)), Err(Errno::EINTR));
        assert_eq!(
            system.current_process().state(),
            ProcessState::Stopped(Signal::SIGTTOU)
        );
    }

    #[test]
    fn execve_runs_native_program() {
        let mut system = VirtualSystem::new();
        system.state.borrow_mut().install_program(
            "/bin/greet",
            NativeProgram::new(|system, args, _envs| {
                let message = format!("hello {}\n", args[1..].join(" "));
                let _ = system.write_all(Fd::STDOUT, message.as_bytes());
                ExitStatus(3)
            }),
        );
        assert!(system.is_executable_file(c"/bin/greet"));
        assert!(!system.is_executable_file(c"/bin"));
        assert!(system.is_directory(c"/bin"));

        let args = [c"greet".to_owned(), c"world".to_owned()];
        let result = system.execve(c"/bin/greet", &args, &[]);
        assert_eq!(result, Ok(ExitStatus(3)));
        assert_eq!(
            system.state.borrow().file_content("/dev/stdout").unwrap(),
            b"hello world\n"
        );
        assert_matches!(system.current_process().last_exec(), Some((path, _, _)) => {
            assert_eq!(path.as_c_str(), c"/bin/greet");
        });
    }

    #[test]
    fn execve_errors() {
        let mut system = VirtualSystem::new();
        {
            let mut state = system.state.borrow_mut();
            let mut script = Inode::new("echo");
            script.permissions = Mode(0o755);
            let _ = state
                .file_system
                .save("/script", Rc::new(RefCell::new(script)));
            let _ = state
                .file_system
                .save("/data", Rc::new(RefCell::new(Inode::new("x"))));
        }
        assert_eq!(system.execve(c"/missing", &[], &[]), Err(Errno::ENOENT));
        assert_eq!(system.execve(c"/data", &[], &[]), Err(Errno::EACCES));
        assert_eq!(system.execve(c"/script", &[], &[]), Err(Errno::ENOEXEC));
    }

    #[test]
    fn read_dir_lists_entries() {
        let mut system = VirtualSystem::new();
        let fd = system
            .open(
                c"/tmp/a",
                OFlag::O_WRONLY | OFlag::O_CREAT,
                super::super::Mode::empty(),
            )
            .unwrap();
        system.close(fd).unwrap();
        let entries = system.read_dir(c"/tmp").unwrap();
        assert_eq!(entries, [OsString::from("a")]);
        assert_eq!(system.read_dir(c"/tmp/a"), Err(Errno::ENOTDIR));
    }
}
