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

//! Processes in a virtual system.

use super::io::FdBody;
use crate::io::Fd;
use crate::job::Pid;
use crate::job::ProcessState;
use crate::system::SignalHandling;
use nix::sys::signal::SigSet;
use nix::sys::signal::SigmaskHow;
use nix::sys::signal::Signal;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::ffi::CString;
use std::path::PathBuf;

/// Process image in a virtual system
#[derive(Clone, Debug)]
pub struct Process {
    /// Process ID of the parent process
    pub(crate) ppid: Pid,

    /// Process group ID of this process
    pub(crate) pgid: Pid,

    /// Set of file descriptors open in this process
    pub(crate) fds: BTreeMap<Fd, FdBody>,

    /// Working directory path
    pub(crate) cwd: PathBuf,

    /// Execution state of the process
    pub(crate) state: ProcessState,

    /// True when `state` has changed but not yet reported to the parent
    /// process.
    ///
    /// The change of `state` is reported when the parent `wait`s for this
    /// process.
    state_has_changed: bool,

    /// Current signal handlings
    signal_handlings: HashMap<Signal, SignalHandling>,

    /// Set of blocked signals
    blocked_signals: SigSet,

    /// Copy of arguments passed to [`execve`](crate::System::execve)
    pub(crate) last_exec: Option<(CString, Vec<CString>, Vec<CString>)>,
}

/// Finds the minimum available FD.
///
/// The returned FD is the minimum that is equal to or greater than `min` and
/// not included in `existings`. Items of `existings` must be sorted.
fn min_unused_fd<'a, I: IntoIterator<Item = &'a Fd>>(min: Fd, existings: I) -> Fd {
    let mut candidate = min;
    for &fd in existings.into_iter().skip_while(|fd| **fd < min) {
        if fd != candidate {
            break;
        }
        candidate = Fd(candidate.0 + 1);
    }
    candidate
}

impl Process {
    /// Creates a new running process that forms its own process group.
    #[must_use]
    pub fn with_parent_and_group(ppid: Pid, pgid: Pid) -> Process {
        Process {
            ppid,
            pgid,
            fds: BTreeMap::new(),
            cwd: PathBuf::from("/"),
            state: ProcessState::Running,
            state_has_changed: false,
            signal_handlings: HashMap::new(),
            blocked_signals: SigSet::empty(),
            last_exec: None,
        }
    }

    /// Creates a new running process as a child of the given parent.
    ///
    /// Some part of the parent process state is copied to the new process.
    #[must_use]
    pub fn fork_from(ppid: Pid, parent: &Process) -> Process {
        let mut child = Self::with_parent_and_group(ppid, parent.pgid);
        child.fds.clone_from(&parent.fds);
        child.cwd.clone_from(&parent.cwd);
        child.signal_handlings.clone_from(&parent.signal_handlings);
        child.blocked_signals = parent.blocked_signals;
        child
    }

    /// Returns the process ID of the parent process.
    #[inline(always)]
    #[must_use]
    pub fn ppid(&self) -> Pid {
        self.ppid
    }

    /// Returns the process group ID of this process.
    #[inline(always)]
    #[must_use]
    pub fn pgid(&self) -> Pid {
        self.pgid
    }

    /// Returns FDs open in this process.
    #[inline(always)]
    #[must_use]
    pub fn fds(&self) -> &BTreeMap<Fd, FdBody> {
        &self.fds
    }

    /// Returns the body for the given FD.
    #[inline]
    #[must_use]
    pub fn get_fd(&self, fd: Fd) -> Option<&FdBody> {
        self.fds.get(&fd)
    }

    /// Assigns the given FD to the body.
    ///
    /// If successful, returns an `Ok` value containing the previous body for
    /// the FD. If the FD is negative, returns `Err(body)`.
    pub fn set_fd(&mut self, fd: Fd, body: FdBody) -> Result<Option<FdBody>, FdBody> {
        if fd.0 < 0 {
            return Err(body);
        }
        Ok(self.fds.insert(fd, body))
    }

    /// Assigns a new FD to the given body.
    ///
    /// The new FD will be the minimum unused FD equal to or greater than
    /// `min_fd`.
    pub fn open_fd_ge(&mut self, min_fd: Fd, body: FdBody) -> Result<Fd, FdBody> {
        let fd = min_unused_fd(min_fd, self.fds.keys());
        self.set_fd(fd, body)?;
        Ok(fd)
    }

    /// Assigns a new FD to the given body.
    ///
    /// The new FD will be the minimum unused FD, which will be returned as an
    /// `Ok` value.
    pub fn open_fd(&mut self, body: FdBody) -> Result<Fd, FdBody> {
        self.open_fd_ge(Fd(0), body)
    }

    /// Removes the FD body for the given FD.
    pub fn close_fd(&mut self, fd: Fd) -> Option<FdBody> {
        self.fds.remove(&fd)
    }

    /// Removes all FD bodies in this process.
    pub fn close_fds(&mut self) {
        self.fds.clear();
    }

    /// Returns the working directory path.
    #[must_use]
    pub fn cwd(&self) -> &PathBuf {
        &self.cwd
    }

    /// Returns the process state.
    #[inline(always)]
    #[must_use]
    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Sets the state of this process.
    ///
    /// If the new state is different from the old state, this function marks
    /// the change as not yet reported and returns true. When the process
    /// terminates, all of its FDs are closed.
    pub fn set_state(&mut self, state: ProcessState) -> bool {
        let old_state = std::mem::replace(&mut self.state, state);
        if old_state == state {
            return false;
        }
        self.state_has_changed = true;
        if !state.is_alive() {
            self.close_fds();
        }
        true
    }

    /// Returns true if a new state has been [set](Self::set_state) but not
    /// yet [taken](Self::take_state).
    #[must_use]
    pub fn state_has_changed(&self) -> bool {
        self.state_has_changed
    }

    /// Returns the current state and clears the `state_has_changed` flag.
    pub fn take_state(&mut self) -> ProcessState {
        self.state_has_changed = false;
        self.state
    }

    /// Returns the currently blocked signals.
    #[must_use]
    pub fn blocked_signals(&self) -> &SigSet {
        &self.blocked_signals
    }

    /// Updates the signal blocking mask and returns the old mask.
    pub fn block_signals(&mut self, how: SigmaskHow, signals: &SigSet) -> SigSet {
        let old_mask = self.blocked_signals;
        match how {
            SigmaskHow::SIG_SETMASK => self.blocked_signals = *signals,
            SigmaskHow::SIG_BLOCK => {
                for signal in Signal::iterator().filter(|s| signals.contains(*s)) {
                    self.blocked_signals.add(signal);
                }
            }
            _ => {
                for signal in Signal::iterator().filter(|s| signals.contains(*s)) {
                    self.blocked_signals.remove(signal);
                }
            }
        }
        old_mask
    }

    /// Returns the current handling for the signal.
    #[must_use]
    pub fn signal_handling(&self, signal: Signal) -> SignalHandling {
        self.signal_handlings
            .get(&signal)
            .copied()
            .unwrap_or_default()
    }

    /// Sets a new handling for the signal and returns the old one.
    pub fn set_signal_handling(
        &mut self,
        signal: Signal,
        handling: SignalHandling,
    ) -> SignalHandling {
        self.signal_handlings
            .insert(signal, handling)
            .unwrap_or_default()
    }

    /// Delivers a signal to this process.
    ///
    /// Blocked and ignored signals have no effect. `SIGCHLD` and `SIGCONT`
    /// are ignored by default. Stop signals stop the process, and any other
    /// signal terminates it. Returns true if the process state changed.
    pub fn raise_signal(&mut self, signal: Signal) -> bool {
        if self.blocked_signals.contains(signal)
            || self.signal_handling(signal) == SignalHandling::Ignore
        {
            return false;
        }
        match signal {
            Signal::SIGCHLD | Signal::SIGCONT | Signal::SIGWINCH | Signal::SIGURG => false,
            Signal::SIGSTOP | Signal::SIGTSTP | Signal::SIGTTIN | Signal::SIGTTOU => {
                self.set_state(ProcessState::Stopped(signal))
            }
            _ => self.set_state(ProcessState::Signaled {
                signal,
                core_dump: false,
            }),
        }
    }

    /// Returns the arguments to the last call to
    /// [`execve`](crate::System::execve) on this process.
    #[inline(always)]
    #[must_use]
    pub fn last_exec(&self) -> &Option<(CString, Vec<CString>, Vec<CString>)> {
        &self.last_exec
    }
}
