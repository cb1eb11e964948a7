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

//! Native programs for the virtual system
//!
//! The functions in this module create [`NativeProgram`]s that emulate common
//! utilities. [`install_standard_programs`] installs all of them in `/bin`.

use posh_env::io::Fd;
use posh_env::semantics::ExitStatus;
use posh_env::system::r#virtual::{NativeProgram, SystemState, VirtualSystem};
use posh_env::system::{Errno, Mode, OFlag, Signal, System, SystemEx as _};
use std::cell::RefCell;
use std::ffi::CString;
use std::str::FromStr as _;

/// Installs a program at the path.
pub fn install_program(state: &RefCell<SystemState>, path: &str, program: NativeProgram) {
    state.borrow_mut().install_program(path, program);
}

/// Installs all programs of this module in `/bin`.
///
/// This function does not modify the `PATH` variable of any environment.
pub fn install_standard_programs(state: &RefCell<SystemState>) {
    let programs = [
        ("true", true_program()),
        ("false", false_program()),
        ("echo", echo_program()),
        ("cat", cat_program()),
        ("sleep", sleep_program()),
        ("printenv", printenv_program()),
        ("stop", stop_program()),
        ("raise", raise_program()),
    ];
    for (name, program) in programs {
        install_program(state, &format!("/bin/{name}"), program);
    }
}

/// Program that exits successfully
#[must_use]
pub fn true_program() -> NativeProgram {
    NativeProgram::new(|_, _, _| ExitStatus::SUCCESS)
}

/// Program that exits with status 1
#[must_use]
pub fn false_program() -> NativeProgram {
    NativeProgram::new(|_, _, _| ExitStatus::FAILURE)
}

/// Program that prints its operands separated by spaces
#[must_use]
pub fn echo_program() -> NativeProgram {
    NativeProgram::new(|system, args, _| {
        let line = format!("{}\n", args.get(1..).unwrap_or_default().join(" "));
        match system.write_all(Fd::STDOUT, line.as_bytes()) {
            Ok(()) => ExitStatus::SUCCESS,
            Err(_) => ExitStatus::FAILURE,
        }
    })
}

fn copy(system: &mut VirtualSystem, from: Fd) -> Result<(), Errno> {
    let mut buffer = [0; 64];
    loop {
        match system.read(from, &mut buffer) {
            // The virtual system cannot block, so an empty pipe ends the input.
            Ok(0) | Err(Errno::EAGAIN) => return Ok(()),
            Ok(count) => system.write_all(Fd::STDOUT, &buffer[..count])?,
            Err(errno) => return Err(errno),
        }
    }
}

/// Program that copies the standard input or the operand files to the
/// standard output
#[must_use]
pub fn cat_program() -> NativeProgram {
    NativeProgram::new(|system, args, _| {
        let operands = args.get(1..).unwrap_or_default();
        if operands.is_empty() {
            return match copy(system, Fd::STDIN) {
                Ok(()) => ExitStatus::SUCCESS,
                Err(_) => ExitStatus::FAILURE,
            };
        }

        let mut exit_status = ExitStatus::SUCCESS;
        for operand in operands {
            let Ok(path) = CString::new(operand.as_str()) else {
                exit_status = ExitStatus::FAILURE;
                continue;
            };
            let result = system
                .open(&path, OFlag::O_RDONLY, Mode::empty())
                .and_then(|fd| {
                    let result = copy(system, fd);
                    let _ = system.close(fd);
                    result
                });
            if result.is_err() {
                let message = format!("cat: {operand}: cannot read\n");
                let _ = system.write_all(Fd::STDERR, message.as_bytes());
                exit_status = ExitStatus::FAILURE;
            }
        }
        exit_status
    })
}

/// Program that exits immediately, as time does not pass in the virtual
/// system
#[must_use]
pub fn sleep_program() -> NativeProgram {
    NativeProgram::new(|_, _, _| ExitStatus::SUCCESS)
}

/// Program that prints the value of the environment variable named by the
/// operand
///
/// The program exits with status 1 if the variable is not in the
/// environment.
#[must_use]
pub fn printenv_program() -> NativeProgram {
    NativeProgram::new(|system, args, envs| {
        let Some(name) = args.get(1) else {
            return ExitStatus::ERROR;
        };
        let prefix = format!("{name}=");
        match envs.iter().find_map(|env| env.strip_prefix(&prefix)) {
            Some(value) => {
                let line = format!("{value}\n");
                let _ = system.write_all(Fd::STDOUT, line.as_bytes());
                ExitStatus::SUCCESS
            }
            None => ExitStatus::FAILURE,
        }
    })
}

/// Program that stops itself with `SIGTSTP`
///
/// The process remains stopped forever because the virtual system has no
/// way to resume it.
#[must_use]
pub fn stop_program() -> NativeProgram {
    NativeProgram::new(|system, _, _| {
        system.raise_signal(Signal::SIGTSTP);
        ExitStatus::SUCCESS
    })
}

/// Program that sends itself the signal named by the operand
///
/// The operand is a signal name without the `SIG` prefix, such as `INT`.
#[must_use]
pub fn raise_program() -> NativeProgram {
    NativeProgram::new(|system, args, _| {
        let Some(name) = args.get(1) else {
            return ExitStatus::ERROR;
        };
        match Signal::from_str(&format!("SIG{name}")) {
            Ok(signal) => {
                system.raise_signal(signal);
                ExitStatus::SUCCESS
            }
            Err(_) => ExitStatus::ERROR,
        }
    })
}
