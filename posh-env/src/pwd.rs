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

//! Working directory path handling

use crate::Env;
use crate::system::Errno;
use crate::variable::PWD;
use std::ffi::CString;

impl Env {
    /// Tests if the `PWD` variable is correct.
    ///
    /// The variable is correct if its value is an absolute pathname of the
    /// current working directory, possibly including symbolic links, with no
    /// `.` or `..` component.
    fn has_correct_pwd(&self) -> bool {
        let Some(pwd) = self.variables.get_scalar(PWD) else {
            return false;
        };
        if !pwd.starts_with('/') {
            return false;
        }
        let has_dots = pwd
            .split('/')
            .any(|component| component == "." || component == "..");
        if has_dots {
            return false;
        }
        match CString::new(pwd) {
            Ok(pwd) => self.system.is_same_file(&pwd, c"."),
            Err(_) => false,
        }
    }

    /// Updates the `PWD` variable with the current working directory.
    ///
    /// If the value of `PWD` is correct as tested by `has_correct_pwd`, this
    /// function does not modify it. Otherwise, the variable is set to the
    /// result of [`getcwd`](crate::System::getcwd).
    pub fn prepare_pwd(&mut self) -> Result<(), Errno> {
        if !self.has_correct_pwd() {
            let dir = self.system.getcwd()?;
            let dir = dir.into_os_string().into_string().map_err(|_| Errno::EILSEQ)?;
            tracing::debug!(%dir, "resetting PWD");
            self.variables.assign(PWD, dir);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::System as _;
    use crate::VirtualSystem;
    use crate::system::r#virtual::Inode;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn env_in_directory(path: &str) -> Env {
        let mut system = VirtualSystem::new();
        system
            .state
            .borrow_mut()
            .file_system
            .save(format!("{path}/file"), Rc::new(RefCell::new(Inode::new(""))))
            .unwrap();
        system.chdir(&CString::new(path).unwrap()).unwrap();
        Env::with_system(Box::new(system))
    }

    #[test]
    fn prepare_pwd_without_value() {
        let mut env = env_in_directory("/foo/bar");
        env.prepare_pwd().unwrap();
        assert_eq!(env.variables.get_scalar(PWD), Some("/foo/bar"));
    }

    #[test]
    fn prepare_pwd_keeps_correct_value() {
        let mut env = env_in_directory("/foo/bar");
        env.variables.assign(PWD, "/foo//bar/");
        env.prepare_pwd().unwrap();
        assert_eq!(env.variables.get_scalar(PWD), Some("/foo//bar/"));
    }

    #[test]
    fn prepare_pwd_replaces_wrong_value() {
        let mut env = env_in_directory("/foo/bar");
        env.variables.assign(PWD, "/foo");
        env.prepare_pwd().unwrap();
        assert_eq!(env.variables.get_scalar(PWD), Some("/foo/bar"));
    }

    #[test]
    fn prepare_pwd_rejects_dot_components() {
        let mut env = env_in_directory("/foo/bar");
        env.variables.assign(PWD, "/foo/./bar");
        env.prepare_pwd().unwrap();
        assert_eq!(env.variables.get_scalar(PWD), Some("/foo/bar"));
    }
}
