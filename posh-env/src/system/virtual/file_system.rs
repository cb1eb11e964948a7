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

//! File system in a virtual system.

use nix::errno::Errno;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::fmt::Debug;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

/// Collection of files.
///
/// The file system is a tree of directories rooted at [`root`](Self::root).
/// Paths passed to the methods of `FileSystem` are interpreted relative to the
/// root directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileSystem {
    /// Root directory
    pub root: Rc<RefCell<Inode>>,
}

/// The default file system contains an empty root directory.
impl Default for FileSystem {
    fn default() -> Self {
        let root = Rc::new(RefCell::new(Inode::directory()));
        FileSystem { root }
    }
}

/// Resolves `.` and `..` components lexically.
#[must_use]
pub fn normalize(path: &Path) -> Vec<OsString> {
    let mut names = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => (),
            Component::ParentDir => {
                names.pop();
            }
            Component::Normal(name) => names.push(name.to_owned()),
        }
    }
    names
}

impl FileSystem {
    /// Saves a file.
    ///
    /// Missing parent directories are created. If there is an existing file at
    /// the specified path, this function replaces it with the new file and
    /// returns the old one, regardless of permissions.
    ///
    /// Fails with `ENOTDIR` if a parent component is not a directory, and with
    /// `EINVAL` if the path names the root directory.
    pub fn save<P: AsRef<Path>>(
        &mut self,
        path: P,
        content: Rc<RefCell<Inode>>,
    ) -> Result<Option<Rc<RefCell<Inode>>>, Errno> {
        let mut names = normalize(path.as_ref());
        let name = names.pop().ok_or(Errno::EINVAL)?;

        let mut dir = Rc::clone(&self.root);
        for component in names {
            let next = match &mut dir.borrow_mut().body {
                FileBody::Directory { files } => Rc::clone(
                    files
                        .entry(component)
                        .or_insert_with(|| Rc::new(RefCell::new(Inode::directory()))),
                ),
                _ => return Err(Errno::ENOTDIR),
            };
            dir = next;
        }

        match &mut dir.borrow_mut().body {
            FileBody::Directory { files } => Ok(files.insert(name, content)),
            _ => Err(Errno::ENOTDIR),
        }
    }

    /// Returns a reference to the existing file at the specified path.
    ///
    /// Fails with `ENOENT` if there is no such file, and with `ENOTDIR` if a
    /// parent component is not a directory.
    pub fn get<P: AsRef<Path>>(&self, path: P) -> Result<Rc<RefCell<Inode>>, Errno> {
        let mut file = Rc::clone(&self.root);
        for name in normalize(path.as_ref()) {
            let next = match &file.borrow().body {
                FileBody::Directory { files } => {
                    Rc::clone(files.get(&name).ok_or(Errno::ENOENT)?)
                }
                _ => return Err(Errno::ENOTDIR),
            };
            file = next;
        }
        Ok(file)
    }

    /// Returns the absolute path with `.` and `..` resolved.
    #[must_use]
    pub fn canonical_path(path: &Path) -> PathBuf {
        let mut result = PathBuf::from("/");
        result.extend(normalize(path));
        result
    }
}

/// File on the file system.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Inode {
    /// File content.
    pub body: FileBody,
    /// Access permissions.
    pub permissions: Mode,
}

impl Inode {
    /// Creates a regular file with the given content.
    pub fn new<T: Into<Vec<u8>>>(bytes: T) -> Self {
        Inode {
            body: FileBody::new(bytes),
            permissions: Mode::default(),
        }
    }

    /// Creates an empty directory.
    #[must_use]
    pub fn directory() -> Self {
        Inode {
            body: FileBody::Directory {
                files: HashMap::new(),
            },
            permissions: Mode(0o755),
        }
    }

    /// Creates an empty FIFO with no readers or writers.
    #[must_use]
    pub fn fifo() -> Self {
        Inode {
            body: FileBody::Fifo {
                content: VecDeque::new(),
                readers: 0,
                writers: 0,
            },
            permissions: Mode(0o600),
        }
    }

    /// Creates a terminal device.
    #[must_use]
    pub fn terminal() -> Self {
        Inode {
            body: FileBody::Terminal {
                content: Vec::new(),
            },
            permissions: Mode(0o620),
        }
    }

    /// Creates an executable file that runs a native program.
    ///
    /// The program itself is registered in
    /// [`SystemState::programs`](super::SystemState::programs).
    #[must_use]
    pub fn native_executable() -> Self {
        Inode {
            body: FileBody::Regular {
                content: Vec::new(),
                is_native_executable: true,
            },
            permissions: Mode(0o755),
        }
    }
}

/// Filetype-specific content of a file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FileBody {
    /// Regular file
    Regular {
        /// File content.
        content: Vec<u8>,
        /// Whether this file is a native binary that can be exec'ed.
        is_native_executable: bool,
    },
    /// Directory
    Directory {
        /// Files contained in this directory.
        ///
        /// The keys of the hashmap are filenames without any parent directory
        /// components. The hashmap does not contain "." or "..".
        files: HashMap<OsString, Rc<RefCell<Inode>>>,
    },
    /// Named or unnamed pipe
    Fifo {
        /// Bytes written but not yet read
        content: VecDeque<u8>,
        /// Number of open file descriptions reading from the pipe
        readers: usize,
        /// Number of open file descriptions writing to the pipe
        writers: usize,
    },
    /// Terminal device
    ///
    /// A terminal behaves like a regular file except that
    /// [`isatty`](crate::system::System::isatty) is true for it.
    Terminal {
        /// Bytes written to the terminal
        content: Vec<u8>,
    },
}

/// The default file body is an empty regular file.
impl Default for FileBody {
    fn default() -> Self {
        FileBody::Regular {
            content: Vec::default(),
            is_native_executable: bool::default(),
        }
    }
}

impl FileBody {
    /// Creates a regular file body with the given content.
    pub fn new<T: Into<Vec<u8>>>(bytes: T) -> Self {
        FileBody::Regular {
            content: bytes.into(),
            is_native_executable: false,
        }
    }
}

/// File permission bits.
///
/// The `Default` mode is `0o644`, not `0o000`.
#[derive(Copy, Clone, Eq, Hash, PartialEq)]
pub struct Mode(pub u32);

impl Debug for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mode({:#o})", self.0)
    }
}

impl Default for Mode {
    fn default() -> Mode {
        Mode(0o644)
    }
}

impl Mode {
    /// Whether any of the execute permission bits is set.
    #[must_use]
    pub const fn is_executable(self) -> bool {
        self.0 & 0o111 != 0
    }
}
