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

//! I/O within a virtual system.

use super::file_system::FileBody;
use super::file_system::Inode;
use nix::errno::Errno;
use std::cell::RefCell;
use std::rc::Rc;

/// State of a file opened for reading and/or writing
#[derive(Debug)]
pub struct OpenFileDescription {
    /// File content and metadata
    file: Rc<RefCell<Inode>>,
    /// Position in bytes to perform next I/O operation at
    offset: usize,
    /// Whether this file is opened for reading
    is_readable: bool,
    /// Whether this file is opened for writing
    is_writable: bool,
    /// Whether this file is opened for appending
    is_appending: bool,
}

impl OpenFileDescription {
    /// Opens a file.
    ///
    /// If the file is a FIFO, its reader and/or writer count is incremented.
    /// The counts are decremented when the open file description is dropped.
    pub fn new(
        file: Rc<RefCell<Inode>>,
        is_readable: bool,
        is_writable: bool,
        is_appending: bool,
    ) -> Self {
        if let FileBody::Fifo {
            readers, writers, ..
        } = &mut file.borrow_mut().body
        {
            if is_readable {
                *readers += 1;
            }
            if is_writable {
                *writers += 1;
            }
        }
        OpenFileDescription {
            file,
            offset: 0,
            is_readable,
            is_writable,
            is_appending,
        }
    }

    /// Returns the file this open file description refers to.
    #[must_use]
    pub fn inode(&self) -> &Rc<RefCell<Inode>> {
        &self.file
    }

    /// Returns true if you can read from this open file description.
    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.is_readable
    }

    /// Returns true if you can write to this open file description.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.is_writable
    }

    /// Reads from this open file description.
    ///
    /// Returns the number of bytes successfully read.
    /// Reading an empty pipe fails with `EAGAIN` while the pipe has writers
    /// and returns 0 otherwise.
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Errno> {
        if !self.is_readable {
            return Err(Errno::EBADF);
        }
        match &mut self.file.borrow_mut().body {
            FileBody::Regular { content, .. } | FileBody::Terminal { content } => {
                let len = content.len();
                if self.offset >= len {
                    return Ok(0);
                }
                let limit = len.min(self.offset + buffer.len());
                let src = &content[self.offset..limit];
                let count = src.len();
                buffer[..count].copy_from_slice(src);
                self.offset += count;
                Ok(count)
            }
            FileBody::Fifo {
                content, writers, ..
            } => {
                if content.is_empty() {
                    return if *writers > 0 {
                        Err(Errno::EAGAIN)
                    } else {
                        Ok(0)
                    };
                }
                let count = content.len().min(buffer.len());
                for (dst, src) in buffer.iter_mut().zip(content.drain(..count)) {
                    *dst = src;
                }
                Ok(count)
            }
            FileBody::Directory { .. } => Err(Errno::EISDIR),
        }
    }

    /// Writes to this open file description.
    ///
    /// Returns the number of bytes successfully written.
    /// Writing to a pipe that has no readers fails with `EPIPE`.
    pub fn write(&mut self, buffer: &[u8]) -> Result<usize, Errno> {
        if !self.is_writable {
            return Err(Errno::EBADF);
        }
        match &mut self.file.borrow_mut().body {
            FileBody::Regular { content, .. } | FileBody::Terminal { content } => {
                let len = content.len();
                if self.is_appending {
                    self.offset = len;
                }
                if self.offset > len {
                    content.resize(self.offset, 0);
                }
                let count = buffer.len();
                let end = self.offset + count;
                let overwrite = end.min(content.len());
                content[self.offset..overwrite].copy_from_slice(&buffer[..overwrite - self.offset]);
                content.extend_from_slice(&buffer[overwrite - self.offset..]);
                self.offset = end;
                Ok(count)
            }
            FileBody::Fifo {
                content, readers, ..
            } => {
                if *readers == 0 {
                    return Err(Errno::EPIPE);
                }
                content.extend(buffer);
                Ok(buffer.len())
            }
            FileBody::Directory { .. } => Err(Errno::EISDIR),
        }
    }
}

impl Drop for OpenFileDescription {
    fn drop(&mut self) {
        if let FileBody::Fifo {
            readers, writers, ..
        } = &mut self.file.borrow_mut().body
        {
            if self.is_readable {
                *readers -= 1;
            }
            if self.is_writable {
                *writers -= 1;
            }
        }
    }
}

/// State of a file descriptor
#[derive(Clone, Debug)]
pub struct FdBody {
    /// Underlying open file description
    pub open_file_description: Rc<RefCell<OpenFileDescription>>,
    /// Whether the file descriptor is closed on exec
    pub cloexec: bool,
}

impl PartialEq for FdBody {
    fn eq(&self, rhs: &Self) -> bool {
        Rc::ptr_eq(&self.open_file_description, &rhs.open_file_description)
            && self.cloexec == rhs.cloexec
    }
}

impl Eq for FdBody {}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn regular_file_read_and_write() {
        let file = Rc::new(RefCell::new(Inode::new("hello")));
        let mut ofd = OpenFileDescription::new(Rc::clone(&file), true, true, false);

        let mut buffer = [0; 3];
        assert_eq!(ofd.read(&mut buffer), Ok(3));
        assert_eq!(&buffer, b"hel");

        assert_eq!(ofd.write(b"P!!"), Ok(3));
        assert_matches!(&file.borrow().body, FileBody::Regular { content, .. } => {
            assert_eq!(content, b"helP!!");
        });
        assert_eq!(ofd.read(&mut buffer), Ok(0));
    }

    #[test]
    fn appending_write_goes_to_end() {
        let file = Rc::new(RefCell::new(Inode::new("abc")));
        let mut ofd = OpenFileDescription::new(Rc::clone(&file), false, true, true);
        assert_eq!(ofd.write(b"de"), Ok(2));
        assert_matches!(&file.borrow().body, FileBody::Regular { content, .. } => {
            assert_eq!(content, b"abcde");
        });
    }

    #[test]
    fn access_mode_is_checked() {
        let file = Rc::new(RefCell::new(Inode::new("abc")));
        let mut reader = OpenFileDescription::new(Rc::clone(&file), true, false, false);
        let mut writer = OpenFileDescription::new(file, false, true, false);
        assert_eq!(reader.write(b"x"), Err(Errno::EBADF));
        assert_eq!(writer.read(&mut [0; 1]), Err(Errno::EBADF));
    }

    #[test]
    fn fifo_counts_and_end_of_file() {
        let fifo = Rc::new(RefCell::new(Inode::fifo()));
        let mut reader = OpenFileDescription::new(Rc::clone(&fifo), true, false, false);
        let mut writer = OpenFileDescription::new(Rc::clone(&fifo), false, true, false);

        let mut buffer = [0; 4];
        assert_eq!(reader.read(&mut buffer), Err(Errno::EAGAIN));
        assert_eq!(writer.write(b"ok"), Ok(2));
        assert_eq!(reader.read(&mut buffer), Ok(2));
        assert_eq!(&buffer[..2], b"ok");

        drop(writer);
        assert_eq!(reader.read(&mut buffer), Ok(0));
        assert_matches!(&fifo.borrow().body, FileBody::Fifo { readers: 1, writers: 0, .. });
    }

    #[test]
    fn writing_to_fifo_without_readers() {
        let fifo = Rc::new(RefCell::new(Inode::fifo()));
        let mut writer = OpenFileDescription::new(fifo, false, true, false);
        assert_eq!(writer.write(b"x"), Err(Errno::EPIPE));
    }
}
