// This file is part of posh, a POSIX-conformant command-shell interpreter
// core.
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

//! An in-memory [`System`] test double (SPEC_FULL.md §10 "Test tooling").
//!
//! `VirtualSystem` never touches the real OS: files live in a `HashMap`,
//! pipes are a byte queue shared between their read and write ends, and
//! `fork` just hands out the next simulated pid without actually cloning
//! a process. It exists only so the lexer, expander, frame-policy and
//! executor invariants can be unit-tested in this workspace.

use super::{Disposition, ForkResult, System, TraceSink, WaitStatus};
use nix::sys::signal::Signal;
use nix::sys::stat::Mode as StatMode;
use nix::unistd::Pid;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use unix_str::UnixString;
use unix_path::{Path, PathBuf};

#[derive(Clone, Debug, Default)]
struct OpenFile {
    content: Vec<u8>,
    read_pos: usize,
}

#[derive(Clone, Debug)]
enum FdBody {
    File(OpenFile),
    /// Both ends of a pipe share the same queue; `PipeRead`/`PipeWrite`
    /// only gate which operation (`read`/`write`) is valid on this fd.
    PipeRead(Rc<RefCell<VecDeque<u8>>>),
    PipeWrite(Rc<RefCell<VecDeque<u8>>>),
    /// Write end of stdout/stderr-style capture used by tests that only
    /// care what got written.
    Capture(Vec<u8>),
}

#[derive(Clone, Debug, Default)]
struct RecordingTraceSink {
    lines: Vec<String>,
}

impl TraceSink for RecordingTraceSink {
    fn trace(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

/// A simulated host. Cloning produces an independent copy, mirroring the
/// COPY-scope semantics a real `fork` gives a subshell (spec.md §4.4).
#[derive(Clone, Debug)]
pub struct VirtualSystem {
    files: HashMap<PathBuf, Vec<u8>>,
    executables: std::collections::HashSet<PathBuf>,
    fds: HashMap<i32, FdBody>,
    next_fd: i32,
    cwd: PathBuf,
    umask: u32,
    pid: Pid,
    next_pid: i32,
    dispositions: HashMap<Signal, Disposition>,
    trace: RecordingTraceSink,
}

impl VirtualSystem {
    #[must_use]
    pub fn new() -> Self {
        VirtualSystem {
            files: HashMap::new(),
            executables: std::collections::HashSet::new(),
            fds: HashMap::new(),
            next_fd: 3,
            cwd: PathBuf::from("/"),
            umask: 0o022,
            pid: Pid::from_raw(1000),
            next_pid: 1001,
            dispositions: HashMap::new(),
            trace: RecordingTraceSink::default(),
        }
    }

    /// Seeds a regular file's content for `open`/`read` to find.
    pub fn put_file(&mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), content.into());
    }

    /// Marks a path as passing `is_executable_file`, independent of
    /// whether it has file content (matching `PATH` lookup needing only
    /// the executable bit, not a read).
    pub fn mark_executable(&mut self, path: impl Into<PathBuf>) {
        self.executables.insert(path.into());
    }

    /// Bytes written to a capture-mode fd (e.g. stdout after a redirect
    /// was wired to a fresh fd by a test).
    #[must_use]
    pub fn captured(&self, fd: i32) -> Vec<u8> {
        match self.fds.get(&fd) {
            Some(FdBody::Capture(bytes)) => bytes.clone(),
            _ => Vec::new(),
        }
    }

    /// Opens a capture-mode fd a test can later inspect with
    /// [`VirtualSystem::captured`].
    pub fn open_capture(&mut self) -> i32 {
        let fd = self.next_fd;
        self.next_fd += 1;
        self.fds.insert(fd, FdBody::Capture(Vec::new()));
        fd
    }

    pub fn traced_lines(&self) -> &[String] {
        &self.trace.lines
    }
}

impl Default for VirtualSystem {
    fn default() -> Self {
        VirtualSystem::new()
    }
}

impl System for VirtualSystem {
    fn fork(&mut self) -> super::Result<ForkResult> {
        let pid = Pid::from_raw(self.next_pid);
        self.next_pid += 1;
        Ok(ForkResult::Parent(pid))
    }

    fn execve(&mut self, path: &Path, _args: &[UnixString], _envp: &[UnixString]) -> super::Result<std::convert::Infallible> {
        if self.executables.contains(path) || self.files.contains_key(path) {
            // A real `execve` never returns on success; the virtual one
            // has no process image to replace, so tests observe success
            // only through `is_executable_file` beforehand and treat
            // reaching here as a logic error in the caller.
            unreachable!("VirtualSystem::execve called on an executable path; caller should not continue")
        } else {
            Err(nix::errno::Errno::ENOENT)
        }
    }

    fn exit(&mut self, _code: i32) -> ! {
        panic!("VirtualSystem::exit called in a test; intercept ExitStatus instead of letting the executor call exit()")
    }

    fn wait(&mut self, _pid: Option<Pid>, _block: bool) -> super::Result<WaitStatus> {
        Ok(WaitStatus::StillRunning)
    }

    fn pipe(&mut self) -> super::Result<(i32, i32)> {
        let read_fd = self.next_fd;
        self.next_fd += 1;
        let write_fd = self.next_fd;
        self.next_fd += 1;
        let queue = Rc::new(RefCell::new(VecDeque::new()));
        self.fds.insert(read_fd, FdBody::PipeRead(Rc::clone(&queue)));
        self.fds.insert(write_fd, FdBody::PipeWrite(queue));
        Ok((read_fd, write_fd))
    }

    fn dup2(&mut self, from: i32, to: i32) -> super::Result<i32> {
        let body = self.fds.get(&from).cloned().ok_or(nix::errno::Errno::EBADF)?;
        self.fds.insert(to, body);
        Ok(to)
    }

    fn close(&mut self, fd: i32) -> super::Result<()> {
        self.fds.remove(&fd);
        Ok(())
    }

    fn open(&mut self, path: &Path, _flags: i32, _mode: StatMode) -> super::Result<i32> {
        let content = self.files.get(path).cloned().ok_or(nix::errno::Errno::ENOENT)?;
        let fd = self.next_fd;
        self.next_fd += 1;
        self.fds.insert(fd, FdBody::File(OpenFile { content, read_pos: 0 }));
        Ok(fd)
    }

    fn read(&mut self, fd: i32, buf: &mut [u8]) -> super::Result<usize> {
        match self.fds.get_mut(&fd) {
            Some(FdBody::File(file)) => {
                let remaining = &file.content[file.read_pos..];
                let n = remaining.len().min(buf.len());
                buf[..n].copy_from_slice(&remaining[..n]);
                file.read_pos += n;
                Ok(n)
            }
            Some(FdBody::PipeRead(queue)) => {
                let mut queue = queue.borrow_mut();
                let n = queue.len().min(buf.len());
                for slot in buf.iter_mut().take(n) {
                    *slot = queue.pop_front().unwrap();
                }
                Ok(n)
            }
            _ => Err(nix::errno::Errno::EBADF),
        }
    }

    fn write(&mut self, fd: i32, buf: &[u8]) -> super::Result<usize> {
        match self.fds.get_mut(&fd) {
            Some(FdBody::Capture(bytes)) => {
                bytes.extend_from_slice(buf);
                Ok(buf.len())
            }
            Some(FdBody::PipeWrite(queue)) => {
                queue.borrow_mut().extend(buf.iter().copied());
                Ok(buf.len())
            }
            _ => Err(nix::errno::Errno::EBADF),
        }
    }

    fn isatty(&self, _fd: i32) -> bool {
        false
    }

    fn getcwd(&self) -> super::Result<PathBuf> {
        Ok(self.cwd.clone())
    }

    fn chdir(&mut self, path: &Path) -> super::Result<()> {
        self.cwd = path.to_path_buf();
        Ok(())
    }

    fn umask(&mut self, mask: StatMode) -> StatMode {
        let old = self.umask;
        self.umask = mask.bits();
        StatMode::from_bits_truncate(old)
    }

    fn getpid(&self) -> Pid {
        self.pid
    }

    fn getppid(&self) -> Pid {
        Pid::from_raw(1)
    }

    fn setpgid(&mut self, _pid: Pid, _pgid: Pid) -> super::Result<()> {
        Ok(())
    }

    fn tcsetpgrp(&mut self, _fd: i32, _pgid: Pid) -> super::Result<()> {
        Ok(())
    }

    fn kill(&mut self, _pid: Pid, _signal: Option<Signal>) -> super::Result<()> {
        Ok(())
    }

    fn sigaction(&mut self, signal: Signal, disposition: Disposition) -> super::Result<Disposition> {
        Ok(self
            .dispositions
            .insert(signal, disposition)
            .unwrap_or(Disposition::Default))
    }

    fn is_executable_file(&self, path: &Path) -> bool {
        self.executables.contains(path)
    }

    fn trace_sink(&mut self) -> &mut dyn TraceSink {
        &mut self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_capture() {
        let mut system = VirtualSystem::new();
        let fd = system.open_capture();
        system.write(fd, b"hello").unwrap();
        assert_eq!(system.captured(fd), b"hello");
    }

    #[test]
    fn open_missing_file_is_enoent() {
        let mut system = VirtualSystem::new();
        let err = system.open(Path::new("/nope"), 0, StatMode::empty()).unwrap_err();
        assert_eq!(err, nix::errno::Errno::ENOENT);
    }

    #[test]
    fn seeded_file_reads_back() {
        let mut system = VirtualSystem::new();
        system.put_file("/etc/motd", b"hi".to_vec());
        let fd = system.open(Path::new("/etc/motd"), 0, StatMode::empty()).unwrap();
        let mut buf = [0u8; 8];
        let n = system.read(fd, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"hi");
    }

    #[test]
    fn chdir_updates_getcwd() {
        let mut system = VirtualSystem::new();
        system.chdir(Path::new("/tmp")).unwrap();
        assert_eq!(system.getcwd().unwrap(), PathBuf::from("/tmp"));
    }

    #[test]
    fn pipe_write_is_visible_to_its_read_end() {
        let mut system = VirtualSystem::new();
        let (reader, writer) = system.pipe().unwrap();
        system.write(writer, b"hi").unwrap();
        let mut buf = [0u8; 8];
        let n = system.read(reader, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"hi");
    }

    #[test]
    fn fork_hands_out_increasing_pids() {
        let mut system = VirtualSystem::new();
        let ForkResult::Parent(a) = system.fork().unwrap() else { unreachable!() };
        let ForkResult::Parent(b) = system.fork().unwrap() else { unreachable!() };
        assert_ne!(a, b);
    }
}
