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

//! The `System` host abstraction (spec.md §6 "External interfaces",
//! SPEC_FULL.md §5 "Divergence from the teacher's concurrency model").
//!
//! Unlike the teacher's `async fn`-based `System`, every method here is an
//! ordinary blocking call: the executor is plain synchronous code, and
//! EINTR/trap interleaving is the caller's responsibility (retry loops
//! around `wait`/`read` that consult pending-trap flags, per spec.md
//! §4.5). [`real::RealSystem`] backs this with actual syscalls via `nix`;
//! [`virtual_::VirtualSystem`] is an in-memory test double used only
//! within this workspace's own test suites (SPEC_FULL.md §10 "Test
//! tooling").

pub mod real;
pub mod virtual_;

use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::stat::Mode as StatMode;
use nix::unistd::Pid;
use unix_str::UnixString;
use unix_path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Errno>;

/// What to do with a signal (spec.md §4.5 "Trap dispatcher"); mirrors the
/// teacher's `Disposition` but without the async executor's wakeup
/// bookkeeping.
#[derive(Clone, Copy, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Disposition {
    #[display("default")]
    Default,
    #[display("ignore")]
    Ignore,
    /// Catch the signal; delivery only sets a pending flag the executor
    /// polls at safe points (spec.md §4.5).
    #[display("catch")]
    Catch,
}

/// How a waited-for child ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WaitStatus {
    Exited(Pid, i32),
    Signaled(Pid, Signal),
    Stopped(Pid, Signal),
    /// No state change yet available (non-blocking wait).
    StillRunning,
}

/// The sink `xtrace` writes the expansion of `PS4` plus each traced
/// simple command to (SPEC_FULL.md §10 "Structured logging"). This *is*
/// the shell's only logging surface; there is no `log`/`tracing`
/// dependency.
pub trait TraceSink {
    fn trace(&mut self, line: &str);
}

/// The host-system operations the executor and expander need.
///
/// One trait rather than the teacher's many single-method subtraits:
/// this crate has exactly two implementors and no need for the
/// teacher's fine-grained `dyn`-dispatch composition. `DynClone` lets a
/// `Box<dyn System>` be duplicated for a COPY-scope frame (subshell,
/// background) the same way the teacher's `VirtualSystem::clone_box`
/// does; `RealSystem`'s clone is just another handle since the actual
/// OS state a real `fork` duplicates lives outside this struct.
pub trait System: std::fmt::Debug + dyn_clone::DynClone {
    fn fork(&mut self) -> Result<ForkResult>;
    fn execve(&mut self, path: &Path, args: &[UnixString], envp: &[UnixString]) -> Result<std::convert::Infallible>;
    fn exit(&mut self, code: i32) -> !;
    fn wait(&mut self, pid: Option<Pid>, block: bool) -> Result<WaitStatus>;

    fn pipe(&mut self) -> Result<(i32, i32)>;
    fn dup2(&mut self, from: i32, to: i32) -> Result<i32>;
    fn close(&mut self, fd: i32) -> Result<()>;
    fn open(&mut self, path: &Path, flags: i32, mode: StatMode) -> Result<i32>;
    fn read(&mut self, fd: i32, buf: &mut [u8]) -> Result<usize>;
    fn write(&mut self, fd: i32, buf: &[u8]) -> Result<usize>;
    fn isatty(&self, fd: i32) -> bool;

    fn getcwd(&self) -> Result<PathBuf>;
    fn chdir(&mut self, path: &Path) -> Result<()>;
    fn umask(&mut self, mask: StatMode) -> StatMode;

    fn getpid(&self) -> Pid;
    fn getppid(&self) -> Pid;
    fn setpgid(&mut self, pid: Pid, pgid: Pid) -> Result<()>;
    fn tcsetpgrp(&mut self, fd: i32, pgid: Pid) -> Result<()>;

    fn kill(&mut self, pid: Pid, signal: Option<Signal>) -> Result<()>;
    fn sigaction(&mut self, signal: Signal, disposition: Disposition) -> Result<Disposition>;

    /// `PATH`-relative existence + executable-bit check used by command
    /// resolution (spec.md §4.3 "Command resolution precedence").
    fn is_executable_file(&self, path: &Path) -> bool;

    fn trace_sink(&mut self) -> &mut dyn TraceSink;
}

dyn_clone::clone_trait_object!(System);

/// Outcome of [`System::fork`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ForkResult {
    Parent(Pid),
    Child,
}
