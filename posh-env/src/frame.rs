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

//! The execution frame / policy stack (spec.md §4.4 "Frame & policy").
//!
//! A [`Frame`] is the unit of nested execution context: every compound
//! command, subshell, function call and trap action runs with its own
//! frame. What varies between frame kinds is entirely captured by a
//! static, per-kind [`FramePolicy`] that frame construction consults to
//! decide which stores are freshly allocated, deep-copied or shared with
//! the parent. The executor (out of this crate's scope) is the only code
//! that pushes and pops frames; this module only supplies the mechanics.

use crate::alias::AliasSet;
use crate::fd::FdTable;
use crate::function::FunctionSet;
use crate::option::OptionSet;
use crate::positional::Positional;
use crate::trap::TrapSet;
use crate::variable::VariableSet;
use std::cell::RefCell;
use std::rc::Rc;
use unix_path::PathBuf;

/// How a store is materialized when a child frame is pushed (spec.md
/// §4.4 "variables.scope" and its siblings).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
    /// A fresh, independent store, initialized empty (or specially, per
    /// the owning field's own rules — see `Frame::new_child`).
    Own,
    /// A deep copy of the parent's store at push time; later writes in
    /// either frame are invisible to the other.
    Copy,
    /// The very same store as the parent; writes in either frame are
    /// visible in both (spec.md §5 "Writes ... visible to the caller
    /// (SHARE scope)").
    Share,
}

/// Where `return`/`break`/`continue` propagation is allowed to stop
/// (spec.md §4.4 "flow.return_behavior", "flow.loop_control").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlowTarget {
    /// This frame is a hard boundary; the signal cannot cross it
    /// (out-of-loop `break` past a function boundary is an error).
    Disallowed,
    /// This frame neither stops nor blocks the signal; it keeps
    /// unwinding toward the parent.
    Transparent,
    /// This frame is where the signal stops.
    Target,
}

/// The kind of construct a frame was pushed for (spec.md §4.4, enumerated
/// list: "top-level, subshell, brace-group, function, loop, trap,
/// background, pipeline-orchestrator, pipeline-member, dot-script, eval").
///
/// `Display` (via `strum`) gives diagnostics like "break: not in a loop"
/// a ready-made name for the frame that rejected the signal.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FrameKind {
    TopLevel,
    Subshell,
    BraceGroup,
    Function,
    Loop,
    Trap,
    Background,
    PipelineOrchestrator,
    PipelineMember,
    DotScript,
    Eval,
}

/// A frame kind's static policy (spec.md §4.4's field table). Values are
/// read by [`Frame::new_child`] to decide store materialization; they do
/// not themselves perform any allocation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FramePolicy {
    pub forks: bool,
    pub is_pipeline_member: bool,

    pub variables_scope: Scope,
    /// COPY-scope background jobs only copy exported variables into the
    /// child's snapshot (spec.md "variables.copy_exports_only").
    pub variables_copy_exports_only: bool,
    pub has_locals: bool,

    pub positional_scope: Scope,
    pub positional_can_override: bool,

    pub fds_scope: Scope,
    pub traps_scope: Scope,
    pub resets_non_ignored_traps: bool,
    pub exit_trap_runs: bool,

    pub options_scope: Scope,
    pub errexit_enabled: bool,

    pub cwd_scope: Scope,
    pub umask_scope: Scope,
    pub functions_scope: Scope,
    pub aliases_scope: Scope,

    pub return_behavior: FlowTarget,
    pub loop_control: FlowTarget,

    pub terminates_process: bool,
    pub affects_parent_status: bool,

    pub is_subshell: bool,
    pub is_background: bool,
}

impl FrameKind {
    /// The static policy for this kind (spec.md §4.4's table; narrative
    /// per-construct detail cross-checked against §4.3's "Subshell",
    /// "Function definition / call" and "Loops" paragraphs).
    #[must_use]
    pub fn policy(self) -> FramePolicy {
        use FlowTarget::{Disallowed, Target, Transparent};
        use FrameKind::{
            Background, BraceGroup, DotScript, Eval, Function, Loop, PipelineMember,
            PipelineOrchestrator, Subshell, Trap, TopLevel,
        };
        use Scope::{Copy, Own, Share};

        match self {
            TopLevel => FramePolicy {
                forks: false,
                is_pipeline_member: false,
                variables_scope: Own,
                variables_copy_exports_only: false,
                has_locals: false,
                positional_scope: Own,
                positional_can_override: false,
                fds_scope: Own,
                traps_scope: Own,
                resets_non_ignored_traps: false,
                exit_trap_runs: true,
                options_scope: Own,
                errexit_enabled: true,
                cwd_scope: Own,
                umask_scope: Own,
                functions_scope: Own,
                aliases_scope: Own,
                return_behavior: Disallowed,
                loop_control: Disallowed,
                terminates_process: true,
                affects_parent_status: false,
                is_subshell: false,
                is_background: false,
            },
            Subshell => FramePolicy {
                forks: true,
                is_pipeline_member: false,
                variables_scope: Copy,
                variables_copy_exports_only: false,
                has_locals: false,
                positional_scope: Copy,
                positional_can_override: false,
                fds_scope: Copy,
                traps_scope: Copy,
                resets_non_ignored_traps: true,
                exit_trap_runs: true,
                options_scope: Copy,
                errexit_enabled: true,
                cwd_scope: Copy,
                umask_scope: Copy,
                functions_scope: Copy,
                aliases_scope: Copy,
                return_behavior: Disallowed,
                loop_control: Disallowed,
                terminates_process: true,
                affects_parent_status: true,
                is_subshell: true,
                is_background: false,
            },
            Background => FramePolicy {
                forks: true,
                is_pipeline_member: false,
                variables_scope: Copy,
                variables_copy_exports_only: true,
                has_locals: false,
                positional_scope: Copy,
                positional_can_override: false,
                fds_scope: Copy,
                traps_scope: Copy,
                resets_non_ignored_traps: true,
                exit_trap_runs: true,
                options_scope: Copy,
                errexit_enabled: true,
                cwd_scope: Copy,
                umask_scope: Copy,
                functions_scope: Copy,
                aliases_scope: Copy,
                return_behavior: Disallowed,
                loop_control: Disallowed,
                terminates_process: true,
                affects_parent_status: false,
                is_subshell: false,
                is_background: true,
            },
            BraceGroup => FramePolicy {
                forks: false,
                is_pipeline_member: false,
                variables_scope: Share,
                variables_copy_exports_only: false,
                has_locals: false,
                positional_scope: Share,
                positional_can_override: false,
                fds_scope: Share,
                traps_scope: Share,
                resets_non_ignored_traps: false,
                exit_trap_runs: false,
                options_scope: Share,
                errexit_enabled: true,
                cwd_scope: Share,
                umask_scope: Share,
                functions_scope: Share,
                aliases_scope: Share,
                return_behavior: Transparent,
                loop_control: Transparent,
                terminates_process: false,
                affects_parent_status: true,
                is_subshell: false,
                is_background: false,
            },
            Function => FramePolicy {
                forks: false,
                is_pipeline_member: false,
                variables_scope: Share,
                variables_copy_exports_only: false,
                has_locals: true,
                positional_scope: Own,
                positional_can_override: false,
                fds_scope: Share,
                traps_scope: Share,
                resets_non_ignored_traps: false,
                exit_trap_runs: false,
                options_scope: Share,
                errexit_enabled: true,
                cwd_scope: Share,
                umask_scope: Share,
                functions_scope: Share,
                aliases_scope: Share,
                return_behavior: Target,
                loop_control: Disallowed,
                terminates_process: false,
                affects_parent_status: true,
                is_subshell: false,
                is_background: false,
            },
            Loop => FramePolicy {
                forks: false,
                is_pipeline_member: false,
                variables_scope: Share,
                variables_copy_exports_only: false,
                has_locals: false,
                positional_scope: Share,
                positional_can_override: false,
                fds_scope: Share,
                traps_scope: Share,
                resets_non_ignored_traps: false,
                exit_trap_runs: false,
                options_scope: Share,
                errexit_enabled: true,
                cwd_scope: Share,
                umask_scope: Share,
                functions_scope: Share,
                aliases_scope: Share,
                return_behavior: Transparent,
                loop_control: Target,
                terminates_process: false,
                affects_parent_status: true,
                is_subshell: false,
                is_background: false,
            },
            Trap => FramePolicy {
                forks: false,
                is_pipeline_member: false,
                variables_scope: Share,
                variables_copy_exports_only: false,
                has_locals: false,
                positional_scope: Share,
                positional_can_override: false,
                fds_scope: Share,
                traps_scope: Share,
                resets_non_ignored_traps: false,
                exit_trap_runs: false,
                // errexit is forced off while running a trap action
                // (spec.md §4.3 "set -e"; §4.4 "options.errexit_enabled:
                // false only for trap frames").
                options_scope: Share,
                errexit_enabled: false,
                cwd_scope: Share,
                umask_scope: Share,
                functions_scope: Share,
                aliases_scope: Share,
                return_behavior: Disallowed,
                loop_control: Disallowed,
                terminates_process: false,
                affects_parent_status: false,
                is_subshell: false,
                is_background: false,
            },
            PipelineOrchestrator => FramePolicy {
                forks: false,
                is_pipeline_member: false,
                variables_scope: Share,
                variables_copy_exports_only: false,
                has_locals: false,
                positional_scope: Share,
                positional_can_override: false,
                fds_scope: Share,
                traps_scope: Share,
                resets_non_ignored_traps: false,
                exit_trap_runs: false,
                options_scope: Share,
                errexit_enabled: true,
                cwd_scope: Share,
                umask_scope: Share,
                functions_scope: Share,
                aliases_scope: Share,
                return_behavior: Transparent,
                loop_control: Transparent,
                terminates_process: false,
                affects_parent_status: true,
                is_subshell: false,
                is_background: false,
            },
            PipelineMember => FramePolicy {
                forks: true,
                is_pipeline_member: true,
                variables_scope: Copy,
                variables_copy_exports_only: false,
                has_locals: false,
                positional_scope: Copy,
                positional_can_override: false,
                fds_scope: Copy,
                traps_scope: Copy,
                resets_non_ignored_traps: true,
                exit_trap_runs: true,
                options_scope: Copy,
                errexit_enabled: true,
                cwd_scope: Copy,
                umask_scope: Copy,
                functions_scope: Copy,
                aliases_scope: Copy,
                return_behavior: Disallowed,
                loop_control: Disallowed,
                terminates_process: true,
                affects_parent_status: true,
                is_subshell: true,
                is_background: false,
            },
            DotScript => FramePolicy {
                forks: false,
                is_pipeline_member: false,
                variables_scope: Share,
                variables_copy_exports_only: false,
                has_locals: false,
                positional_scope: Own,
                positional_can_override: true,
                fds_scope: Share,
                traps_scope: Share,
                resets_non_ignored_traps: false,
                exit_trap_runs: false,
                options_scope: Share,
                errexit_enabled: true,
                cwd_scope: Share,
                umask_scope: Share,
                functions_scope: Share,
                aliases_scope: Share,
                return_behavior: Target,
                loop_control: Transparent,
                terminates_process: false,
                affects_parent_status: true,
                is_subshell: false,
                is_background: false,
            },
            Eval => FramePolicy {
                forks: false,
                is_pipeline_member: false,
                variables_scope: Share,
                variables_copy_exports_only: false,
                has_locals: false,
                positional_scope: Share,
                positional_can_override: false,
                fds_scope: Share,
                traps_scope: Share,
                resets_non_ignored_traps: false,
                exit_trap_runs: false,
                options_scope: Share,
                errexit_enabled: true,
                cwd_scope: Share,
                umask_scope: Share,
                functions_scope: Share,
                aliases_scope: Share,
                return_behavior: Transparent,
                loop_control: Transparent,
                terminates_process: false,
                affects_parent_status: true,
                is_subshell: false,
                is_background: false,
            },
        }
    }
}

/// A tagged control-flow signal in flight, as produced by `break`,
/// `continue` or `return` and propagated per the frame policy's
/// `loop_control`/`return_behavior` (spec.md §4.3 "Control-flow
/// signalling").
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pending {
    Break(u32),
    Continue(u32),
    Return(i32),
}

/// One execution context (spec.md §4.4 "Frame"). Stores are held behind
/// `Rc<RefCell<_>>` so SHARE scope is a pointer clone and mutations
/// through a child frame are observed by whichever ancestor actually
/// owns the store.
#[derive(Clone, Debug)]
pub struct Frame {
    kind: FrameKind,
    policy: FramePolicy,
    parent: std::option::Option<Rc<Frame>>,

    variables: Rc<RefCell<VariableSet>>,
    positional: Rc<RefCell<Positional>>,
    fds: Rc<RefCell<FdTable>>,
    traps: Rc<RefCell<TrapSet>>,
    options: Rc<RefCell<OptionSet>>,
    functions: Rc<RefCell<FunctionSet>>,
    aliases: Rc<RefCell<AliasSet>>,
    cwd: Rc<RefCell<PathBuf>>,

    pending: std::option::Option<Pending>,
    last_exit_status: i32,
}

/// Clones a store per its [`Scope`]: `Own` gets a caller-supplied fresh
/// value, `Share` clones the `Rc` pointer, `Copy` clones the pointee into
/// a new `Rc`.
fn materialize<T: Clone>(scope: Scope, parent: &Rc<RefCell<T>>, fresh: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    match scope {
        Scope::Own => Rc::new(RefCell::new(fresh())),
        Scope::Share => Rc::clone(parent),
        Scope::Copy => Rc::new(RefCell::new(parent.borrow().clone())),
    }
}

impl Frame {
    /// Builds the root frame of a shell process, populating variables
    /// from the inherited environment and positional parameters from
    /// `argv` (spec.md §4.4 "variables.init_from_envp",
    /// "positional.arg0: init-from-shell-argv").
    #[must_use]
    pub fn new_top_level<I, K, V>(arg0: impl Into<String>, args: Vec<String>, envp: I, cwd: PathBuf) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut variables = VariableSet::new();
        variables.init_from_envp(envp);
        Frame {
            kind: FrameKind::TopLevel,
            policy: FrameKind::TopLevel.policy(),
            parent: None,
            variables: Rc::new(RefCell::new(variables)),
            positional: Rc::new(RefCell::new(Positional::new(arg0, args))),
            fds: Rc::new(RefCell::new(FdTable::new())),
            traps: Rc::new(RefCell::new(TrapSet::new())),
            options: Rc::new(RefCell::new(OptionSet::new())),
            functions: Rc::new(RefCell::new(FunctionSet::new())),
            aliases: Rc::new(RefCell::new(AliasSet::new())),
            cwd: Rc::new(RefCell::new(cwd)),
            pending: None,
            last_exit_status: 0,
        }
    }

    /// Pushes a child frame of `kind` under `parent`, materializing each
    /// store according to the kind's policy.
    ///
    /// `call_args`, when `Some`, overlays the child's positional
    /// parameters regardless of the policy's `positional_scope` — this
    /// is the function-call ("positional.argn_init: from-call-args") and
    /// dot-script-with-extra-args ("positional.can_override") special
    /// case; every other frame kind passes `None` and gets the scope's
    /// ordinary materialization.
    #[must_use]
    pub fn new_child(parent: &Rc<Frame>, kind: FrameKind, call_args: std::option::Option<Vec<String>>) -> Self {
        let policy = kind.policy();
        let arg0 = parent.positional.borrow().arg0().to_string();
        let positional = match (call_args, policy.positional_scope) {
            (Some(args), _) => Rc::new(RefCell::new(Positional::for_function_call(arg0, args))),
            // A dot-script with no extra args inherits the caller's
            // positional parameters rather than resetting them (POSIX `.`;
            // this is what "dot-script with extra args" in the policy
            // table implies is the non-override default). `Own` still
            // applies to every other `positional_can_override` case, which
            // today is only `DotScript` itself.
            (None, Scope::Own) if policy.positional_can_override => {
                materialize(Scope::Copy, &parent.positional, || Positional::new(arg0, Vec::new()))
            }
            (None, scope) => materialize(scope, &parent.positional, || Positional::new(arg0, Vec::new())),
        };

        let mut frame = Frame {
            kind,
            policy,
            parent: Some(Rc::clone(parent)),
            variables: materialize(policy.variables_scope, &parent.variables, VariableSet::new),
            positional,
            fds: materialize(policy.fds_scope, &parent.fds, FdTable::new),
            traps: materialize(policy.traps_scope, &parent.traps, TrapSet::new),
            options: materialize(policy.options_scope, &parent.options, OptionSet::new),
            functions: materialize(policy.functions_scope, &parent.functions, FunctionSet::new),
            aliases: materialize(policy.aliases_scope, &parent.aliases, AliasSet::new),
            cwd: materialize(policy.cwd_scope, &parent.cwd, || parent.cwd.borrow().clone()),
            pending: None,
            last_exit_status: parent.last_exit_status,
        };

        if policy.resets_non_ignored_traps {
            frame.traps.borrow_mut().reset_non_ignored();
        }
        frame
    }

    #[must_use]
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    #[must_use]
    pub fn policy(&self) -> &FramePolicy {
        &self.policy
    }

    #[must_use]
    pub fn parent(&self) -> std::option::Option<&Rc<Frame>> {
        self.parent.as_ref()
    }

    #[must_use]
    pub fn variables(&self) -> &Rc<RefCell<VariableSet>> {
        &self.variables
    }

    #[must_use]
    pub fn positional(&self) -> &Rc<RefCell<Positional>> {
        &self.positional
    }

    #[must_use]
    pub fn fds(&self) -> &Rc<RefCell<FdTable>> {
        &self.fds
    }

    #[must_use]
    pub fn traps(&self) -> &Rc<RefCell<TrapSet>> {
        &self.traps
    }

    #[must_use]
    pub fn options(&self) -> &Rc<RefCell<OptionSet>> {
        &self.options
    }

    #[must_use]
    pub fn functions(&self) -> &Rc<RefCell<FunctionSet>> {
        &self.functions
    }

    #[must_use]
    pub fn aliases(&self) -> &Rc<RefCell<AliasSet>> {
        &self.aliases
    }

    #[must_use]
    pub fn cwd(&self) -> &Rc<RefCell<PathBuf>> {
        &self.cwd
    }

    #[must_use]
    pub fn pending(&self) -> std::option::Option<Pending> {
        self.pending
    }

    pub fn set_pending(&mut self, pending: std::option::Option<Pending>) {
        self.pending = pending;
    }

    #[must_use]
    pub fn last_exit_status(&self) -> i32 {
        self.last_exit_status
    }

    pub fn set_last_exit_status(&mut self, status: i32) {
        self.last_exit_status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Rc<Frame> {
        Rc::new(Frame::new_top_level(
            "sh",
            vec!["a".into()],
            std::iter::empty::<(String, String)>(),
            PathBuf::from("/tmp"),
        ))
    }

    #[test]
    fn top_level_has_own_stores_and_runs_exit_trap() {
        let frame = root();
        assert!(frame.policy().exit_trap_runs);
        assert_eq!(frame.positional().borrow().count(), 1);
    }

    #[test]
    fn brace_group_shares_variables_with_parent() {
        let parent = root();
        parent
            .variables()
            .borrow_mut()
            .assign("x", crate::variable::Value::scalar("1"), false, false)
            .unwrap();
        let child = Frame::new_child(&parent, FrameKind::BraceGroup, None);
        child
            .variables()
            .borrow_mut()
            .assign("y", crate::variable::Value::scalar("2"), false, false)
            .unwrap();
        assert!(parent.variables().borrow().get("y").is_some());
    }

    #[test]
    fn subshell_copies_variables_independently() {
        let parent = root();
        parent
            .variables()
            .borrow_mut()
            .assign("x", crate::variable::Value::scalar("1"), false, false)
            .unwrap();
        let child = Frame::new_child(&parent, FrameKind::Subshell, None);
        child
            .variables()
            .borrow_mut()
            .assign("x", crate::variable::Value::scalar("2"), false, false)
            .unwrap();
        assert_eq!(
            parent.variables().borrow().get("x").unwrap().value,
            Some(crate::variable::Value::scalar("1"))
        );
        assert_eq!(
            child.variables().borrow().get("x").unwrap().value,
            Some(crate::variable::Value::scalar("2"))
        );
    }

    #[test]
    fn function_call_gets_own_positional_but_shared_variables() {
        let parent = root();
        let child = Frame::new_child(
            &parent,
            FrameKind::Function,
            Some(vec!["x".into(), "y".into()]),
        );
        assert_eq!(child.positional().borrow().count(), 2);
        assert_eq!(parent.positional().borrow().count(), 1);
        assert_eq!(child.positional().borrow().arg0(), "sh");
    }

    #[test]
    fn subshell_resets_non_ignored_traps_but_keeps_ignored() {
        use crate::trap::Action;
        let parent = root();
        parent
            .traps()
            .borrow_mut()
            .set_signal(nix::sys::signal::Signal::SIGINT, Action::Ignore)
            .unwrap();
        parent
            .traps()
            .borrow_mut()
            .set_signal(
                nix::sys::signal::Signal::SIGTERM,
                Action::Command("echo bye".into()),
            )
            .unwrap();
        let child = Frame::new_child(&parent, FrameKind::Subshell, None);
        assert!(child
            .traps()
            .borrow()
            .get_signal(nix::sys::signal::Signal::SIGINT)
            .unwrap()
            .is_ignored());
        assert!(child
            .traps()
            .borrow()
            .get_signal(nix::sys::signal::Signal::SIGTERM)
            .unwrap()
            .is_default());
    }

    #[test]
    fn trap_frame_disables_errexit() {
        let parent = root();
        parent.options().borrow_mut().set(crate::option::ErrExit, crate::option::On);
        let child = Frame::new_child(&parent, FrameKind::Trap, None);
        assert!(!child.policy().errexit_enabled);
        // errexit is SHARE-scoped; disabling only applies via the flag,
        // not by clearing the option itself.
        assert!(child.options().borrow().is_on(crate::option::ErrExit));
    }

    #[test]
    fn frame_kind_displays_as_kebab_case() {
        assert_eq!(FrameKind::PipelineMember.to_string(), "pipeline-member");
    }

    #[test]
    fn loop_frame_is_the_loop_control_target() {
        let parent = root();
        let child = Frame::new_child(&parent, FrameKind::Loop, None);
        assert_eq!(child.policy().loop_control, FlowTarget::Target);
        assert_eq!(child.policy().return_behavior, FlowTarget::Transparent);
    }

    #[test]
    fn dot_script_with_no_extra_args_inherits_callers_positional_params() {
        let parent = Rc::new(Frame::new_top_level(
            "sh",
            vec!["a".into(), "b".into()],
            std::iter::empty::<(String, String)>(),
            PathBuf::from("/tmp"),
        ));
        let child = Frame::new_child(&parent, FrameKind::DotScript, None);
        assert_eq!(child.positional().borrow().count(), 2);
        assert_eq!(child.positional().borrow().arg0(), "sh");
    }

    #[test]
    fn dot_script_with_extra_args_overrides_positional_params() {
        let parent = Rc::new(Frame::new_top_level(
            "sh",
            vec!["a".into(), "b".into()],
            std::iter::empty::<(String, String)>(),
            PathBuf::from("/tmp"),
        ));
        let child = Frame::new_child(&parent, FrameKind::DotScript, Some(vec!["x".into()]));
        assert_eq!(child.positional().borrow().count(), 1);
    }

    #[test]
    fn dot_script_positional_copy_is_independent_of_parent() {
        let parent = root();
        let child = Frame::new_child(&parent, FrameKind::DotScript, None);
        child.positional().borrow_mut().set_params(vec!["z".into()]);
        assert_eq!(parent.positional().borrow().count(), 1);
        assert_eq!(child.positional().borrow().count(), 1);
    }
}
