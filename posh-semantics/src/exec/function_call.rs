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

//! `name args...` where `name` resolves to a defined function (spec.md
//! §4.3 "Function definition / call"): a [`FrameKind::Function`] frame
//! with its own positional parameters and locals, sharing everything
//! else with the caller; `return` stops exactly at this frame.

use crate::error::ExecError;
use crate::exec::{ControlFlow, Interp};
use crate::field::Field;
use posh_env::frame::FrameKind;
use posh_env::function::Function;

pub fn run(interp: &mut Interp, function: &Function, name: &str, args: &[Field]) -> Result<ControlFlow, ExecError> {
    let call_args = args.iter().map(|f| f.0.clone()).collect();
    let definition = function.definition.clone();
    let outcome = interp.with_child_frame(FrameKind::Function, Some(call_args), |interp| {
        crate::exec::compound::run(interp, &definition.body)
    });
    match outcome? {
        ControlFlow::Return(code) => {
            interp.set_status(code);
            Ok(ControlFlow::Normal)
        }
        ControlFlow::Break(_) | ControlFlow::Continue(_) => Err(ExecError::NotInLoop(name.to_string())),
        flow => Ok(flow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_syntax::ast::{CompoundCommand, FullCompoundCommand, FunctionDefinition, List};
    use posh_syntax::source::Location;
    use std::rc::Rc;

    fn function_returning(code: i32) -> Function {
        use posh_syntax::ast::{Command, Item, Pipeline, SimpleCommand, Word};
        use posh_syntax::token::{Part, PartKind, Quoting};
        let literal = |s: &str| Word {
            parts: vec![Part { kind: PartKind::Literal(s.to_string()), quoting: Quoting::UNQUOTED, location: Location::dummy("f") }],
            location: Location::dummy("f"),
        };
        let return_command = Command::Simple(SimpleCommand {
            assigns: Vec::new(),
            words: vec![literal("return"), literal(&code.to_string())],
            redirs: Vec::new(),
        });
        let body = List(vec![Item {
            and_or: posh_syntax::ast::AndOrList {
                first: Pipeline { commands: vec![Rc::new(return_command)], negation: false },
                rest: Vec::new(),
            },
            is_async: false,
        }]);
        Function::new(Rc::new(FunctionDefinition {
            name: "f".into(),
            name_location: Location::dummy("f"),
            body: Rc::new(FullCompoundCommand { command: CompoundCommand::Brace(body), redirs: Vec::new() }),
        }))
    }

    #[test]
    fn return_stops_at_the_function_frame_and_sets_status() {
        let mut interp = crate::tests::test_interp();
        let function = function_returning(7);
        let flow = run(&mut interp, &function, "f", &[]).unwrap();
        assert_eq!(flow, ControlFlow::Normal);
        assert_eq!(interp.status(), 7);
    }
}
