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

//! Shell function definitions (spec.md §4.3 "Function definition / call").

use posh_syntax::ast::FunctionDefinition as AstFunctionDefinition;
use std::collections::HashMap;
use std::rc::Rc;

/// A defined function: its body, shared so a running call does not need
/// to clone the AST and a redefinition mid-call does not affect it
/// (spec.md §3 "Lifecycle").
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Function {
    pub definition: Rc<AstFunctionDefinition>,
    pub is_read_only: bool,
}

impl Function {
    #[must_use]
    pub fn new(definition: Rc<AstFunctionDefinition>) -> Self {
        Function {
            definition,
            is_read_only: false,
        }
    }
}

/// A frame's function store.
#[derive(Clone, Debug, Default)]
pub struct FunctionSet {
    functions: HashMap<String, Function>,
}

impl FunctionSet {
    #[must_use]
    pub fn new() -> Self {
        FunctionSet::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> std::option::Option<&Function> {
        self.functions.get(name)
    }

    /// Defines or redefines a function. Returns `false` without modifying
    /// the store if a read-only function of the same name already exists.
    pub fn define(&mut self, name: impl Into<String>, definition: Rc<AstFunctionDefinition>) -> bool {
        let name = name.into();
        if self.functions.get(&name).is_some_and(|f| f.is_read_only) {
            return false;
        }
        self.functions.insert(name, Function::new(definition));
        true
    }

    pub fn unset(&mut self, name: &str) -> bool {
        self.functions.remove(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Function)> {
        self.functions.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_syntax::ast::{CompoundCommand, FullCompoundCommand, List};
    use posh_syntax::source::Location;

    fn dummy_function() -> Rc<AstFunctionDefinition> {
        Rc::new(AstFunctionDefinition {
            name: "f".into(),
            name_location: Location::dummy("f"),
            body: Rc::new(FullCompoundCommand {
                command: CompoundCommand::Brace(List::default()),
                redirs: Vec::new(),
            }),
        })
    }

    #[test]
    fn define_and_lookup() {
        let mut functions = FunctionSet::new();
        assert!(functions.define("f", dummy_function()));
        assert!(functions.get("f").is_some());
    }

    #[test]
    fn read_only_function_rejects_redefinition() {
        let mut functions = FunctionSet::new();
        functions.define("f", dummy_function());
        functions.functions.get_mut("f").unwrap().is_read_only = true;
        assert!(!functions.define("f", dummy_function()));
    }
}
