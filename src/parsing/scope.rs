//! Nested symbol tables, mutated live while parsing

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use crate::language::{CharClass, Expression, Value, Variable};
use crate::problem::CompileError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    Root,  // the outermost scope, holding the built-ins
    Block, // a construct's nested definition block
    Flag,  // opened by a flags construct, popped without a used-check
}

/// One symbol table. `entries` starts as a full copy of the parent's map, so
/// lookup never needs to walk a parent chain; `owned` lists only the names
/// defined directly in this scope, in source order, for the used-check when
/// the scope pops.
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    pub kind: ScopeKind,
    entries: HashMap<String, Variable>,
    owned: Vec<(String, usize)>,
}

#[derive(Debug)]
pub(crate) struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    pub(crate) fn new() -> ScopeStack {
        let mut entries = HashMap::new();
        for variable in builtins() {
            entries.insert(variable.name.clone(), variable);
        }
        ScopeStack {
            scopes: vec![Scope {
                kind: ScopeKind::Root,
                entries,
                owned: Vec::new(),
            }],
        }
    }

    /// Open a child scope: a full copy of the current one. Later definitions
    /// in the parent are not visible to this child.
    pub(crate) fn push(&mut self, kind: ScopeKind) {
        let entries = self
            .scopes
            .last()
            .map(|scope| scope.entries.clone())
            .unwrap_or_default();
        self.scopes.push(Scope {
            kind,
            entries,
            owned: Vec::new(),
        });
    }

    /// Bind a variable in the current scope, or in every open scope for a
    /// global-marked definition. Redefinition is an error either way, with a
    /// distinct message when the existing binding is a built-in.
    pub(crate) fn define(
        &mut self,
        variable: Variable,
        global: bool,
        lineno: usize,
    ) -> Result<(), CompileError> {
        let range = if global {
            0..self.scopes.len()
        } else {
            self.scopes.len() - 1..self.scopes.len()
        };
        for i in range.clone() {
            if let Some(existing) = self.scopes[i]
                .entries
                .get(&variable.name)
            {
                return Err(if existing.lineno == 0 {
                    CompileError::BuiltinRedefined(lineno, variable.name.clone())
                } else {
                    CompileError::AlreadyDefined(lineno, variable.name.clone(), existing.lineno)
                });
            }
        }
        for i in range {
            self.scopes[i]
                .entries
                .insert(variable.name.clone(), variable.clone());
        }
        if let Some(current) = self.scopes.last_mut() {
            current
                .owned
                .push((variable.name, variable.lineno));
        }
        Ok(())
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<&Variable> {
        self.scopes
            .last()
            .and_then(|scope| scope.entries.get(name))
    }

    /// Verify every name defined directly in the current scope was referenced
    /// by the owning construct. `context` names that construct in the error
    /// message.
    pub(crate) fn check_used(
        &self,
        used: &HashSet<String>,
        context: &'static str,
    ) -> Result<(), CompileError> {
        if let Some(scope) = self.scopes.last() {
            for (name, lineno) in &scope.owned {
                if !used.contains(name) {
                    return Err(CompileError::UnusedVariable(*lineno, name.clone(), context));
                }
            }
        }
        Ok(())
    }

    /// Close the current scope after its used-check passes.
    pub(crate) fn pop_checked(
        &mut self,
        used: &HashSet<String>,
        context: &'static str,
    ) -> Result<(), CompileError> {
        self.check_used(used, context)?;
        self.scopes.pop();
        Ok(())
    }

    /// Close a flag scope. Flag scopes hold only the built-in redefinitions
    /// their flags imply, so there is nothing to check.
    pub(crate) fn pop_unchecked(&mut self) {
        self.scopes.pop();
    }

    /// Rebind a flag-dependent built-in inside the current (flag) scope,
    /// bypassing the duplicate check that protects built-ins from user
    /// assignments.
    pub(crate) fn override_builtin(&mut self, variable: Variable) {
        if let Some(current) = self.scopes.last_mut() {
            current
                .entries
                .insert(variable.name.clone(), variable);
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.scopes.len()
    }
}

fn class(value: &str, subvalue: &str) -> Value {
    Value::Class(CharClass {
        value: value.to_string(),
        subvalue: subvalue.to_string(),
        set_op: false,
        rebracket: true,
    })
}

fn pattern(text: &str) -> Value {
    Value::Pattern(Expression::new(text.to_string()))
}

/// The built-in variables every compilation starts with. The defaults for
/// `any`, `BOL`, and `EOL` assume the default flag set (unicode, multiline,
/// V1); flag constructs rebind them in their own scope.
fn builtins() -> Vec<Variable> {
    let entries = [
        ("alpha", class("[a-zA-Z]", "a-zA-Z")),
        ("upper", class("[A-Z]", "A-Z")),
        ("lower", class("[a-z]", "a-z")),
        ("digit", class("[0-9]", "0-9")),
        ("alnum", class("[a-zA-Z0-9]", "a-zA-Z0-9")),
        ("any", pattern("(?s:.)")),
        ("BOS", pattern("\\A")),
        ("EOS", pattern("\\Z")),
        ("BOL", pattern("^")),
        ("EOL", pattern("$")),
    ];
    entries
        .into_iter()
        .map(|(name, value)| Variable {
            name: name.to_string(),
            value,
            lineno: 0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str, lineno: usize) -> Variable {
        Variable {
            name: name.to_string(),
            value: pattern("x"),
            lineno,
        }
    }

    #[test]
    fn check_builtins_present() {
        let scopes = ScopeStack::new();

        let found = scopes.lookup("alpha");
        assert!(found.is_some());
        assert_eq!(found.unwrap().lineno, 0);

        assert!(scopes
            .lookup("bigfoot")
            .is_none());
    }

    #[test]
    fn check_copy_on_push() {
        let mut scopes = ScopeStack::new();

        scopes
            .define(variable("outer", 2), false, 2)
            .unwrap();
        scopes.push(ScopeKind::Block);

        // the child sees the parent's binding
        assert!(scopes
            .lookup("outer")
            .is_some());

        scopes
            .define(variable("inner", 3), false, 3)
            .unwrap();

        let mut used = HashSet::new();
        used.insert("inner".to_string());
        scopes
            .pop_checked(&used, "expression")
            .unwrap();

        // the child's binding died with it
        assert!(scopes
            .lookup("inner")
            .is_none());
        assert!(scopes
            .lookup("outer")
            .is_some());
    }

    #[test]
    fn check_duplicate_definitions() {
        let mut scopes = ScopeStack::new();

        scopes
            .define(variable("twice", 2), false, 2)
            .unwrap();
        let result = scopes.define(variable("twice", 3), false, 3);
        assert_eq!(
            result,
            Err(CompileError::AlreadyDefined(3, "twice".to_string(), 2))
        );

        let result = scopes.define(variable("alpha", 4), false, 4);
        assert_eq!(
            result,
            Err(CompileError::BuiltinRedefined(4, "alpha".to_string()))
        );
    }

    #[test]
    fn check_global_defines_everywhere() {
        let mut scopes = ScopeStack::new();

        scopes.push(ScopeKind::Block);
        scopes.push(ScopeKind::Block);
        scopes
            .define(variable("everywhere", 4), true, 4)
            .unwrap();

        let used = ["everywhere".to_string()]
            .into_iter()
            .collect();
        scopes
            .pop_checked(&used, "expression")
            .unwrap();
        scopes
            .pop_checked(&HashSet::new(), "expression")
            .unwrap();

        // still visible after the defining scope is long gone
        assert!(scopes
            .lookup("everywhere")
            .is_some());
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn check_unused_variable_reported() {
        let mut scopes = ScopeStack::new();

        scopes.push(ScopeKind::Block);
        scopes
            .define(variable("lonely", 3), false, 3)
            .unwrap();

        let result = scopes.pop_checked(&HashSet::new(), "expression");
        assert_eq!(
            result,
            Err(CompileError::UnusedVariable(
                3,
                "lonely".to_string(),
                "expression"
            ))
        );
    }
}
