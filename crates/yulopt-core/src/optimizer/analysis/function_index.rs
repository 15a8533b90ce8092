use crate::ast::{Name, Program, Statement};
use indexmap::IndexMap;

/// Name -> position of every top-level function definition, in program order.
///
/// Built before a pass mutates the tree so that definitions can be swapped
/// by position instead of searched for.
#[derive(Debug, Clone, Default)]
pub struct FunctionIndex {
    positions: IndexMap<Name, usize>,
}

impl FunctionIndex {
    /// Indexes the top-level definitions of `program`. If a name is defined
    /// twice only the first definition is indexed; duplicate definitions are
    /// reported by [`super::verify_preconditions`].
    pub fn build(program: &Program) -> Self {
        let mut positions = IndexMap::new();
        for (i, stmt) in program.root.statements.iter().enumerate() {
            if let Statement::FunctionDefinition(func) = stmt {
                positions.entry(func.name.clone()).or_insert(i);
            }
        }
        FunctionIndex { positions }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// True for user-defined functions; any other callee is a builtin.
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &Name> {
        self.positions.keys()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
