//! Resolved symbols and the facade the generator queries for semantic facts.

use crate::node::NodeIndex;
use crate::types::{Signature, TypeDescriptor};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Identity of a resolved symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub const NONE: SymbolId = SymbolId(u32::MAX);

    pub const fn none() -> SymbolId {
        SymbolId::NONE
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    /// Enclosing scopes, outermost first (`["demo", "Demo", "exec"]`).
    #[serde(default)]
    pub scope: Vec<String>,
    /// Declared or inferred type of the symbol.
    #[serde(default, rename = "type")]
    pub ty: Option<TypeDescriptor>,
}

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Symbol {
            name: name.into(),
            scope: Vec::new(),
            ty: None,
        }
    }
}

/// Read-only semantic queries answered by the external resolver.
pub trait TypeFacade {
    /// Resolved type of an expression node.
    fn type_of_node(&self, node: NodeIndex) -> Option<&TypeDescriptor>;

    fn symbol(&self, id: SymbolId) -> Option<&Symbol>;

    /// Call signatures of a function-typed expression.
    fn call_signatures(&self, node: NodeIndex) -> &[Signature] {
        self.type_of_node(node)
            .and_then(TypeDescriptor::as_function)
            .map_or(&[], |f| f.signatures.as_slice())
    }

    /// Type of the symbol, if the resolver recorded one.
    fn type_of_symbol(&self, id: SymbolId) -> Option<&TypeDescriptor> {
        self.symbol(id).and_then(|s| s.ty.as_ref())
    }
}

/// Tabled answers of the resolver, as shipped alongside a unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticModel {
    #[serde(default)]
    pub node_types: FxHashMap<NodeIndex, TypeDescriptor>,
    #[serde(default)]
    pub symbols: FxHashMap<SymbolId, Symbol>,
}

impl SemanticModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_node_type(&mut self, node: NodeIndex, ty: TypeDescriptor) {
        self.node_types.insert(node, ty);
    }

    /// Register a symbol under the next free id.
    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(
            self.symbols
                .keys()
                .map(|id| id.0.saturating_add(1))
                .max()
                .unwrap_or(0),
        );
        self.symbols.insert(id, symbol);
        id
    }
}

impl TypeFacade for SemanticModel {
    fn type_of_node(&self, node: NodeIndex) -> Option<&TypeDescriptor> {
        self.node_types.get(&node)
    }

    fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }
}
