//! Node arena and builder helpers.
//!
//! The front-end ships bodies as a flat node vector; tests and embedders
//! build the same structure through the helpers below.

use crate::node::{
    ForInitializer, FunctionLiteral, Identifier, Keyword, Node, NodeData, NodeIndex,
    ObjectProperty, Span, SwitchClause, UnaryOperator, UpdateOperator, VariableDeclaration,
};
use crate::symbols::SymbolId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeArena {
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Original source text, used to echo unsupported syntax verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(source_text: impl Into<String>) -> Self {
        NodeArena {
            nodes: Vec::new(),
            source_text: Some(source_text.into()),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add(&mut self, data: NodeData, span: Span) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node { data, span });
        index
    }

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            return None;
        }
        self.nodes.get(index.0 as usize)
    }

    #[inline]
    pub fn data(&self, index: NodeIndex) -> Option<&NodeData> {
        self.get(index).map(|n| &n.data)
    }

    pub fn span(&self, index: NodeIndex) -> Span {
        self.get(index).map(|n| n.span).unwrap_or_default()
    }

    /// Source text covered by a node.
    ///
    /// Falls back to the text carried by `Unsupported` nodes when the arena
    /// has no source or the span does not land on character boundaries.
    pub fn text_of(&self, index: NodeIndex) -> Option<&str> {
        let node = self.get(index)?;
        let from_source = self.source_text.as_deref().and_then(|text| {
            if node.span.is_empty() {
                return None;
            }
            text.get(node.span.pos as usize..node.span.end as usize)
        });
        match (from_source, &node.data) {
            (Some(text), _) => Some(text),
            (None, NodeData::Unsupported { text, .. }) => Some(text),
            (None, _) => None,
        }
    }

    // =========================================================================
    // Builders
    // =========================================================================

    pub fn ident(&mut self, name: &str, symbol: SymbolId) -> NodeIndex {
        self.add(
            NodeData::Identifier(Identifier {
                name: name.to_string(),
                symbol,
            }),
            Span::default(),
        )
    }

    pub fn number(&mut self, text: &str) -> NodeIndex {
        self.add(
            NodeData::NumericLiteral {
                text: text.to_string(),
            },
            Span::default(),
        )
    }

    pub fn string(&mut self, value: &str) -> NodeIndex {
        self.add(
            NodeData::StringLiteral {
                value: value.to_string(),
            },
            Span::default(),
        )
    }

    pub fn keyword(&mut self, keyword: Keyword) -> NodeIndex {
        self.add(NodeData::Keyword { keyword }, Span::default())
    }

    pub fn this(&mut self) -> NodeIndex {
        self.keyword(Keyword::This)
    }

    pub fn property(&mut self, object: NodeIndex, name: &str) -> NodeIndex {
        self.add(
            NodeData::PropertyAccess {
                object,
                name: name.to_string(),
            },
            Span::default(),
        )
    }

    /// `this.name`.
    pub fn this_property(&mut self, name: &str) -> NodeIndex {
        let this = self.this();
        self.property(this, name)
    }

    pub fn binary(&mut self, left: NodeIndex, operator: &str, right: NodeIndex) -> NodeIndex {
        self.add(
            NodeData::Binary {
                left,
                operator: operator.to_string(),
                right,
            },
            Span::default(),
        )
    }

    pub fn call(&mut self, callee: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeData::Call { callee, arguments }, Span::default())
    }

    pub fn new_expr(&mut self, callee: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeData::New { callee, arguments }, Span::default())
    }

    pub fn prefix(&mut self, operator: UnaryOperator, operand: NodeIndex) -> NodeIndex {
        self.add(NodeData::PrefixUnary { operator, operand }, Span::default())
    }

    pub fn postfix(&mut self, operator: UpdateOperator, operand: NodeIndex) -> NodeIndex {
        self.add(NodeData::PostfixUnary { operator, operand }, Span::default())
    }

    pub fn paren(&mut self, expression: NodeIndex) -> NodeIndex {
        self.add(NodeData::Parenthesized { expression }, Span::default())
    }

    /// Function literals are named after their span, so callers supply it.
    pub fn function_literal(&mut self, literal: FunctionLiteral, span: Span) -> NodeIndex {
        self.add(NodeData::FunctionLiteral(literal), span)
    }

    pub fn object_literal(&mut self, properties: Vec<(&str, NodeIndex)>) -> NodeIndex {
        let properties = properties
            .into_iter()
            .map(|(name, value)| ObjectProperty {
                name: name.to_string(),
                value,
            })
            .collect();
        self.add(NodeData::ObjectLiteral { properties }, Span::default())
    }

    pub fn ret(&mut self, expression: Option<NodeIndex>) -> NodeIndex {
        self.add(NodeData::Return { expression }, Span::default())
    }

    pub fn expr_stmt(&mut self, expression: NodeIndex) -> NodeIndex {
        self.add(NodeData::ExpressionStatement { expression }, Span::default())
    }

    pub fn var_stmt(&mut self, declarations: Vec<VariableDeclaration>) -> NodeIndex {
        self.add(NodeData::VariableStatement { declarations }, Span::default())
    }

    pub fn block(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeData::Block { statements }, Span::default())
    }

    pub fn if_stmt(
        &mut self,
        condition: NodeIndex,
        then_statement: NodeIndex,
        else_statement: Option<NodeIndex>,
    ) -> NodeIndex {
        self.add(
            NodeData::If {
                condition,
                then_statement,
                else_statement,
            },
            Span::default(),
        )
    }

    pub fn for_stmt(
        &mut self,
        initializer: Option<ForInitializer>,
        condition: Option<NodeIndex>,
        incrementor: Option<NodeIndex>,
        body: NodeIndex,
    ) -> NodeIndex {
        self.add(
            NodeData::For {
                initializer,
                condition,
                incrementor,
                body,
            },
            Span::default(),
        )
    }

    pub fn while_stmt(&mut self, condition: NodeIndex, body: NodeIndex) -> NodeIndex {
        self.add(NodeData::While { condition, body }, Span::default())
    }

    pub fn switch_stmt(&mut self, expression: NodeIndex, clauses: Vec<SwitchClause>) -> NodeIndex {
        self.add(NodeData::Switch { expression, clauses }, Span::default())
    }

    pub fn break_stmt(&mut self) -> NodeIndex {
        self.add(NodeData::Break, Span::default())
    }

    pub fn continue_stmt(&mut self) -> NodeIndex {
        self.add(NodeData::Continue, Span::default())
    }

    pub fn unsupported(&mut self, syntax: &str, text: &str, span: Span) -> NodeIndex {
        self.add(
            NodeData::Unsupported {
                syntax: syntax.to_string(),
                text: text.to_string(),
            },
            span,
        )
    }
}

#[cfg(test)]
#[path = "../tests/arena.rs"]
mod tests;
