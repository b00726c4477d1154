//! Expression and statement nodes.
//!
//! Bodies are stored in a [`NodeArena`](crate::NodeArena) and referenced by
//! [`NodeIndex`]. The index doubles as node identity: passes that compute
//! per-node data (closure extraction, for one) key their side tables by it
//! instead of writing into the nodes.

use crate::symbols::SymbolId;
use crate::types::TypeDescriptor;
use serde::{Deserialize, Serialize};

/// Index of a node in its arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

/// Byte range of a node in the original source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub pos: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(pos: u32, end: u32) -> Self {
        Span { pos, end }
    }

    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.pos)
    }

    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub data: NodeData,
    #[serde(default)]
    pub span: Span,
}

/// Keyword literals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyword {
    True,
    False,
    This,
    Null,
    Undefined,
}

/// Prefix unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    PlusPlus,
    MinusMinus,
    Exclamation,
    Minus,
    Plus,
    Tilde,
}

impl UnaryOperator {
    pub const fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::PlusPlus => "++",
            UnaryOperator::MinusMinus => "--",
            UnaryOperator::Exclamation => "!",
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::Tilde => "~",
        }
    }
}

/// Postfix update operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOperator {
    PlusPlus,
    MinusMinus,
}

impl UpdateOperator {
    pub const fn as_str(self) -> &'static str {
        match self {
            UpdateOperator::PlusPlus => "++",
            UpdateOperator::MinusMinus => "--",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    /// Resolved symbol; `SymbolId::NONE` for unresolved or global names.
    #[serde(default = "SymbolId::none")]
    pub symbol: SymbolId,
}

/// A parameter of a function, method, constructor or function literal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default = "SymbolId::none")]
    pub symbol: SymbolId,
    #[serde(default, rename = "type")]
    pub type_annotation: Option<TypeDescriptor>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: Option<TypeDescriptor>) -> Self {
        Parameter {
            name: name.into(),
            symbol: SymbolId::NONE,
            type_annotation: ty,
        }
    }

    pub fn with_symbol(mut self, symbol: SymbolId) -> Self {
        self.symbol = symbol;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub name: String,
    #[serde(default = "SymbolId::none")]
    pub symbol: SymbolId,
    #[serde(default, rename = "type")]
    pub type_annotation: Option<TypeDescriptor>,
    #[serde(default)]
    pub initializer: Option<NodeIndex>,
}

impl VariableDeclaration {
    pub fn new(
        name: impl Into<String>,
        symbol: SymbolId,
        ty: Option<TypeDescriptor>,
        initializer: Option<NodeIndex>,
    ) -> Self {
        VariableDeclaration {
            name: name.into(),
            symbol,
            type_annotation: ty,
            initializer,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FunctionBody {
    Block(Vec<NodeIndex>),
    Expression(NodeIndex),
}

/// `(a: T) => expr`, `(a) => { ... }` or `function (a) { ... }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionLiteral {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_type: Option<TypeDescriptor>,
    pub body: FunctionBody,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectProperty {
    pub name: String,
    pub value: NodeIndex,
}

/// `case test:` or, when `test` is `None`, `default:`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwitchClause {
    #[serde(default)]
    pub test: Option<NodeIndex>,
    #[serde(default)]
    pub statements: Vec<NodeIndex>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ForInitializer {
    Variables(Vec<VariableDeclaration>),
    Expression(NodeIndex),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NodeData {
    // =========================================================================
    // Expressions
    // =========================================================================
    Identifier(Identifier),
    PropertyAccess {
        object: NodeIndex,
        name: String,
    },
    Binary {
        left: NodeIndex,
        operator: String,
        right: NodeIndex,
    },
    Call {
        callee: NodeIndex,
        #[serde(default)]
        arguments: Vec<NodeIndex>,
    },
    New {
        callee: NodeIndex,
        #[serde(default)]
        arguments: Vec<NodeIndex>,
    },
    NumericLiteral {
        text: String,
    },
    StringLiteral {
        value: String,
    },
    Keyword {
        keyword: Keyword,
    },
    PrefixUnary {
        operator: UnaryOperator,
        operand: NodeIndex,
    },
    PostfixUnary {
        operator: UpdateOperator,
        operand: NodeIndex,
    },
    Parenthesized {
        expression: NodeIndex,
    },
    FunctionLiteral(FunctionLiteral),
    ObjectLiteral {
        #[serde(default)]
        properties: Vec<ObjectProperty>,
    },

    // =========================================================================
    // Statements
    // =========================================================================
    Return {
        #[serde(default)]
        expression: Option<NodeIndex>,
    },
    If {
        condition: NodeIndex,
        then_statement: NodeIndex,
        #[serde(default)]
        else_statement: Option<NodeIndex>,
    },
    For {
        #[serde(default)]
        initializer: Option<ForInitializer>,
        #[serde(default)]
        condition: Option<NodeIndex>,
        #[serde(default)]
        incrementor: Option<NodeIndex>,
        body: NodeIndex,
    },
    While {
        condition: NodeIndex,
        body: NodeIndex,
    },
    Switch {
        expression: NodeIndex,
        #[serde(default)]
        clauses: Vec<SwitchClause>,
    },
    Block {
        #[serde(default)]
        statements: Vec<NodeIndex>,
    },
    ExpressionStatement {
        expression: NodeIndex,
    },
    VariableStatement {
        declarations: Vec<VariableDeclaration>,
    },
    Break,
    Continue,

    /// Any syntax outside the supported grammar, kept as source text.
    Unsupported {
        syntax: String,
        text: String,
    },
}

impl NodeData {
    /// Short syntax-kind name, used in log lines and diagnostics.
    pub fn kind_name(&self) -> &str {
        match self {
            NodeData::Identifier(_) => "Identifier",
            NodeData::PropertyAccess { .. } => "PropertyAccessExpression",
            NodeData::Binary { .. } => "BinaryExpression",
            NodeData::Call { .. } => "CallExpression",
            NodeData::New { .. } => "NewExpression",
            NodeData::NumericLiteral { .. } => "NumericLiteral",
            NodeData::StringLiteral { .. } => "StringLiteral",
            NodeData::Keyword { .. } => "Keyword",
            NodeData::PrefixUnary { .. } => "PrefixUnaryExpression",
            NodeData::PostfixUnary { .. } => "PostfixUnaryExpression",
            NodeData::Parenthesized { .. } => "ParenthesizedExpression",
            NodeData::FunctionLiteral(_) => "FunctionLiteral",
            NodeData::ObjectLiteral { .. } => "ObjectLiteralExpression",
            NodeData::Return { .. } => "ReturnStatement",
            NodeData::If { .. } => "IfStatement",
            NodeData::For { .. } => "ForStatement",
            NodeData::While { .. } => "WhileStatement",
            NodeData::Switch { .. } => "SwitchStatement",
            NodeData::Block { .. } => "Block",
            NodeData::ExpressionStatement { .. } => "ExpressionStatement",
            NodeData::VariableStatement { .. } => "VariableStatement",
            NodeData::Break => "BreakStatement",
            NodeData::Continue => "ContinueStatement",
            NodeData::Unsupported { syntax, .. } => syntax,
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeData::Return { .. }
                | NodeData::If { .. }
                | NodeData::For { .. }
                | NodeData::While { .. }
                | NodeData::Switch { .. }
                | NodeData::Block { .. }
                | NodeData::ExpressionStatement { .. }
                | NodeData::VariableStatement { .. }
                | NodeData::Break
                | NodeData::Continue
        )
    }
}
