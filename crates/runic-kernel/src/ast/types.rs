//! AST type definitions.

use std::fmt;

/// A complete runic script is a sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// A single statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Variable assignment: `SET name = expr`
    Set { name: String, value: Expr },
    /// Conditional: `IF cond ... ELSE ... ENDIF`
    If(IfStmt),
    /// Counted/collection loop: `FOR x IN expr ... ENDFOR`
    For(ForLoop),
    /// Condition loop: `WHILE cond ... ENDWHILE`
    While(WhileLoop),
    /// Function definition: `DEF name(a, b) ... ENDDEF`
    Def(FuncDef),
    /// Output a line: `PRINT expr`
    Print(Expr),
    /// Return from a function: `RETURN` or `RETURN expr`
    Return(Option<Expr>),
    /// State write: `STATE SET path.to.key = expr`
    StateSet { path: String, value: Expr },
    /// Bare expression evaluated for its effect (e.g. a capability call).
    Expr(Expr),
}

/// Conditional statement. Exactly one branch executes.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Vec<Stmt>,
    pub else_branch: Option<Vec<Stmt>>,
}

/// For loop. The iterable is re-evaluated once; an integer `n` iterates
/// `0..n`, a list iterates its elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub variable: String,
    pub iterable: Expr,
    pub body: Vec<Stmt>,
}

/// While loop. The condition is re-evaluated before every iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileLoop {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

/// User-defined function.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

/// An expression that evaluates to a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value.
    Literal(Value),
    /// Variable reference.
    Var(String),
    /// List literal: `[a, b, c]`
    List(Vec<Expr>),
    /// Unary operation: `-x`, `NOT x`
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Binary operation: `a + b`, `x AND y`
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Plain function call: `name(args...)` — builtin or user-defined.
    Call { name: String, args: Vec<Expr> },
    /// Capability call: `NAMESPACE.OPERATION(args...)`.
    ///
    /// The dot is what distinguishes this from `Call`, and it is the
    /// single node type the classifier keys on. Never evaluated locally.
    Capability {
        namespace: String,
        operation: String,
        args: Vec<Expr>,
    },
    /// State read: `STATE GET path.to.key`
    StateGet { path: String },
}

/// A literal value. Lists nest; there are no maps in the language itself
/// (nested data lives in the state document).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-` — numeric negation
    Neg,
    /// `NOT` — logical negation
    Not,
}

/// Binary operators, lowest to highest precedence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `OR` — logical or (short-circuit)
    Or,
    /// `AND` — logical and (short-circuit)
    And,
    /// `==` — equality
    Eq,
    /// `!=` — inequality
    NotEq,
    /// `<` — less than
    Lt,
    /// `>` — greater than
    Gt,
    /// `<=` — less than or equal
    LtEq,
    /// `>=` — greater than or equal
    GtEq,
    /// `+` — addition / string concatenation
    Add,
    /// `-` — subtraction
    Sub,
    /// `*` — multiplication
    Mul,
    /// `/` — division (division by zero yields 0)
    Div,
    /// `%` — remainder
    Mod,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "NOT"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Or => write!(f, "OR"),
            BinaryOp::And => write!(f, "AND"),
            BinaryOp::Eq => write!(f, "=="),
            BinaryOp::NotEq => write!(f, "!="),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::LtEq => write!(f, "<="),
            BinaryOp::GtEq => write!(f, ">="),
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Mod => write!(f, "%"),
        }
    }
}

impl Stmt {
    /// Short name of the statement kind, for tracing spans.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Set { .. } => "set",
            Stmt::If(_) => "if",
            Stmt::For(_) => "for",
            Stmt::While(_) => "while",
            Stmt::Def(_) => "def",
            Stmt::Print(_) => "print",
            Stmt::Return(_) => "return",
            Stmt::StateSet { .. } => "state_set",
            Stmt::Expr(_) => "expr",
        }
    }
}
