//! Abstract syntax tree for runic scripts.

mod types;

pub use types::{
    BinaryOp, Expr, ForLoop, FuncDef, IfStmt, Program, Stmt, UnaryOp, Value, WhileLoop,
};
