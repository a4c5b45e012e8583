//! Capability classifier: static pre-execution analysis.
//!
//! Walks the full tree — every statement list, every expression child,
//! conditions, loop bodies, and function bodies — and decides whether
//! the script needs the privileged executor. The check is deliberately
//! conservative: there is no reachability analysis, so a capability
//! call inside a never-taken branch still marks the whole script as
//! privileged. Misclassifying privileged work as safe (failing locally,
//! or worse, silently no-op-ing a capability) is categorically worse
//! than over-delegating a script that never exercises its privileged
//! branch at runtime.

use crate::ast::{Expr, ForLoop, FuncDef, IfStmt, Program, Stmt, WhileLoop};

/// The known privileged capability namespaces.
///
/// Unknown namespaces are treated as privileged too; this set exists so
/// classification results can report what a script reaches for.
pub const PRIVILEGED_NAMESPACES: &[&str] =
    &["FILE", "MESH", "KNOWLEDGE", "ARCHIVE", "EMAIL", "SYSTEM"];

/// Result of classifying a program.
///
/// Invariant: a non-empty `namespaces` list implies `privileged`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Classification {
    /// True if the script must run in the privileged executor.
    pub privileged: bool,
    /// Capability namespaces encountered, deduplicated, in first-seen
    /// order.
    pub namespaces: Vec<String>,
}

/// Classify a program: does it require privileged execution?
pub fn classify(program: &Program) -> Classification {
    let mut walker = Walker::default();
    walker.walk_block(&program.statements);
    Classification {
        privileged: !walker.namespaces.is_empty(),
        namespaces: walker.namespaces,
    }
}

/// Convenience wrapper for callers that only need the boolean.
pub fn requires_privileged(program: &Program) -> bool {
    classify(program).privileged
}

#[derive(Default)]
struct Walker {
    namespaces: Vec<String>,
}

impl Walker {
    fn walk_block(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.walk_stmt(stmt);
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Set { value, .. } => self.walk_expr(value),
            Stmt::If(IfStmt { condition, then_branch, else_branch }) => {
                self.walk_expr(condition);
                self.walk_block(then_branch);
                if let Some(else_branch) = else_branch {
                    self.walk_block(else_branch);
                }
            }
            Stmt::For(ForLoop { iterable, body, .. }) => {
                self.walk_expr(iterable);
                self.walk_block(body);
            }
            Stmt::While(WhileLoop { condition, body }) => {
                self.walk_expr(condition);
                self.walk_block(body);
            }
            Stmt::Def(FuncDef { body, .. }) => self.walk_block(body),
            Stmt::Print(expr) => self.walk_expr(expr),
            Stmt::Return(expr) => {
                if let Some(expr) = expr {
                    self.walk_expr(expr);
                }
            }
            Stmt::StateSet { value, .. } => self.walk_expr(value),
            Stmt::Expr(expr) => self.walk_expr(expr),
        }
    }

    fn walk_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) | Expr::Var(_) | Expr::StateGet { .. } => {}
            Expr::List(items) => {
                for item in items {
                    self.walk_expr(item);
                }
            }
            Expr::Unary { operand, .. } => self.walk_expr(operand),
            Expr::Binary { left, right, .. } => {
                self.walk_expr(left);
                self.walk_expr(right);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    self.walk_expr(arg);
                }
            }
            Expr::Capability { namespace, args, .. } => {
                if !self.namespaces.iter().any(|n| n == namespace) {
                    self.namespaces.push(namespace.clone());
                }
                for arg in args {
                    self.walk_expr(arg);
                }
            }
        }
    }
}
