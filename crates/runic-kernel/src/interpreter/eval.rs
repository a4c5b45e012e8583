//! Tree-walking evaluator for the local (safe) execution path.
//!
//! Evaluation is strictly synchronous and single-pass: statement lists
//! execute in order, `IF` runs exactly one branch, and loops re-evaluate
//! their controlling expression every iteration. All loops charge the
//! context's shared iteration counter; user-function calls charge the
//! call-depth counter. `RETURN` threads back as an [`Outcome`] sentinel
//! rather than a host exception.
//!
//! Capability calls never belong here. The router classifies scripts
//! before evaluation and delegates anything with a capability call, so
//! reaching one locally is an internal-invariant violation and fails
//! loudly instead of silently producing null.

use std::cmp::Ordering;
use std::fmt;

use crate::ast::{BinaryOp, Expr, Program, Stmt, UnaryOp, Value};

use super::builtins::call_builtin;
use super::context::ExecutionContext;
use super::outcome::Outcome;

/// Errors raised during local evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Variable not found in the context.
    UndefinedVariable(String),
    /// Neither a user-defined function nor a builtin.
    UndefinedFunction(String),
    /// Type mismatch for an operation.
    Type { expected: &'static str, got: String },
    /// Wrong number of arguments.
    Arity { name: String, expected: usize, got: usize },
    /// `FOR` over a value that cannot be iterated.
    BadIterable(String),
    /// The shared loop bound was exceeded.
    IterationLimit { limit: u64 },
    /// The user-function call depth bound was exceeded.
    RecursionLimit { limit: u32 },
    /// A capability call reached the local interpreter. Internal defect:
    /// the router must never hand a classified-privileged script here.
    CapabilityMisuse { namespace: String, operation: String },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UndefinedVariable(name) => write!(f, "undefined variable: {name}"),
            EvalError::UndefinedFunction(name) => write!(f, "undefined function: {name}"),
            EvalError::Type { expected, got } => {
                write!(f, "type error: expected {expected}, got {got}")
            }
            EvalError::Arity { name, expected, got } => {
                write!(f, "{name} expects {expected} argument(s), got {got}")
            }
            EvalError::BadIterable(got) => write!(f, "cannot iterate over {got}"),
            EvalError::IterationLimit { limit } => {
                write!(f, "iteration limit of {limit} exceeded")
            }
            EvalError::RecursionLimit { limit } => {
                write!(f, "call depth limit of {limit} exceeded")
            }
            EvalError::CapabilityMisuse { namespace, operation } => {
                write!(f, "capability call {namespace}.{operation} reached the local interpreter")
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Result type for evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Run a program against a context. The context's output buffer and
/// state document hold whatever was produced, even when this errors.
pub fn interpret(program: &Program, ctx: &mut ExecutionContext) -> EvalResult<()> {
    let mut interpreter = Interpreter { ctx };
    // A top-level RETURN simply ends the script early.
    interpreter.exec_block(&program.statements).map(|_| ())
}

/// Tree-walking interpreter over one execution context.
struct Interpreter<'a> {
    ctx: &'a mut ExecutionContext,
}

impl Interpreter<'_> {
    /// Execute a statement list, propagating a `RETURN` sentinel before
    /// continuing to the next statement.
    fn exec_block(&mut self, statements: &[Stmt]) -> EvalResult<Outcome> {
        for stmt in statements {
            let outcome = self.exec_stmt(stmt)?;
            if !outcome.is_normal() {
                return Ok(outcome);
            }
        }
        Ok(Outcome::Normal)
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<Outcome> {
        tracing::trace!(stmt = stmt.kind_name(), "exec");
        match stmt {
            Stmt::Set { name, value } => {
                let value = self.eval(value)?;
                self.ctx.variables.insert(name.clone(), value);
                Ok(Outcome::Normal)
            }
            Stmt::If(if_stmt) => {
                let cond = self.eval(&if_stmt.condition)?;
                if is_truthy(&cond) {
                    self.exec_block(&if_stmt.then_branch)
                } else if let Some(else_branch) = &if_stmt.else_branch {
                    self.exec_block(else_branch)
                } else {
                    Ok(Outcome::Normal)
                }
            }
            Stmt::For(for_loop) => {
                let iterable = self.eval(&for_loop.iterable)?;
                let items: Vec<Value> = match iterable {
                    // A numeric bound iterates 0..n, exclusive.
                    Value::Int(n) => (0..n.max(0)).map(Value::Int).collect(),
                    Value::List(items) => items,
                    other => return Err(EvalError::BadIterable(other.type_name().to_string())),
                };
                for item in items {
                    self.ctx.charge_iteration()?;
                    self.ctx.variables.insert(for_loop.variable.clone(), item);
                    match self.exec_block(&for_loop.body)? {
                        Outcome::Normal => {}
                        returned => return Ok(returned),
                    }
                }
                Ok(Outcome::Normal)
            }
            Stmt::While(while_loop) => {
                loop {
                    let cond = self.eval(&while_loop.condition)?;
                    if !is_truthy(&cond) {
                        break;
                    }
                    self.ctx.charge_iteration()?;
                    match self.exec_block(&while_loop.body)? {
                        Outcome::Normal => {}
                        returned => return Ok(returned),
                    }
                }
                Ok(Outcome::Normal)
            }
            Stmt::Def(def) => {
                self.ctx.functions.insert(def.name.clone(), def.clone());
                Ok(Outcome::Normal)
            }
            Stmt::Print(expr) => {
                let value = self.eval(expr)?;
                self.ctx.print(value.to_string());
                Ok(Outcome::Normal)
            }
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(e) => self.eval(e)?,
                    None => Value::Null,
                };
                Ok(Outcome::Returned(value))
            }
            Stmt::StateSet { path, value } => {
                let value = self.eval(value)?;
                self.ctx.state.set(path, value);
                Ok(Outcome::Normal)
            }
            Stmt::Expr(expr) => {
                self.eval(expr)?;
                Ok(Outcome::Normal)
            }
        }
    }

    fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Var(name) => self
                .ctx
                .variables
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item)?);
                }
                Ok(Value::List(values))
            }
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                eval_unary(*op, value)
            }
            Expr::Binary { left, op, right } => self.eval_binary(left, *op, right),
            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg)?);
                }
                self.call_function(name, values)
            }
            Expr::Capability { namespace, operation, .. } => {
                tracing::warn!(
                    namespace = %namespace,
                    operation = %operation,
                    "capability call reached the local interpreter; \
                     classification must delegate scripts containing capability calls"
                );
                Err(EvalError::CapabilityMisuse {
                    namespace: namespace.clone(),
                    operation: operation.clone(),
                })
            }
            Expr::StateGet { path } => Ok(self.ctx.state.get(path)),
        }
    }

    fn eval_binary(&mut self, left: &Expr, op: BinaryOp, right: &Expr) -> EvalResult<Value> {
        // Short-circuit logical operators evaluate the right side only
        // when needed and yield the deciding operand.
        match op {
            BinaryOp::And => {
                let left_val = self.eval(left)?;
                if !is_truthy(&left_val) {
                    return Ok(left_val);
                }
                return self.eval(right);
            }
            BinaryOp::Or => {
                let left_val = self.eval(left)?;
                if is_truthy(&left_val) {
                    return Ok(left_val);
                }
                return self.eval(right);
            }
            _ => {}
        }

        let left_val = self.eval(left)?;
        let right_val = self.eval(right)?;
        match op {
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
            BinaryOp::Eq => Ok(Value::Bool(values_equal(&left_val, &right_val))),
            BinaryOp::NotEq => Ok(Value::Bool(!values_equal(&left_val, &right_val))),
            BinaryOp::Lt => compare_values(&left_val, &right_val).map(|o| Value::Bool(o.is_lt())),
            BinaryOp::Gt => compare_values(&left_val, &right_val).map(|o| Value::Bool(o.is_gt())),
            BinaryOp::LtEq => compare_values(&left_val, &right_val).map(|o| Value::Bool(o.is_le())),
            BinaryOp::GtEq => compare_values(&left_val, &right_val).map(|o| Value::Bool(o.is_ge())),
            BinaryOp::Add => eval_add(left_val, right_val),
            BinaryOp::Sub => eval_numeric(left_val, right_val, "-", i64::checked_sub, |a, b| a - b),
            BinaryOp::Mul => eval_numeric(left_val, right_val, "*", i64::checked_mul, |a, b| a * b),
            BinaryOp::Div => eval_div(left_val, right_val),
            BinaryOp::Mod => eval_mod(left_val, right_val),
        }
    }

    /// Call a function: user definitions shadow the builtin table.
    fn call_function(&mut self, name: &str, args: Vec<Value>) -> EvalResult<Value> {
        if let Some(def) = self.ctx.functions.get(name).cloned() {
            if def.params.len() != args.len() {
                return Err(EvalError::Arity {
                    name: name.to_string(),
                    expected: def.params.len(),
                    got: args.len(),
                });
            }
            self.ctx.enter_call()?;

            // Fresh scope by snapshot-and-restore: the body sees the
            // caller's variables plus its parameters, and every binding
            // it makes is discarded when the call returns.
            let saved = self.ctx.variables.clone();
            for (param, arg) in def.params.iter().zip(args) {
                self.ctx.variables.insert(param.clone(), arg);
            }

            let result = self.exec_block(&def.body);
            self.ctx.variables = saved;
            self.ctx.exit_call();

            match result? {
                Outcome::Returned(value) => Ok(value),
                Outcome::Normal => Ok(Value::Null),
            }
        } else if let Some(result) = call_builtin(&name.to_uppercase(), &args) {
            result
        } else {
            Err(EvalError::UndefinedFunction(name.to_string()))
        }
    }
}

/// Truthiness: null, false, 0, empty string, and empty list are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Str(s) => !s.is_empty(),
        Value::List(items) => !items.is_empty(),
    }
}

/// Equality, with int/float comparing numerically.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => (a - b).abs() < f64::EPSILON,
        (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
            (*a as f64 - b).abs() < f64::EPSILON
        }
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        _ => false,
    }
}

/// Ordering for numbers and strings; everything else is a type error.
fn compare_values(left: &Value, right: &Value) -> EvalResult<Ordering> {
    let type_error = || EvalError::Type {
        expected: "comparable types (numbers or strings)",
        got: format!("{} vs {}", left.type_name(), right.type_name()),
    };
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).ok_or_else(type_error),
        (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b).ok_or_else(type_error),
        (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)).ok_or_else(type_error),
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        _ => Err(type_error()),
    }
}

fn eval_unary(op: UnaryOp, value: Value) -> EvalResult<Value> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!is_truthy(&value))),
        UnaryOp::Neg => match value {
            Value::Int(i) => Ok(i
                .checked_neg()
                .map(Value::Int)
                .unwrap_or(Value::Float(-(i as f64)))),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(EvalError::Type { expected: "number", got: other.type_name().to_string() }),
        },
    }
}

/// `+` adds numbers, concatenates when either side is a string, and
/// concatenates lists.
fn eval_add(left: Value, right: Value) -> EvalResult<Value> {
    match (left, right) {
        (Value::Str(a), b) => Ok(Value::Str(format!("{a}{b}"))),
        (a, Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
        (Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Ok(Value::List(a))
        }
        (a, b) => eval_numeric(a, b, "+", i64::checked_add, |a, b| a + b),
    }
}

/// Shared int/float arithmetic: integer results stay integers, integer
/// overflow degrades to float instead of wrapping or panicking.
fn eval_numeric(
    left: Value,
    right: Value,
    op: &'static str,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    float_op: impl Fn(f64, f64) -> f64,
) -> EvalResult<Value> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => Ok(int_op(*a, *b)
            .map(Value::Int)
            .unwrap_or_else(|| Value::Float(float_op(*a as f64, *b as f64)))),
        (Value::Int(a), Value::Float(b)) => Ok(Value::Float(float_op(*a as f64, *b))),
        (Value::Float(a), Value::Int(b)) => Ok(Value::Float(float_op(*a, *b as f64))),
        (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_op(*a, *b))),
        _ => Err(EvalError::Type {
            expected: "numbers",
            got: format!("{} {op} {}", left.type_name(), right.type_name()),
        }),
    }
}

/// Division. Division by zero yields 0 (permissive-arithmetic policy),
/// and an integer division that comes out even stays an integer.
fn eval_div(left: Value, right: Value) -> EvalResult<Value> {
    if is_zero(&right) {
        return Ok(Value::Int(0));
    }
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => {
            if a % b == 0 {
                Ok(Value::Int(a / b))
            } else {
                Ok(Value::Float(*a as f64 / *b as f64))
            }
        }
        _ => eval_numeric(left, right, "/", |_, _| None, |a, b| a / b),
    }
}

/// Remainder. Shares the division-by-zero-yields-0 policy.
fn eval_mod(left: Value, right: Value) -> EvalResult<Value> {
    if is_zero(&right) {
        return Ok(Value::Int(0));
    }
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a % b)),
        _ => eval_numeric(left, right, "%", |_, _| None, |a, b| a % b),
    }
}

fn is_zero(value: &Value) -> bool {
    matches!(value, Value::Int(0)) || matches!(value, Value::Float(f) if *f == 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::state::StateDocument;
    use serde_json::json;

    fn run(source: &str) -> (Vec<String>, StateDocument) {
        run_with_state(source, StateDocument::new()).expect("script runs")
    }

    fn run_with_state(
        source: &str,
        state: StateDocument,
    ) -> Result<(Vec<String>, StateDocument), EvalError> {
        let program = parse(source);
        let mut ctx = ExecutionContext::new(state);
        let result = interpret(&program, &mut ctx);
        let (state, output) = ctx.into_parts();
        result.map(|()| (output, state))
    }

    fn run_err(source: &str) -> EvalError {
        run_with_state(source, StateDocument::new()).expect_err("script fails")
    }

    #[test]
    fn set_and_print_arithmetic() {
        let (output, state) = run("SET x = 2\nSET y = 3\nPRINT x + y");
        assert_eq!(output, ["5"]);
        // Variables and state are distinct namespaces.
        assert_eq!(state, StateDocument::new());
    }

    #[test]
    fn for_over_count_iterates_from_zero_exclusive() {
        let (output, _) = run("FOR i IN 3\n PRINT i\nENDFOR");
        assert_eq!(output, ["0", "1", "2"]);
    }

    #[test]
    fn for_over_list() {
        let (output, _) = run(r#"FOR x IN ["a", "b"] PRINT x ENDFOR"#);
        assert_eq!(output, ["a", "b"]);
    }

    #[test]
    fn division_by_zero_yields_zero() {
        let (output, _) = run("PRINT 5 / 0");
        assert_eq!(output, ["0"]);
        let (output, _) = run("PRINT 5.0 / 0.0");
        assert_eq!(output, ["0"]);
        let (output, _) = run("PRINT 5 % 0");
        assert_eq!(output, ["0"]);
    }

    #[test]
    fn integer_division_stays_integral_when_even() {
        let (output, _) = run("PRINT 6 / 3");
        assert_eq!(output, ["2"]);
        let (output, _) = run("PRINT 7 / 2");
        assert_eq!(output, ["3.5"]);
    }

    #[test]
    fn string_concatenation() {
        let (output, _) = run(r#"PRINT "n=" + 4"#);
        assert_eq!(output, ["n=4"]);
    }

    #[test]
    fn if_runs_exactly_one_branch() {
        let (output, _) = run("IF 1 < 2 PRINT \"yes\" ELSE PRINT \"no\" ENDIF");
        assert_eq!(output, ["yes"]);
        let (output, _) = run("IF 1 > 2 PRINT \"yes\" ELSE PRINT \"no\" ENDIF");
        assert_eq!(output, ["no"]);
    }

    #[test]
    fn while_reevaluates_condition() {
        let (output, _) = run("SET n = 0 WHILE n < 3 PRINT n SET n = n + 1 ENDWHILE");
        assert_eq!(output, ["0", "1", "2"]);
    }

    #[test]
    fn while_true_trips_iteration_limit() {
        let err = run_err("WHILE TRUE ENDWHILE");
        assert_eq!(err, EvalError::IterationLimit { limit: 10_000 });
    }

    #[test]
    fn iteration_limit_counts_all_loops_together() {
        // Two loops of 6_000 share one counter with a 10_000 bound.
        let err = run_err(
            "FOR i IN 6000 ENDFOR\nFOR j IN 6000 ENDFOR",
        );
        assert_eq!(err, EvalError::IterationLimit { limit: 10_000 });
    }

    #[test]
    fn iteration_limit_allows_exactly_the_bound() {
        let program = parse("FOR i IN 10 PRINT i ENDFOR");
        let mut ctx = ExecutionContext::with_limits(StateDocument::new(), 10, 64);
        assert!(interpret(&program, &mut ctx).is_ok());
        assert_eq!(ctx.output_lines().len(), 10);
    }

    #[test]
    fn partial_output_survives_a_failed_run() {
        let program = parse("PRINT \"before\" WHILE TRUE ENDWHILE");
        let mut ctx = ExecutionContext::new(StateDocument::new());
        assert!(interpret(&program, &mut ctx).is_err());
        assert_eq!(ctx.output_lines(), ["before"]);
    }

    #[test]
    fn return_unwinds_loop_inside_conditional_inside_function() {
        let (output, _) = run(
            "DEF find(limit)\n\
             FOR i IN 10\n\
               IF i >= limit\n\
                 RETURN i\n\
               ENDIF\n\
               PRINT i\n\
             ENDFOR\n\
             PRINT \"unreached\"\n\
             RETURN -1\n\
             ENDDEF\n\
             PRINT find(2)",
        );
        // Iterations 0 and 1 print, the RETURN at i == 2 skips the rest
        // of the loop and the trailing function statements.
        assert_eq!(output, ["0", "1", "2"]);
    }

    #[test]
    fn function_scope_is_snapshot_and_restore() {
        let (output, _) = run(
            "SET x = 1\n\
             DEF shadow()\n\
               SET x = 99\n\
               PRINT x\n\
             ENDDEF\n\
             shadow()\n\
             PRINT x",
        );
        assert_eq!(output, ["99", "1"]);
    }

    #[test]
    fn user_function_shadows_builtin() {
        let (output, _) = run(
            "DEF LEN(x) RETURN 42 ENDDEF\n\
             PRINT LEN(\"abc\")",
        );
        assert_eq!(output, ["42"]);
    }

    #[test]
    fn builtin_reached_when_not_shadowed() {
        let (output, _) = run("PRINT LEN(\"abc\")");
        assert_eq!(output, ["3"]);
    }

    #[test]
    fn function_without_return_yields_null() {
        let (output, _) = run("DEF noop() ENDDEF PRINT noop()");
        assert_eq!(output, ["null"]);
    }

    #[test]
    fn deep_recursion_is_a_resource_error_not_a_crash() {
        let err = run_err(
            "DEF spin(n) RETURN spin(n + 1) ENDDEF\n\
             spin(0)",
        );
        assert_eq!(err, EvalError::RecursionLimit { limit: 64 });
    }

    #[test]
    fn bounded_recursion_works() {
        let (output, _) = run(
            "DEF fact(n)\n\
               IF n <= 1 RETURN 1 ENDIF\n\
               RETURN n * fact(n - 1)\n\
             ENDDEF\n\
             PRINT fact(10)",
        );
        assert_eq!(output, ["3628800"]);
    }

    #[test]
    fn capability_call_fails_loudly_locally() {
        let err = run_err(r#"FILE.READ("a.txt")"#);
        assert_eq!(
            err,
            EvalError::CapabilityMisuse { namespace: "FILE".into(), operation: "READ".into() }
        );
    }

    #[test]
    fn state_get_and_set_round_trip() {
        let initial = StateDocument::from_json(json!({"counts": {"runs": 2}}));
        let (output, state) = run_with_state(
            "SET n = STATE GET counts.runs\n\
             STATE SET counts.runs = n + 1\n\
             PRINT STATE GET counts.runs",
            initial,
        )
        .unwrap();
        assert_eq!(output, ["3"]);
        assert_eq!(state.as_json(), &json!({"counts": {"runs": 3}}));
    }

    #[test]
    fn missing_state_path_reads_null() {
        let (output, _) = run("PRINT STATE GET nothing.here");
        assert_eq!(output, ["null"]);
    }

    #[test]
    fn short_circuit_and_or() {
        // The right side would be a misuse error if evaluated.
        let (output, _) = run("PRINT FALSE AND boom()");
        assert_eq!(output, ["false"]);
        let (output, _) = run("PRINT TRUE OR boom()");
        assert_eq!(output, ["true"]);
    }

    #[test]
    fn comparison_chain_and_logic() {
        let (output, _) = run("PRINT 1 < 2 AND 2 <= 2 AND 3 != 4");
        assert_eq!(output, ["true"]);
    }

    #[test]
    fn unary_operators() {
        let (output, _) = run("PRINT -3 PRINT NOT 0 PRINT NOT \"x\"");
        assert_eq!(output, ["-3", "true", "false"]);
    }

    #[test]
    fn undefined_variable_is_an_error() {
        assert_eq!(run_err("PRINT ghost"), EvalError::UndefinedVariable("ghost".into()));
    }

    #[test]
    fn undefined_function_is_an_error() {
        assert_eq!(run_err("PRINT ghost()"), EvalError::UndefinedFunction("ghost".into()));
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let err = run_err("DEF f(a, b) RETURN a ENDDEF\nf(1)");
        assert_eq!(err, EvalError::Arity { name: "f".into(), expected: 2, got: 1 });
    }

    #[test]
    fn idempotent_across_independent_contexts() {
        let source = "SET x = 1\nPRINT x";
        let (first, _) = run(source);
        let (second, _) = run(source);
        assert_eq!(first, second);
        assert_eq!(first, ["1"]);
    }

    #[test]
    fn mixed_int_float_comparison() {
        let (output, _) = run("PRINT 1 < 1.5");
        assert_eq!(output, ["true"]);
        let (output, _) = run("PRINT 2 == 2.0");
        assert_eq!(output, ["true"]);
    }

    #[test]
    fn type_error_on_ordering_mismatch() {
        assert!(matches!(run_err("PRINT 1 < \"two\""), EvalError::Type { .. }));
    }

    #[test]
    fn for_over_non_iterable_is_an_error() {
        assert!(matches!(run_err("FOR x IN \"abc\" ENDFOR"), EvalError::BadIterable(_)));
        assert!(matches!(run_err("FOR x IN TRUE ENDFOR"), EvalError::BadIterable(_)));
    }

    #[test]
    fn list_builtins_compose() {
        let (output, _) = run("PRINT JOIN(RANGE(3), \"-\")");
        assert_eq!(output, ["0-1-2"]);
    }
}
