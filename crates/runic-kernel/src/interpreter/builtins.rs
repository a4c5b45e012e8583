//! The fixed builtin function table.
//!
//! Builtins are consulted only when no user-defined function of the same
//! name exists — user definitions shadow them. Lookup is by uppercase
//! name, matching the language's case-folded keyword policy.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::Value;

use super::eval::EvalError;

/// Call a builtin by (already uppercased) name.
///
/// Returns `None` when no builtin of that name exists, so the caller can
/// report an undefined function.
pub fn call_builtin(name: &str, args: &[Value]) -> Option<Result<Value, EvalError>> {
    let result = match name {
        "LEN" => len(args),
        "UPPER" => map_string(name, args, |s| s.to_uppercase()),
        "LOWER" => map_string(name, args, |s| s.to_lowercase()),
        "TRIM" => map_string(name, args, |s| s.trim().to_string()),
        "ROUND" => map_number(name, args, f64::round),
        "FLOOR" => map_number(name, args, f64::floor),
        "CEIL" => map_number(name, args, f64::ceil),
        "ABS" => abs(args),
        "MIN" => fold_numeric(name, args, f64::min),
        "MAX" => fold_numeric(name, args, f64::max),
        "STR" => one_arg(name, args).map(|v| Value::Str(v.to_string())),
        "NUM" => num(args),
        "RANGE" => range(args),
        "JOIN" => join(args),
        "NOW" => now(),
        _ => return None,
    };
    Some(result)
}

fn one_arg<'a>(name: &str, args: &'a [Value]) -> Result<&'a Value, EvalError> {
    match args {
        [v] => Ok(v),
        _ => Err(EvalError::Arity { name: name.to_string(), expected: 1, got: args.len() }),
    }
}

fn len(args: &[Value]) -> Result<Value, EvalError> {
    match one_arg("LEN", args)? {
        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
        Value::List(items) => Ok(Value::Int(items.len() as i64)),
        other => Err(EvalError::Type {
            expected: "string or list",
            got: other.type_name().to_string(),
        }),
    }
}

fn map_string(name: &str, args: &[Value], f: impl Fn(&str) -> String) -> Result<Value, EvalError> {
    match one_arg(name, args)? {
        Value::Str(s) => Ok(Value::Str(f(s))),
        other => Err(EvalError::Type { expected: "string", got: other.type_name().to_string() }),
    }
}

fn map_number(name: &str, args: &[Value], f: impl Fn(f64) -> f64) -> Result<Value, EvalError> {
    match one_arg(name, args)? {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(x) => Ok(Value::Int(f(*x) as i64)),
        other => Err(EvalError::Type { expected: "number", got: other.type_name().to_string() }),
    }
}

fn abs(args: &[Value]) -> Result<Value, EvalError> {
    match one_arg("ABS", args)? {
        Value::Int(i) => Ok(Value::Int(i.saturating_abs())),
        Value::Float(x) => Ok(Value::Float(x.abs())),
        other => Err(EvalError::Type { expected: "number", got: other.type_name().to_string() }),
    }
}

fn fold_numeric(name: &str, args: &[Value], f: impl Fn(f64, f64) -> f64) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::Arity { name: name.to_string(), expected: 1, got: 0 });
    }
    let mut all_int = true;
    let mut acc: Option<f64> = None;
    for arg in args {
        let x = match arg {
            Value::Int(i) => *i as f64,
            Value::Float(x) => {
                all_int = false;
                *x
            }
            other => {
                return Err(EvalError::Type {
                    expected: "number",
                    got: other.type_name().to_string(),
                })
            }
        };
        acc = Some(match acc {
            Some(a) => f(a, x),
            None => x,
        });
    }
    let result = acc.unwrap_or(0.0);
    if all_int {
        Ok(Value::Int(result as i64))
    } else {
        Ok(Value::Float(result))
    }
}

fn num(args: &[Value]) -> Result<Value, EvalError> {
    match one_arg("NUM", args)? {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Float(x) => Ok(Value::Float(*x)),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Str(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Ok(Value::Int(i))
            } else if let Ok(x) = s.parse::<f64>() {
                Ok(Value::Float(x))
            } else {
                Err(EvalError::Type { expected: "numeric string", got: format!("{s:?}") })
            }
        }
        other => Err(EvalError::Type { expected: "number or string", got: other.type_name().to_string() }),
    }
}

fn range(args: &[Value]) -> Result<Value, EvalError> {
    match one_arg("RANGE", args)? {
        Value::Int(n) => Ok(Value::List((0..(*n).max(0)).map(Value::Int).collect())),
        other => Err(EvalError::Type { expected: "int", got: other.type_name().to_string() }),
    }
}

fn join(args: &[Value]) -> Result<Value, EvalError> {
    let (items, sep) = match args {
        [Value::List(items)] => (items, ", ".to_string()),
        [Value::List(items), Value::Str(sep)] => (items, sep.clone()),
        [other, ..] => {
            return Err(EvalError::Type {
                expected: "list",
                got: other.type_name().to_string(),
            })
        }
        [] => return Err(EvalError::Arity { name: "JOIN".into(), expected: 1, got: 0 }),
    };
    let joined = items.iter().map(ToString::to_string).collect::<Vec<_>>().join(&sep);
    Ok(Value::Str(joined))
}

/// Current unix timestamp in whole seconds.
fn now() -> Result<Value, EvalError> {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    Ok(Value::Int(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Value]) -> Value {
        call_builtin(name, args).expect("builtin exists").expect("builtin ok")
    }

    #[test]
    fn unknown_builtin_is_none() {
        assert!(call_builtin("NO_SUCH_FN", &[]).is_none());
    }

    #[test]
    fn len_of_string_and_list() {
        assert_eq!(call("LEN", &[Value::Str("hello".into())]), Value::Int(5));
        assert_eq!(call("LEN", &[Value::List(vec![Value::Null; 3])]), Value::Int(3));
    }

    #[test]
    fn string_case_and_trim() {
        assert_eq!(call("UPPER", &[Value::Str("ab".into())]), Value::Str("AB".into()));
        assert_eq!(call("LOWER", &[Value::Str("AB".into())]), Value::Str("ab".into()));
        assert_eq!(call("TRIM", &[Value::Str("  x ".into())]), Value::Str("x".into()));
    }

    #[test]
    fn rounding_family() {
        assert_eq!(call("ROUND", &[Value::Float(2.5)]), Value::Int(3));
        assert_eq!(call("FLOOR", &[Value::Float(2.9)]), Value::Int(2));
        assert_eq!(call("CEIL", &[Value::Float(2.1)]), Value::Int(3));
        assert_eq!(call("ROUND", &[Value::Int(7)]), Value::Int(7));
    }

    #[test]
    fn min_max_mixed() {
        assert_eq!(call("MIN", &[Value::Int(3), Value::Int(1), Value::Int(2)]), Value::Int(1));
        assert_eq!(call("MAX", &[Value::Int(1), Value::Float(2.5)]), Value::Float(2.5));
    }

    #[test]
    fn range_iterates_from_zero_exclusive() {
        assert_eq!(
            call("RANGE", &[Value::Int(3)]),
            Value::List(vec![Value::Int(0), Value::Int(1), Value::Int(2)])
        );
        assert_eq!(call("RANGE", &[Value::Int(-1)]), Value::List(vec![]));
    }

    #[test]
    fn str_and_num_conversions() {
        assert_eq!(call("STR", &[Value::Int(42)]), Value::Str("42".into()));
        assert_eq!(call("NUM", &[Value::Str("42".into())]), Value::Int(42));
        assert_eq!(call("NUM", &[Value::Str("2.5".into())]), Value::Float(2.5));
        assert!(call_builtin("NUM", &[Value::Str("nope".into())]).unwrap().is_err());
    }

    #[test]
    fn join_with_separator() {
        let xs = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(call("JOIN", &[xs.clone(), Value::Str("-".into())]), Value::Str("1-2".into()));
        assert_eq!(call("JOIN", &[xs]), Value::Str("1, 2".into()));
    }

    #[test]
    fn now_is_a_plausible_timestamp() {
        let Value::Int(secs) = call("NOW", &[]) else {
            panic!("NOW returns int");
        };
        // After 2020-01-01 and within this century.
        assert!(secs > 1_577_836_800);
        assert!(secs < 4_102_444_800);
    }

    #[test]
    fn wrong_arity_is_an_error() {
        assert!(matches!(
            call_builtin("LEN", &[]).unwrap(),
            Err(EvalError::Arity { .. })
        ));
    }
}
