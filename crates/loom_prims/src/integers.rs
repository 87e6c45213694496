//! Arbitrary-precision integer arithmetic and comparisons (spec.md
//! §4.4). Both are a single shared primitive, dispatching on the
//! operator carried in `PrimData::Text` — "which arithmetic operator
//! a shared numeric primitive should perform" (`loom_ast::PrimData`'s
//! own doc comment), baked in at the call site by the resolver.

use loom_ast::PrimData;
use loom_eval::{exception, PrimReceiver, Primitive, Value, ValueRef};
use num_bigint::BigInt;
use std::rc::Rc;

fn as_integer(value: &ValueRef, who: &str) -> Result<BigInt, ValueRef> {
    match &**value {
        Value::Integer(i) => Ok(i.clone()),
        _ => Err(exception(format!("{who}: expected an integer argument"))),
    }
}

/// `bool_sum` matches `loom_ast::Sum::bool_sum` structurally — built
/// fresh per call, since nothing compares booleans by `Sum` identity
/// (only by constructor index, see `loom_eval::eval::destruct_on`).
fn bool_value(b: bool) -> ValueRef {
    let sum = loom_ast::Sum::bool_sum();
    let ctor = if b { 1 } else { 0 };
    Rc::new(Value::Record(loom_eval::RecordData { sum, ctor, fields: Vec::new() }))
}

/// Arithmetic: `add`, `sub`, `mul`, `div`, `neg` (unary).
pub struct Arithmetic;
impl Primitive for Arithmetic {
    fn call(&self, data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        let op = match data {
            PrimData::Text(op) => op.as_str(),
            _ => {
                receiver.complete(exception("arithmetic: missing operator configuration"));
                return;
            }
        };

        let result = (|| {
            if op == "neg" {
                let a = as_integer(&args[0], "neg")?;
                return Ok(Rc::new(Value::Integer(-a)));
            }
            let a = as_integer(&args[0], op)?;
            let b = as_integer(&args[1], op)?;
            match op {
                "add" => Ok(Rc::new(Value::Integer(a + b))),
                "sub" => Ok(Rc::new(Value::Integer(a - b))),
                "mul" => Ok(Rc::new(Value::Integer(a * b))),
                "div" => {
                    if b == BigInt::from(0) {
                        Err(exception("div: division by zero"))
                    } else {
                        Ok(Rc::new(Value::Integer(a / b)))
                    }
                }
                other => Err(exception(format!("arithmetic: unknown operator {other:?}"))),
            }
        })();
        receiver.complete(result.unwrap_or_else(|e| e));
    }
}

/// Comparisons: `eq`, `neq`, `lt`, `lte`, `gt`, `gte`. Result is a
/// `Value::Record` built from `Sum::bool_sum`, consistent with how
/// match-guard lowering represents booleans (spec.md §4.1.5).
pub struct Compare;
impl Primitive for Compare {
    fn call(&self, data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        let op = match data {
            PrimData::Text(op) => op.as_str(),
            _ => {
                receiver.complete(exception("compare: missing operator configuration"));
                return;
            }
        };
        let result = (|| {
            let a = as_integer(&args[0], op)?;
            let b = as_integer(&args[1], op)?;
            let outcome = match op {
                "eq" => a == b,
                "neq" => a != b,
                "lt" => a < b,
                "lte" => a <= b,
                "gt" => a > b,
                "gte" => a >= b,
                other => return Err(exception(format!("compare: unknown operator {other:?}"))),
            };
            Ok(bool_value(outcome))
        })();
        receiver.complete(result.unwrap_or_else(|e| e));
    }
}
