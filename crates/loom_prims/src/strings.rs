//! String operations (spec.md §4.4): concatenation, length, slicing,
//! and case conversion. Each is registered under its own `Symbol`,
//! taking `PrimData::None` — unlike arithmetic, there's no shared
//! per-call-site configuration to distinguish between string ops,
//! so one primitive per operation is the simpler encoding.

use loom_ast::PrimData;
use loom_eval::{exception, PrimReceiver, Primitive, Value, ValueRef};
use std::rc::Rc;

fn as_string(value: &ValueRef, who: &str) -> Result<Rc<str>, ValueRef> {
    match &**value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(exception(format!("{who}: expected a string argument"))),
    }
}

fn as_index(value: &ValueRef, who: &str) -> Result<usize, ValueRef> {
    match &**value {
        Value::Integer(i) => i.to_string().parse::<usize>().map_err(|_| exception(format!("{who}: index out of range"))),
        _ => Err(exception(format!("{who}: expected an integer index"))),
    }
}

pub struct Concat;
impl Primitive for Concat {
    fn call(&self, _data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        let mut args = args.into_iter();
        let a = args.next().expect("concat called with fewer than 2 arguments");
        let b = args.next().expect("concat called with fewer than 2 arguments");
        let result = match (as_string(&a, "concat"), as_string(&b, "concat")) {
            (Ok(a), Ok(b)) => Rc::new(Value::String(Rc::from(format!("{a}{b}").as_str()))),
            (Err(e), _) | (_, Err(e)) => e,
        };
        receiver.complete(result);
    }
}

pub struct Length;
impl Primitive for Length {
    fn call(&self, _data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        let s = args.into_iter().next().expect("length called with no arguments");
        let result = match as_string(&s, "length") {
            Ok(s) => Rc::new(Value::Integer(num_bigint::BigInt::from(s.chars().count()))),
            Err(e) => e,
        };
        receiver.complete(result);
    }
}

/// `slice(s, start, end)`: a half-open, character-index range.
pub struct Slice;
impl Primitive for Slice {
    fn call(&self, _data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        let mut args = args.into_iter();
        let s = args.next().expect("slice called with fewer than 3 arguments");
        let start = args.next().expect("slice called with fewer than 3 arguments");
        let end = args.next().expect("slice called with fewer than 3 arguments");

        let result = (|| {
            let s = as_string(&s, "slice")?;
            let start = as_index(&start, "slice")?;
            let end = as_index(&end, "slice")?;
            if start > end || end > s.chars().count() {
                return Err(exception("slice: range out of bounds"));
            }
            let sliced: String = s.chars().skip(start).take(end - start).collect();
            Ok(Rc::new(Value::String(Rc::from(sliced.as_str()))))
        })();
        receiver.complete(result.unwrap_or_else(|e| e));
    }
}

pub struct Upper;
impl Primitive for Upper {
    fn call(&self, _data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        let s = args.into_iter().next().expect("upper called with no arguments");
        let result = match as_string(&s, "upper") {
            Ok(s) => Rc::new(Value::String(Rc::from(s.to_uppercase().as_str()))),
            Err(e) => e,
        };
        receiver.complete(result);
    }
}

pub struct Lower;
impl Primitive for Lower {
    fn call(&self, _data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        let s = args.into_iter().next().expect("lower called with no arguments");
        let result = match as_string(&s, "lower") {
            Ok(s) => Rc::new(Value::String(Rc::from(s.to_lowercase().as_str()))),
            Err(e) => e,
        };
        receiver.complete(result);
    }
}
