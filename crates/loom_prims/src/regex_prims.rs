//! Regex match/tokenize/replace (spec.md §4.4), backed by the `regex`
//! crate. The pattern is baked into the call site as `PrimData::Text`
//! — the evaluator core never depends on `regex` itself; only this
//! crate compiles patterns (see `loom_eval::value::Value::RegExp`'s
//! doc comment). Compiled patterns are cached per primitive instance
//! since a given call site's pattern never changes between calls.

use loom_ast::PrimData;
use loom_eval::{exception, PrimReceiver, Primitive, RecordData, Value, ValueRef};
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

fn compiled<'a>(cache: &'a RefCell<HashMap<String, Regex>>, pattern: &str) -> Result<(), ValueRef> {
    if cache.borrow().contains_key(pattern) {
        return Ok(());
    }
    match Regex::new(pattern) {
        Ok(re) => {
            cache.borrow_mut().insert(pattern.to_string(), re);
            Ok(())
        }
        Err(e) => Err(exception(format!("regex: invalid pattern {pattern:?}: {e}"))),
    }
}

fn as_string<'a>(value: &'a ValueRef, who: &str) -> Result<&'a str, ValueRef> {
    match &**value {
        Value::String(s) => Ok(s.as_ref()),
        _ => Err(exception(format!("{who}: expected a string argument"))),
    }
}

fn pattern_of(data: &PrimData, who: &str) -> Result<&str, ValueRef> {
    match data {
        PrimData::Text(pattern) => Ok(pattern.as_str()),
        _ => Err(exception(format!("{who}: missing regex pattern configuration"))),
    }
}

fn bool_value(b: bool) -> ValueRef {
    let sum = loom_ast::Sum::bool_sum();
    let ctor = if b { 1 } else { 0 };
    Rc::new(Value::Record(RecordData { sum, ctor, fields: Vec::new() }))
}

/// `regex_match(text)`, pattern baked in at the call site: `True`/
/// `False` record, matching the same boolean encoding
/// `crate::integers::Compare` uses.
pub struct RegexMatch {
    cache: RefCell<HashMap<String, Regex>>,
}

impl RegexMatch {
    pub fn new() -> Self {
        RegexMatch { cache: RefCell::new(HashMap::new()) }
    }
}

impl Default for RegexMatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Primitive for RegexMatch {
    fn call(&self, data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        let result = (|| {
            let pattern = pattern_of(data, "regex_match")?;
            compiled(&self.cache, pattern)?;
            let text = as_string(&args[0], "regex_match")?;
            let cache = self.cache.borrow();
            let re = cache.get(pattern).expect("just compiled");
            Ok(bool_value(re.is_match(text)))
        })();
        receiver.complete(result.unwrap_or_else(|e| e));
    }
}

/// `regex_tokenize(text)`: the list of non-overlapping matches of
/// the call-site pattern, built with `crate::list`'s shared list
/// constructors so the result round-trips through the evaluator's
/// ordinary list machinery.
pub struct RegexTokenize {
    cache: RefCell<HashMap<String, Regex>>,
    list_sum: Rc<loom_ast::Sum>,
}

impl RegexTokenize {
    pub fn new(list_sum: Rc<loom_ast::Sum>) -> Self {
        RegexTokenize { cache: RefCell::new(HashMap::new()), list_sum }
    }
}

impl Primitive for RegexTokenize {
    fn call(&self, data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        let result = (|| {
            let pattern = pattern_of(data, "regex_tokenize")?;
            compiled(&self.cache, pattern)?;
            let text = as_string(&args[0], "regex_tokenize")?;
            let cache = self.cache.borrow();
            let re = cache.get(pattern).expect("just compiled");
            let tokens: Vec<ValueRef> =
                re.find_iter(text).map(|m| Rc::new(Value::String(Rc::from(m.as_str()))) as ValueRef).collect();
            Ok(build_list(&self.list_sum, tokens))
        })();
        receiver.complete(result.unwrap_or_else(|e| e));
    }
}

fn build_list(sum: &Rc<loom_ast::Sum>, items: Vec<ValueRef>) -> ValueRef {
    let mut acc = Rc::new(Value::Record(RecordData { sum: sum.clone(), ctor: 0, fields: Vec::new() }));
    for item in items.into_iter().rev() {
        let head = loom_eval::Promise::new();
        head.fulfill(item);
        let tail = loom_eval::Promise::new();
        tail.fulfill(acc);
        acc = Rc::new(Value::Record(RecordData { sum: sum.clone(), ctor: 1, fields: vec![head, tail] }));
    }
    acc
}

/// `regex_replace(text, replacement)`, pattern baked in at the call
/// site: every match is substituted with `replacement`.
pub struct RegexReplace {
    cache: RefCell<HashMap<String, Regex>>,
}

impl RegexReplace {
    pub fn new() -> Self {
        RegexReplace { cache: RefCell::new(HashMap::new()) }
    }
}

impl Default for RegexReplace {
    fn default() -> Self {
        Self::new()
    }
}

impl Primitive for RegexReplace {
    fn call(&self, data: &PrimData, args: Vec<ValueRef>, receiver: Rc<dyn PrimReceiver>) {
        let result = (|| {
            let pattern = pattern_of(data, "regex_replace")?;
            compiled(&self.cache, pattern)?;
            let text = as_string(&args[0], "regex_replace")?;
            let replacement = as_string(&args[1], "regex_replace")?;
            let cache = self.cache.borrow();
            let re = cache.get(pattern).expect("just compiled");
            let replaced = re.replace_all(text, replacement).into_owned();
            Ok(Rc::new(Value::String(Rc::from(replaced.as_str()))))
        })();
        receiver.complete(result.unwrap_or_else(|e| e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_ast::{Constructor, Sum};
    use loom_base::Symbol;

    struct Capture(std::cell::RefCell<Option<ValueRef>>);
    impl PrimReceiver for Capture {
        fn complete(&self, value: ValueRef) {
            *self.0.borrow_mut() = Some(value);
        }
    }

    fn run(prim: &dyn Primitive, pattern: &str, args: Vec<ValueRef>) -> ValueRef {
        let capture = Rc::new(Capture(std::cell::RefCell::new(None)));
        prim.call(&PrimData::Text(pattern.to_string()), args, capture.clone());
        capture.0.borrow().clone().unwrap()
    }

    fn s(text: &str) -> ValueRef {
        Rc::new(Value::String(Rc::from(text)))
    }

    fn test_list_sum() -> Rc<Sum> {
        Sum::new(Symbol::EMPTY, vec![Constructor { name: Symbol::EMPTY, arity: 0 }, Constructor { name: Symbol::EMPTY, arity: 2 }])
    }

    #[test]
    fn match_true_on_hit() {
        let result = run(&RegexMatch::new(), r"\d+", vec![s("abc123")]);
        match &*result {
            Value::Record(rec) => assert_eq!(rec.ctor, 1),
            _ => panic!("expected Record"),
        }
    }

    #[test]
    fn match_false_on_miss() {
        let result = run(&RegexMatch::new(), r"\d+", vec![s("abc")]);
        match &*result {
            Value::Record(rec) => assert_eq!(rec.ctor, 0),
            _ => panic!("expected Record"),
        }
    }

    #[test]
    fn tokenize_finds_every_match() {
        let sum = test_list_sum();
        let result = run(&RegexTokenize::new(sum), r"\d+", vec![s("a1 b22 c333")]);
        let mut tokens = Vec::new();
        let mut current = result;
        loop {
            match &*current.clone() {
                Value::Record(rec) if rec.ctor == 0 => break,
                Value::Record(rec) => {
                    let head = rec.fields[0].value().unwrap();
                    if let Value::String(s) = &*head {
                        tokens.push(s.to_string());
                    }
                    current = rec.fields[1].value().unwrap();
                }
                _ => panic!("expected list Record"),
            }
        }
        assert_eq!(tokens, vec!["1", "22", "333"]);
    }

    #[test]
    fn replace_substitutes_every_match() {
        let result = run(&RegexReplace::new(), r"\d+", vec![s("a1b22"), s("#")]);
        assert!(matches!(&*result, Value::String(s) if &**s == "a#b#"));
    }

    #[test]
    fn invalid_pattern_is_an_exception() {
        let result = run(&RegexMatch::new(), "(unterminated", vec![s("x")]);
        assert!(matches!(&*result, Value::Exception(_)));
    }
}
