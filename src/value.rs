//! The runtime value model: a tagged union of every value the evaluator can
//! produce, plus symbol/keyword interning and the persistent hash-map key type.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::env::Environment;
use crate::error::EvalError;

/// A native function implementing a core-environment builtin.
pub type BuiltinFn = fn(&[Value]) -> Result<Value, EvalError>;

/// A user-defined function or macro.
///
/// `is_macro` is fixed at construction time: `defmacro!` builds the Lambda
/// with the flag set rather than mutating an existing function value, since
/// macro-ness changes how the evaluator feeds it arguments at every call site.
pub struct LambdaData {
    pub fixed_params: Vec<Rc<str>>,
    pub variadic: Option<Rc<str>>,
    pub body: Value,
    pub env: Rc<Environment>,
    pub is_macro: bool,
    pub meta: Value,
}

/// Runtime value. See SPEC_FULL.md §3 for the full invariant list.
///
/// `List`, `Vector`, `HashMap`, and `BuiltIn` each carry a trailing metadata
/// slot (default `Nil`) alongside their payload, mirroring `Lambda`'s `meta`
/// field; `with-meta`/`meta` read and replace it without touching the
/// payload itself.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Str(Rc<str>),
    Sym(Rc<str>),
    Kw(Rc<str>),
    /// The empty `Vec` is the unique empty-list sentinel ("eol"), distinct
    /// from `Nil` even though both print differently and behave differently
    /// as a sequence (`(list? nil)` is false, `(list? (list))` is true).
    List(Rc<Vec<Value>>, Value),
    Vector(Rc<Vec<Value>>, Value),
    HashMap(Rc<BTreeMap<HashKey, Value>>, Value),
    BuiltIn(BuiltinFn, Value),
    Lambda(Rc<LambdaData>),
    Atom(Rc<RefCell<Value>>),
}

/// The subset of `Value` that may appear as a hash-map key, ordered so the
/// map prints deterministically (see the invariant: "hash-map key set is
/// exactly {Str, Sym, Kw}").
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum HashKey {
    Str(Rc<str>),
    Sym(Rc<str>),
    Kw(Rc<str>),
}

impl HashKey {
    pub fn from_value(v: &Value) -> Result<HashKey, EvalError> {
        match v {
            Value::Str(s) => Ok(HashKey::Str(s.clone())),
            Value::Sym(s) => Ok(HashKey::Sym(s.clone())),
            Value::Kw(s) => Ok(HashKey::Kw(s.clone())),
            other => Err(EvalError::type_error(
                "hash-map key",
                "String, Symbol, or Keyword",
                other,
                0,
            )),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            HashKey::Str(s) => Value::Str(s),
            HashKey::Sym(s) => Value::Sym(s),
            HashKey::Kw(s) => Value::Kw(s),
        }
    }
}

pub fn empty_list() -> Value {
    Value::List(Rc::new(Vec::new()), Value::Nil)
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(items), Value::Nil)
    }

    pub fn vector(items: Vec<Value>) -> Value {
        Value::Vector(Rc::new(items), Value::Nil)
    }

    pub fn map(entries: BTreeMap<HashKey, Value>) -> Value {
        Value::HashMap(Rc::new(entries), Value::Nil)
    }

    pub fn builtin(f: BuiltinFn) -> Value {
        Value::BuiltIn(f, Value::Nil)
    }

    pub fn sym(name: impl AsRef<str>) -> Value {
        Value::Sym(intern_symbol(name.as_ref()))
    }

    pub fn kw(name: impl AsRef<str>) -> Value {
        Value::Kw(intern_keyword(name.as_ref()))
    }

    pub fn str(s: impl Into<Rc<str>>) -> Value {
        Value::Str(s.into())
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Nil)
    }

    /// A sequence is a List or Vector; used by `first`/`rest`/`count`/`nth`
    /// and friends which treat the two interchangeably.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::List(items, _) | Value::Vector(items, _) => Some(items),
            _ => None,
        }
    }

    /// The opaque metadata value attached via `with-meta`, or `Nil` for
    /// values that carry none (either because none was ever attached, or
    /// because the type doesn't carry metadata at all, per §3).
    pub fn meta(&self) -> Value {
        match self {
            Value::List(_, m) | Value::Vector(_, m) | Value::HashMap(_, m) | Value::BuiltIn(_, m) => {
                m.clone()
            }
            Value::Lambda(l) => l.meta.clone(),
            _ => Value::Nil,
        }
    }

    /// Returns a value identical in every identity-less respect but with
    /// `meta` as its new metadata. Errors on types that don't carry metadata.
    pub fn with_meta(&self, meta: Value) -> Result<Value, EvalError> {
        match self {
            Value::List(items, _) => Ok(Value::List(items.clone(), meta)),
            Value::Vector(items, _) => Ok(Value::Vector(items.clone(), meta)),
            Value::HashMap(map, _) => Ok(Value::HashMap(map.clone(), meta)),
            Value::BuiltIn(f, _) => Ok(Value::BuiltIn(*f, meta)),
            Value::Lambda(l) => Ok(Value::Lambda(Rc::new(LambdaData {
                fixed_params: l.fixed_params.clone(),
                variadic: l.variadic.clone(),
                body: l.body.clone(),
                env: l.env.clone(),
                is_macro: l.is_macro,
                meta,
            }))),
            other => Err(EvalError::type_error(
                "with-meta",
                "List, Vector, HashMap, or Function",
                other,
                0,
            )),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Str(_) => "String",
            Value::Sym(_) => "Symbol",
            Value::Kw(_) => "Keyword",
            Value::List(..) => "List",
            Value::Vector(..) => "Vector",
            Value::HashMap(..) => "HashMap",
            Value::BuiltIn(..) => "Function",
            Value::Lambda(l) => {
                if l.is_macro {
                    "Macro"
                } else {
                    "Lambda"
                }
            }
            Value::Atom(_) => "Atom",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Nil, Nil) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Sym(a), Sym(b)) => a == b,
            (Kw(a), Kw(b)) => a == b,
            // Metadata is deliberately excluded from equality (§3).
            (HashMap(a, _), HashMap(b, _)) => Rc::ptr_eq(a, b) || **a == **b,
            (BuiltIn(a, _), BuiltIn(b, _)) => std::ptr::eq(*a as *const (), *b as *const ()),
            (Lambda(a), Lambda(b)) => Rc::ptr_eq(a, b),
            (Atom(a), Atom(b)) => Rc::ptr_eq(a, b),
            // List/Vector are cross-equal to each other when elements match
            // pairwise, per the §3 equality rule.
            (a, b) => match (a.as_sequence(), b.as_sequence()) {
                (Some(xs), Some(ys)) => xs == ys,
                _ => false,
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::printer::print(self, true))
    }
}

// --- Interning -------------------------------------------------------------
//
// Symbol and keyword tables are process-global and never shrink (§9). A
// thread-local `RefCell<HashSet<...>>` mirrors the interning idiom the
// teacher already uses for doc-comment buffering in the reader.

thread_local! {
    static SYMBOLS: RefCell<std::collections::HashSet<Rc<str>>> = RefCell::new(std::collections::HashSet::new());
    static KEYWORDS: RefCell<std::collections::HashSet<Rc<str>>> = RefCell::new(std::collections::HashSet::new());
    static GENSYM_COUNTER: std::cell::Cell<u64> = const { std::cell::Cell::new(0) };
}

pub fn intern_symbol(name: &str) -> Rc<str> {
    SYMBOLS.with(|table| {
        let mut table = table.borrow_mut();
        if let Some(existing) = table.get(name) {
            return existing.clone();
        }
        let rc: Rc<str> = Rc::from(name);
        table.insert(rc.clone());
        rc
    })
}

pub fn intern_keyword(name: &str) -> Rc<str> {
    KEYWORDS.with(|table| {
        let mut table = table.borrow_mut();
        if let Some(existing) = table.get(name) {
            return existing.clone();
        }
        let rc: Rc<str> = Rc::from(name);
        table.insert(rc.clone());
        rc
    })
}

/// Produces a symbol guaranteed unique for the lifetime of the process.
pub fn gensym() -> Value {
    let n = GENSYM_COUNTER.with(|c| {
        let n = c.get();
        c.set(n + 1);
        n
    });
    Value::sym(format!("G__{n}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interned_symbols_share_identity() {
        let a = Value::sym("foo");
        let b = Value::sym("foo");
        assert_eq!(a, b);
        if let (Value::Sym(a), Value::Sym(b)) = (a, b) {
            assert!(Rc::ptr_eq(&a, &b));
        } else {
            panic!("expected symbols");
        }
    }

    #[test]
    fn nil_is_not_empty_list() {
        assert_ne!(Value::Nil, empty_list());
    }

    #[test]
    fn empty_list_sentinel_is_structurally_unique() {
        assert_eq!(empty_list(), empty_list());
        assert_eq!(empty_list(), Value::vector(vec![]));
    }

    #[test]
    fn list_and_vector_cross_equal() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
        let vec = Value::vector(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(list, vec);
    }

    #[test]
    fn gensym_values_are_unique() {
        let a = gensym();
        let b = gensym();
        assert_ne!(a, b);
    }

    #[test]
    fn with_meta_does_not_affect_equality() {
        let list = Value::list(vec![Value::Int(1)]);
        let tagged = list.with_meta(Value::kw("tag")).unwrap();
        assert_eq!(list, tagged);
        assert_eq!(tagged.meta(), Value::kw("tag"));
        assert_eq!(list.meta(), Value::Nil);
    }

    #[test]
    fn with_meta_rejects_unsupported_types() {
        assert!(Value::Int(1).with_meta(Value::Nil).is_err());
    }
}
