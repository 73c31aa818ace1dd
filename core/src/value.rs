//! Dynamically typed values.
//!
//! The capability registry and the checked-function layer work on [Value], the same way an
//! interpreter works on its runtime terms. Each value has a most specific runtime [Type],
//! returned by [Value::type_of].
use std::{fmt, path::PathBuf};

pub use indexmap::IndexMap;
pub use malachite::{
    base::num::conversion::traits::{IsInteger, ToSci},
    rational::Rational,
};

use crate::{
    container::{Either, Maybe},
    error::Error,
    function::Function,
    identifier::Ident,
    typ::Type,
};

/// Numbers are exact rationals.
pub type Number = Rational;

/// A dynamically typed value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Num(Number),
    Str(String),
    Path(PathBuf),
    Array(Vec<Value>),
    /// Fields keep their insertion order.
    Record(IndexMap<Ident, Value>),
    Func(Function),
    Maybe(Box<Maybe<Value>>),
    Either(Box<Either<Value, Value>>),
    /// A failure captured as a value.
    Error(Box<Error>),
}

impl Value {
    pub fn just(value: impl Into<Value>) -> Self {
        Value::Maybe(Box::new(Maybe::Just(value.into())))
    }

    pub fn nothing() -> Self {
        Value::Maybe(Box::new(Maybe::Nothing))
    }

    pub fn left(value: impl Into<Value>) -> Self {
        Value::Either(Box::new(Either::Left(value.into())))
    }

    pub fn right(value: impl Into<Value>) -> Self {
        Value::Either(Box::new(Either::Right(value.into())))
    }

    pub fn record<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Ident>,
        V: Into<Value>,
    {
        Value::Record(
            fields
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Run a computation, wrapping its result in `Right`, or the error it fails with in `Left`
    /// as a [Value::Error].
    pub fn capture(f: impl FnOnce() -> Result<Value, Error>) -> Self {
        Either::capture(f).map_left(Value::from).into()
    }

    /// The most specific runtime type of this value.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Null => Type::Null,
            Value::Bool(_) => Type::Bool,
            Value::Num(n) if n.is_integer() => Type::Integer,
            Value::Num(_) => Type::Rational,
            Value::Str(_) => Type::String,
            Value::Path(_) => Type::Path,
            Value::Array(_) => Type::Array,
            Value::Record(_) => Type::Record,
            Value::Func(_) => Type::Function,
            Value::Maybe(m) => match **m {
                Maybe::Just(_) => Type::Just,
                Maybe::Nothing => Type::Nothing,
            },
            Value::Either(e) => match **e {
                Either::Left(_) => Type::Left,
                Either::Right(_) => Type::Right,
            },
            Value::Error(_) => Type::Error,
        }
    }

    /// Whether the type of this value is `typ` or one of its descendants.
    pub fn is_instance_of(&self, typ: Type) -> bool {
        self.type_of().is_subtype_of(typ)
    }

    pub fn as_maybe(&self) -> Option<&Maybe<Value>> {
        match self {
            Value::Maybe(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_either(&self) -> Option<&Either<Value, Value>> {
        match self {
            Value::Either(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Func(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&Error> {
        match self {
            Value::Error(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Num(n) => i64::try_from(n).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Num(n) => write!(f, "{}", n.to_sci()),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::Array(elts) => {
                write!(f, "[")?;
                for (i, elt) in elts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elt}")?;
                }
                write!(f, "]")
            }
            Value::Record(fields) if fields.is_empty() => write!(f, "{{}}"),
            Value::Record(fields) => {
                write!(f, "{{ ")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key} = {value}")?;
                }
                write!(f, " }}")
            }
            Value::Func(func) => write!(f, "{func}"),
            Value::Maybe(m) => write!(f, "{m}"),
            Value::Either(e) => write!(f, "{e}"),
            Value::Error(err) => write!(f, "<error: {err}>"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Num(Number::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Num(Number::from(n))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Num(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<PathBuf> for Value {
    fn from(p: PathBuf) -> Self {
        Value::Path(p)
    }
}

impl From<Vec<Value>> for Value {
    fn from(elts: Vec<Value>) -> Self {
        Value::Array(elts)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Func(f)
    }
}

impl From<Maybe<Value>> for Value {
    fn from(m: Maybe<Value>) -> Self {
        Value::Maybe(Box::new(m))
    }
}

impl From<Either<Value, Value>> for Value {
    fn from(e: Either<Value, Value>) -> Self {
        Value::Either(Box::new(e))
    }
}

impl From<Error> for Value {
    fn from(err: Error) -> Self {
        Value::Error(Box::new(err))
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}
