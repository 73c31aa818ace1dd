//! First-class functions over values.
//!
//! A [Function] has a fixed arity and is curried: calling it with fewer arguments than it
//! expects returns a new function remembering the arguments consumed so far. No type checking is
//! done here, see [crate::typed] for signature-checked functions. Those become values through
//! [Function::forwarding], which leaves arity handling to the wrapped function.
use std::{fmt, ops::Shr, sync::Arc};

use crate::{
    error::{Error, EvalError},
    identifier::Ident,
    value::Value,
};

/// The code of a function. It receives all the arguments at once, previously applied ones
/// first.
pub type Body = Arc<dyn Fn(&[Value]) -> Result<Value, Error> + Send + Sync>;

#[derive(Clone)]
pub struct Function {
    name: Ident,
    arity: usize,
    body: Body,
    applied: Vec<Value>,
    forward: bool,
}

impl Function {
    pub fn new<F>(name: impl Into<Ident>, arity: usize, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Function {
            name: name.into(),
            arity,
            body: Arc::new(body),
            applied: Vec::new(),
            forward: false,
        }
    }

    /// A function passing every call to `body` as is, whatever the number of arguments.
    /// `arity` is only reported. The body is responsible for rejecting or currying calls with
    /// the wrong number of arguments.
    pub fn forwarding<F>(name: impl Into<Ident>, arity: usize, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Function {
            forward: true,
            ..Function::new(name, arity, body)
        }
    }

    /// A unary function ignoring its argument and returning `value`.
    pub fn constant(value: Value) -> Self {
        Function::new("const", 1, move |_| Ok(value.clone()))
    }

    pub fn identity() -> Self {
        Function::new("id", 1, |args| Ok(args[0].clone()))
    }

    pub fn name(&self) -> Ident {
        self.name
    }

    /// The number of arguments still expected before the body runs.
    pub fn arity(&self) -> usize {
        self.arity - self.applied.len()
    }

    /// The arguments applied so far.
    pub fn applied(&self) -> &[Value] {
        &self.applied
    }

    /// Call the function. With fewer arguments than [Self::arity], return the partially
    /// applied function as a value.
    pub fn call(&self, args: &[Value]) -> Result<Value, Error> {
        if self.forward {
            log::trace!("forwarding {} argument(s) to `{}`", args.len(), self.name);
            return (self.body)(args);
        }

        let expected = self.arity();

        if args.len() > expected {
            return Err(EvalError::Arity {
                function: self.name,
                expected,
                got: args.len(),
            }
            .into());
        }

        if args.len() < expected {
            let mut partial = self.clone();
            partial.applied.extend_from_slice(args);
            return Ok(Value::Func(partial));
        }

        log::trace!("calling `{}` with {} argument(s)", self.name, args.len());

        if self.applied.is_empty() {
            (self.body)(args)
        } else {
            let all: Vec<Value> = self.applied.iter().chain(args).cloned().collect();
            (self.body)(&all)
        }
    }

    /// Compose unary functions left to right: the result of each one is passed to the next.
    /// The empty composition is the identity.
    pub fn compose(functions: impl IntoIterator<Item = Function>) -> Result<Function, Error> {
        let functions: Vec<Function> = functions.into_iter().collect();

        if let Some(bad) = functions.iter().find(|f| f.arity() != 1) {
            return Err(EvalError::NotComposable {
                function: bad.name,
                arity: bad.arity(),
            }
            .into());
        }

        match functions.len() {
            0 => Ok(Function::identity()),
            1 => Ok(functions.into_iter().next().unwrap_or_else(Function::identity)),
            _ => {
                let name = functions
                    .iter()
                    .map(|f| f.name.label())
                    .collect::<Vec<_>>()
                    .join(" >> ");

                Ok(Function::new(name, 1, move |args| {
                    functions
                        .iter()
                        .try_fold(args[0].clone(), |acc, f| f.call(&[acc]))
                }))
            }
        }
    }
}

/// `f >> g` is the function applying `f`, then `g`. Both must be unary.
impl Shr for Function {
    type Output = Result<Function, Error>;

    fn shr(self, next: Function) -> Self::Output {
        Function::compose([self, next])
    }
}

// Functions compare by identity: two functions are equal if they share the same body and the
// same applied arguments.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body) && self.applied == other.applied
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("applied", &self.applied)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}/{}>", self.name, self.arity())
    }
}
