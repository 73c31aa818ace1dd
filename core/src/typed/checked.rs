//! Functions whose calls are checked against a [Signature].
//!
//! [def_typed] defines a function that must be called with all its arguments at once.
//! [def_typed_curried] defines a function that accepts a prefix of its arguments and returns a
//! [Partial] application, which is itself checked when called.
//!
//! Checks happen in order: argument count, then each argument against its slot, then, once the
//! body has run, the result against the return slot.
use std::sync::Arc;

use super::{Signature, Slot};
use crate::{
    error::{CallError, Error, ExpectedArity},
    function::Function,
    identifier::Ident,
    typeclass::Registry,
    value::Value,
};

type Body = Arc<dyn Fn(&[Value]) -> Result<Value, Error> + Send + Sync>;

/// What checked functions have in common.
#[derive(Clone)]
struct Checked {
    name: Ident,
    signature: Signature,
    body: Body,
    registry: Registry,
}

impl Checked {
    fn new<F>(name: impl Into<Ident>, signature: Signature, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Checked {
            name: name.into(),
            signature,
            body: Arc::new(body),
            registry: Registry::global().clone(),
        }
    }

    fn arity_error(&self, expected: ExpectedArity, got: usize) -> Error {
        CallError::Arity {
            function: self.name,
            signature: self.signature.clone(),
            expected,
            got,
        }
        .into()
    }

    /// Check `args` against the argument slots starting at `offset`.
    fn check_arguments(&self, offset: usize, args: &[Value]) -> Result<(), Error> {
        let slots = &self.signature.argument_types()[offset..];

        for (i, (slot, arg)) in slots.iter().zip(args).enumerate() {
            if !slot.accepts(&self.registry, arg) {
                return Err(CallError::ArgumentType {
                    function: self.name,
                    signature: self.signature.clone(),
                    position: offset + i,
                    expected: slot.clone(),
                    got: arg.type_of(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Run the body on a full list of arguments and check its result.
    fn run(&self, args: &[Value]) -> Result<Value, Error> {
        log::trace!("calling checked function `{}`", self.name);

        let result = (self.body)(args)?;
        let expected: &Slot = self.signature.return_type();

        if expected.accepts(&self.registry, &result) {
            Ok(result)
        } else {
            Err(CallError::ReturnType {
                function: self.name,
                signature: self.signature.clone(),
                expected: expected.clone(),
                got: result.type_of(),
            }
            .into())
        }
    }
}

/// A function checked against its signature on every call. See [def_typed].
#[derive(Clone)]
pub struct TypedFn(Checked);

/// Define a checked function. It must be called with exactly as many arguments as its
/// signature has argument slots.
///
/// Constraints are checked against the global registry, see [TypedFn::with_registry].
pub fn def_typed<F>(name: impl Into<Ident>, signature: Signature, body: F) -> TypedFn
where
    F: Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
{
    TypedFn(Checked::new(name, signature, body))
}

impl TypedFn {
    /// Check constraints against `registry` instead of the global one.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.0.registry = registry;
        self
    }

    pub fn name(&self) -> Ident {
        self.0.name
    }

    pub fn signature(&self) -> &Signature {
        &self.0.signature
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, Error> {
        let arity = self.0.signature.arity();

        if args.len() != arity {
            return Err(self.0.arity_error(ExpectedArity::Exactly(arity), args.len()));
        }

        self.0.check_arguments(0, args)?;
        self.0.run(args)
    }

    /// Turn this function into a first-class function value. Calls to the value are checked
    /// exactly like calls to this function: it isn't curried.
    pub fn into_function(self) -> Function {
        let arity = self.0.signature.arity();
        Function::forwarding(self.0.name, arity, move |args| self.call(args))
    }
}

/// The result of calling a curried checked function.
#[derive(Clone, Debug, PartialEq)]
pub enum Applied {
    /// Some arguments are still missing. The body hasn't run.
    Partial(Partial),
    /// All the arguments were supplied, the body ran and its result was checked.
    Saturated(Value),
}

impl Applied {
    /// The result as a value. A partial application becomes a function value.
    pub fn into_value(self) -> Value {
        match self {
            Applied::Partial(partial) => Value::Func(partial.into_function()),
            Applied::Saturated(value) => value,
        }
    }

    pub fn is_saturated(&self) -> bool {
        matches!(self, Applied::Saturated(_))
    }
}

/// A checked function accepting its arguments in several calls. See [def_typed_curried].
#[derive(Clone)]
pub struct CurriedFn(Checked);

/// Define a curried checked function.
///
/// Calling it with fewer arguments than its arity checks only the supplied arguments and
/// returns a [Partial] application, which isn't checked against the return slot. Once all
/// the arguments are supplied, the body runs and its result is checked as for [def_typed].
pub fn def_typed_curried<F>(name: impl Into<Ident>, signature: Signature, body: F) -> CurriedFn
where
    F: Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
{
    CurriedFn(Checked::new(name, signature, body))
}

impl CurriedFn {
    /// Check constraints against `registry` instead of the global one.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.0.registry = registry;
        self
    }

    pub fn name(&self) -> Ident {
        self.0.name
    }

    pub fn signature(&self) -> &Signature {
        &self.0.signature
    }

    pub fn call(&self, args: &[Value]) -> Result<Applied, Error> {
        self.apply(Vec::new(), args)
    }

    /// Apply `args` after the already `applied` ones.
    fn apply(&self, applied: Vec<Value>, args: &[Value]) -> Result<Applied, Error> {
        let remaining = self.0.signature.arity() - applied.len();

        if args.len() > remaining {
            return Err(self.0.arity_error(ExpectedArity::AtMost(remaining), args.len()));
        }

        self.0.check_arguments(applied.len(), args)?;

        let mut all = applied;
        all.extend_from_slice(args);

        if args.len() == remaining {
            self.0.run(&all).map(Applied::Saturated)
        } else {
            Ok(Applied::Partial(Partial {
                function: self.clone(),
                applied: all,
            }))
        }
    }

    /// Turn this function into a first-class function value.
    pub fn into_function(self) -> Function {
        Partial {
            function: self,
            applied: Vec::new(),
        }
        .into_function()
    }
}

/// A curried checked function applied to some of its arguments.
#[derive(Clone)]
pub struct Partial {
    function: CurriedFn,
    applied: Vec<Value>,
}

impl Partial {
    pub fn name(&self) -> Ident {
        self.function.name()
    }

    pub fn applied(&self) -> &[Value] {
        &self.applied
    }

    /// The number of arguments still expected.
    pub fn remaining(&self) -> usize {
        self.function.0.signature.arity() - self.applied.len()
    }

    /// Supply more arguments. They're checked against the slots following the ones already
    /// applied.
    pub fn call(&self, args: &[Value]) -> Result<Applied, Error> {
        self.function.apply(self.applied.clone(), args)
    }

    /// Turn this application into a function value. Every call is checked right away, and a
    /// call that doesn't saturate it returns another checked function value.
    pub fn into_function(self) -> Function {
        let arity = self.remaining();
        let name = self.name();
        Function::forwarding(name, arity, move |args| {
            self.call(args).map(Applied::into_value)
        })
    }
}

impl PartialEq for Partial {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.function.0.body, &other.function.0.body) && self.applied == other.applied
    }
}

impl std::fmt::Debug for Partial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partial")
            .field("name", &self.name())
            .field("signature", &self.function.0.signature.to_string())
            .field("applied", &self.applied)
            .finish()
    }
}
