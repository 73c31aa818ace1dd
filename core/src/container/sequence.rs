//! Sequencing blocks: chains of binds that stop at the first failure.
//!
//! A block receives a bind operator. Binding a success value gives back the unwrapped value,
//! while binding a failure value ends the whole block with that failure, through `?`:
//!
//! ```
//! use funcstuff_core::container::{sequence, Either, Left, Right};
//!
//! let result: Either<i32, i32> = sequence(|m| {
//!     let a = m.bind(Right(1))?;
//!     let b = m.bind(Left::<_, i32>(2))?;
//!     Ok(Right(a + b))
//! });
//! assert_eq!(result, Left(2));
//! ```
//!
//! [sequence_values] is the dynamic counterpart over [Value]s, dispatching `bind` through a
//! [Registry].
use std::{marker::PhantomData, ops::ControlFlow, sync::Arc};

use once_cell::sync::OnceCell;

use super::Monad;
use crate::{
    error::{Error, EvalError, SequenceStep},
    function::Function,
    typeclass::{builtins, Registry},
    value::Value,
};

/// A monad whose failure variant can end a sequencing block early.
pub trait Sequence: Monad {
    /// The failure variant, stripped from any success type.
    type Residual;

    /// Split the container into the value to continue with, or the failure to stop with.
    fn branch(self) -> ControlFlow<Self::Residual, Self::Inner>;

    /// Rebuild a container from a failure.
    fn from_residual(residual: Self::Residual) -> Self;
}

/// The failure that ended a sequencing block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortCircuit<R>(pub R);

/// The bind operator handed to a sequencing block.
pub struct Bind<R> {
    _residual: PhantomData<fn(R)>,
}

impl<R> Bind<R> {
    /// Unwrap a success value, or stop the block with the failure of `m`.
    pub fn bind<M>(&self, m: M) -> Result<M::Inner, ShortCircuit<R>>
    where
        M: Sequence<Residual = R>,
    {
        match m.branch() {
            ControlFlow::Continue(value) => Ok(value),
            ControlFlow::Break(residual) => Err(ShortCircuit(residual)),
        }
    }
}

/// Run a sequencing block.
///
/// All the containers bound inside a block must belong to the same family as the result,
/// which is enforced by the shared residual type.
pub fn sequence<M, F>(block: F) -> M
where
    M: Sequence,
    F: FnOnce(&Bind<M::Residual>) -> Result<M, ShortCircuit<M::Residual>>,
{
    let bind = Bind {
        _residual: PhantomData,
    };

    match block(&bind) {
        Ok(result) => result,
        Err(ShortCircuit(residual)) => M::from_residual(residual),
    }
}

/// How a dynamic sequencing block ended early.
#[derive(Debug, Clone, PartialEq)]
pub enum Exit {
    /// A failure value was bound. The block evaluates to it.
    Short(Value),
    /// A genuine error, propagated to the caller of the block.
    Error(Error),
}

impl From<Error> for Exit {
    fn from(err: Error) -> Self {
        Exit::Error(err)
    }
}

impl From<EvalError> for Exit {
    fn from(err: EvalError) -> Self {
        Exit::Error(err.into())
    }
}

/// The bind operator of a dynamic sequencing block.
pub struct DynBind<'a> {
    registry: &'a Registry,
}

impl DynBind<'_> {
    /// Bind a value: give back its content if it's a success, or stop the block with it
    /// otherwise.
    ///
    /// The value must have the `Monad` capability. Its `bind` operation is called with a
    /// continuation recording the content it receives and returning the value unchanged, so
    /// that whatever `bind` returns belongs to the right family.
    pub fn bind(&self, value: Value) -> Result<Value, Exit> {
        let typ = value.type_of();

        if !self.registry.satisfies(typ, [&*builtins::MONAD]) {
            return Err(EvalError::NotAMonad {
                step: SequenceStep::Bound,
                got: typ,
            }
            .into());
        }

        let content: Arc<OnceCell<Value>> = Arc::new(OnceCell::new());
        let continuation = {
            let content = Arc::clone(&content);
            let value = value.clone();

            Function::new("sequence", 1, move |args| {
                // A continuation only runs once per bind.
                let _ = content.set(args[0].clone());
                Ok(value.clone())
            })
        };

        let result = self
            .registry
            .invoke(&value, "bind", &[Value::Func(continuation)])?;

        match content.get() {
            Some(inner) => Ok(inner.clone()),
            None => Err(Exit::Short(result)),
        }
    }
}

/// Run a dynamic sequencing block. The value returned by the block must have the `Monad`
/// capability.
pub fn sequence_values<F>(registry: &Registry, block: F) -> Result<Value, Error>
where
    F: FnOnce(&DynBind<'_>) -> Result<Value, Exit>,
{
    match block(&DynBind { registry }) {
        Ok(result) => {
            let typ = result.type_of();
            if registry.satisfies(typ, [&*builtins::MONAD]) {
                Ok(result)
            } else {
                Err(EvalError::NotAMonad {
                    step: SequenceStep::Returned,
                    got: typ,
                }
                .into())
            }
        }
        Err(Exit::Short(failure)) => Ok(failure),
        Err(Exit::Error(err)) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use assert_matches::assert_matches;

    use super::*;
    use crate::container::{Either, Just, Left, Maybe, Nothing, Right};

    #[test]
    fn either_block_stops_at_first_left() {
        let reached = Cell::new(false);

        let result: Either<i32, i32> = sequence(|m| {
            m.bind(Right(1))?;
            m.bind(Left::<_, i32>(2))?;
            reached.set(true);
            m.bind(Right(3))?;
            Ok(Right(4))
        });

        assert_eq!(result, Left(2));
        assert!(!reached.get());
    }

    #[test]
    fn either_block_success() {
        let result: Either<(), i32> = sequence(|m| {
            let a = m.bind(Right(1))?;
            let b = m.bind(Right(2))?;
            Ok(Right(a + b))
        });

        assert_eq!(result, Right(3));
    }

    #[test]
    fn maybe_block() {
        let found: Maybe<i32> = sequence(|m| {
            let a = m.bind(Just(20))?;
            let b = m.bind(Just(22))?;
            Ok(Just(a + b))
        });
        assert_eq!(found, Just(42));

        let missing: Maybe<i32> = sequence(|m| {
            let a = m.bind(Just(20))?;
            let b: i32 = m.bind(Nothing)?;
            Ok(Just(a + b))
        });
        assert_eq!(missing, Nothing);
    }

    #[test]
    fn dynamic_block_stops_at_first_failure() {
        let registry = Registry::global();
        let reached = Cell::new(false);

        let result = sequence_values(registry, |m| {
            m.bind(Value::right(1))?;
            m.bind(Value::left(2))?;
            reached.set(true);
            m.bind(Value::right(3))?;
            Ok(Value::right(4))
        });

        assert_eq!(result, Ok(Value::left(2)));
        assert!(!reached.get());
    }

    #[test]
    fn dynamic_block_success() {
        let result = sequence_values(Registry::global(), |m| {
            let a = m.bind(Value::right(1))?;
            let b = m.bind(Value::right(2))?;
            assert_eq!((a, b), (Value::from(1), Value::from(2)));
            Ok(Value::right(3))
        });

        assert_eq!(result, Ok(Value::right(3)));
    }

    #[test]
    fn dynamic_block_must_return_a_monad() {
        let result = sequence_values(Registry::global(), |m| m.bind(Value::just(1)));

        assert_matches!(
            result,
            Err(Error::EvalError(EvalError::NotAMonad {
                step: SequenceStep::Returned,
                ..
            }))
        );
    }

    #[test]
    fn dynamic_block_rejects_non_monads() {
        let result = sequence_values(Registry::global(), |m| {
            m.bind(Value::from("plain"))?;
            Ok(Value::nothing())
        });

        assert_matches!(
            result,
            Err(Error::EvalError(EvalError::NotAMonad {
                step: SequenceStep::Bound,
                ..
            }))
        );
    }
}
