//! Sum-type containers and the capabilities they implement statically.
//!
//! [`Maybe`] and [`Either`] are the two container families. Both implement [Functor],
//! [Applicative] and [Monad] as ordinary traits, resolved at compile time. The same behaviour is
//! also registered in the runtime [registry](crate::typeclass::Registry) for dynamically typed
//! [values](crate::value::Value), see [`crate::typeclass::builtins`].
//!
//! # Laws
//!
//! Implementations are expected to satisfy, for all `a`, `m`, `g` and `h`:
//!
//! ```text
//! pure(a).bind(h)        == h(a)
//! m.bind(pure)           == m
//! m.bind(g).bind(h)      == m.bind(|x| g(x).bind(h))
//! pure(f).ap(pure(x))    == pure(f(x))
//! ```
pub mod either;
pub mod maybe;
pub mod sequence;

pub use either::Either::{self, Left, Right};
pub use maybe::Maybe::{self, Just, Nothing};
pub use sequence::{sequence, Bind, Sequence, ShortCircuit};

/// Structure-preserving map over the success value of a container.
///
/// On a failure variant (`Nothing`, `Left`) the transform is never invoked and the container is
/// returned as is.
pub trait Functor {
    /// The type of the success value.
    type Inner;
    /// The same container family with a different success type.
    type Wrapped<U>;

    fn fmap<U, F>(self, f: F) -> Self::Wrapped<U>
    where
        F: FnOnce(Self::Inner) -> U;
}

/// Function application inside a container.
pub trait Applicative: Functor + Sized {
    /// Wrap a bare value in the success variant.
    fn pure(value: Self::Inner) -> Self;

    /// Apply the function held by `self` to the value held by `arg`. If either is a failure
    /// variant, the result is a failure variant and the function isn't called.
    fn ap<A, B>(self, arg: Self::Wrapped<A>) -> Self::Wrapped<B>
    where
        Self::Inner: FnOnce(A) -> B;

    /// Alias of [Applicative::pure].
    fn lift(value: Self::Inner) -> Self {
        Self::pure(value)
    }
}

/// Sequencing of computations that may fail.
pub trait Monad: Applicative {
    /// Feed the success value to `f` and return its result unchanged. On a failure variant, `f`
    /// isn't called and the failure is propagated.
    fn bind<U, F>(self, f: F) -> Self::Wrapped<U>
    where
        F: FnOnce(Self::Inner) -> Self::Wrapped<U>;

    /// The monadic `return`, identical to [Applicative::pure].
    fn unit(value: Self::Inner) -> Self {
        Self::pure(value)
    }

    /// Sequence `next` after `self`, discarding the success value of `self`. This is what `>>`
    /// stands for on containers.
    fn then<U>(self, next: Self::Wrapped<U>) -> Self::Wrapped<U> {
        self.bind(|_| next)
    }
}
