//! The two-branch container.
use std::{convert::Infallible, fmt, ops::ControlFlow, ops::Shr};

use super::{Applicative, Functor, Maybe, Monad, Sequence};

/// A success (`Right`) or a failure (`Left`).
///
/// The capabilities implemented by `Either` act on the `Right` branch only: a `Left` value goes
/// through `fmap`, `ap` and `bind` untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

use Either::{Left, Right};

impl<L, R> Either<L, R> {
    /// Run a computation, wrapping its result in `Right`, or its error in `Left`.
    ///
    /// Only the failure returned by `f` is captured. Errors raised before or after the call
    /// aren't affected.
    pub fn capture<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<R, L>,
    {
        f().into()
    }

    pub fn is_left(&self) -> bool {
        matches!(self, Left(_))
    }

    pub fn is_right(&self) -> bool {
        matches!(self, Right(_))
    }

    pub fn left(self) -> Maybe<L> {
        match self {
            Left(value) => Maybe::Just(value),
            Right(_) => Maybe::Nothing,
        }
    }

    pub fn right(self) -> Maybe<R> {
        match self {
            Left(_) => Maybe::Nothing,
            Right(value) => Maybe::Just(value),
        }
    }

    pub fn as_ref(&self) -> Either<&L, &R> {
        match self {
            Left(value) => Left(value),
            Right(value) => Right(value),
        }
    }

    /// Collapse both branches into a single value.
    pub fn either<T>(self, on_left: impl FnOnce(L) -> T, on_right: impl FnOnce(R) -> T) -> T {
        match self {
            Left(value) => on_left(value),
            Right(value) => on_right(value),
        }
    }

    pub fn map_left<M>(self, f: impl FnOnce(L) -> M) -> Either<M, R> {
        match self {
            Left(value) => Left(f(value)),
            Right(value) => Right(value),
        }
    }

    pub fn into_result(self) -> Result<R, L> {
        self.either(Err, Ok)
    }
}

impl<T> Either<T, T> {
    /// The value of whichever branch is set.
    pub fn into_inner(self) -> T {
        self.either(|value| value, |value| value)
    }
}

impl<L, R> From<Result<R, L>> for Either<L, R> {
    fn from(result: Result<R, L>) -> Self {
        match result {
            Ok(value) => Right(value),
            Err(err) => Left(err),
        }
    }
}

impl<L, R> From<Either<L, R>> for Result<R, L> {
    fn from(either: Either<L, R>) -> Self {
        either.into_result()
    }
}

impl<L: fmt::Display, R: fmt::Display> fmt::Display for Either<L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Left(value) => write!(f, "Left {value}"),
            Right(value) => write!(f, "Right {value}"),
        }
    }
}

impl<L, R> Functor for Either<L, R> {
    type Inner = R;
    type Wrapped<U> = Either<L, U>;

    fn fmap<U, F>(self, f: F) -> Either<L, U>
    where
        F: FnOnce(R) -> U,
    {
        match self {
            Left(value) => Left(value),
            Right(value) => Right(f(value)),
        }
    }
}

impl<L, R> Applicative for Either<L, R> {
    fn pure(value: R) -> Self {
        Right(value)
    }

    fn ap<A, B>(self, arg: Either<L, A>) -> Either<L, B>
    where
        R: FnOnce(A) -> B,
    {
        match self {
            Left(value) => Left(value),
            Right(f) => arg.fmap(f),
        }
    }
}

impl<L, R> Monad for Either<L, R> {
    fn bind<U, F>(self, f: F) -> Either<L, U>
    where
        F: FnOnce(R) -> Either<L, U>,
    {
        match self {
            Left(value) => Left(value),
            Right(value) => f(value),
        }
    }
}

impl<L, R> Sequence for Either<L, R> {
    type Residual = Either<L, Infallible>;

    fn branch(self) -> ControlFlow<Self::Residual, R> {
        match self {
            Left(value) => ControlFlow::Break(Left(value)),
            Right(value) => ControlFlow::Continue(value),
        }
    }

    fn from_residual(residual: Self::Residual) -> Self {
        match residual {
            Left(value) => Left(value),
            Right(never) => match never {},
        }
    }
}

impl<L, R, U> Shr<Either<L, U>> for Either<L, R> {
    type Output = Either<L, U>;

    fn shr(self, next: Either<L, U>) -> Either<L, U> {
        self.then(next)
    }
}
