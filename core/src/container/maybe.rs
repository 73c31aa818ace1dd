//! The optional-value container.
use std::{convert::Infallible, fmt, ops::ControlFlow, ops::Shr};

use super::{Applicative, Either, Functor, Monad, Sequence};

/// Either a present value (`Just`) or its absence (`Nothing`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Maybe<T> {
    Just(T),
    Nothing,
}

use Maybe::{Just, Nothing};

impl<T> Maybe<T> {
    pub fn is_just(&self) -> bool {
        matches!(self, Just(_))
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Nothing)
    }

    /// The contained values: one for `Just`, none for `Nothing`.
    pub fn deconstruct(&self) -> &[T] {
        match self {
            Just(value) => std::slice::from_ref(value),
            Nothing => &[],
        }
    }

    pub fn as_ref(&self) -> Maybe<&T> {
        match self {
            Just(value) => Just(value),
            Nothing => Nothing,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Just(value) => Some(value),
            Nothing => None,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.unwrap_or_else(|| default)
    }

    pub fn unwrap_or_else(self, default: impl FnOnce() -> T) -> T {
        match self {
            Just(value) => value,
            Nothing => default(),
        }
    }

    /// Convert to an [Either]: `Just x` becomes `Right x` and `Nothing` becomes `Left Nothing`.
    pub fn to_either(self) -> Either<Maybe<T>, T> {
        match self {
            Just(value) => Either::Right(value),
            Nothing => Either::Left(Nothing),
        }
    }
}

impl<T: Clone> Maybe<&T> {
    pub fn cloned(self) -> Maybe<T> {
        self.fmap(T::clone)
    }
}

impl<T, E> Maybe<Result<T, E>> {
    /// Turn a `Maybe` of a `Result` into a `Result` of a `Maybe`, surfacing the error if any.
    pub fn transpose(self) -> Result<Maybe<T>, E> {
        match self {
            Just(Ok(value)) => Ok(Just(value)),
            Just(Err(err)) => Err(err),
            Nothing => Ok(Nothing),
        }
    }
}

impl<T> Default for Maybe<T> {
    fn default() -> Self {
        Nothing
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(option: Option<T>) -> Self {
        match option {
            Some(value) => Just(value),
            None => Nothing,
        }
    }
}

impl<T> From<Maybe<T>> for Option<T> {
    fn from(maybe: Maybe<T>) -> Self {
        maybe.into_option()
    }
}

impl<T: fmt::Display> fmt::Display for Maybe<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Just(value) => write!(f, "Just {value}"),
            Nothing => write!(f, "Nothing"),
        }
    }
}

impl<T> Functor for Maybe<T> {
    type Inner = T;
    type Wrapped<U> = Maybe<U>;

    fn fmap<U, F>(self, f: F) -> Maybe<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Just(value) => Just(f(value)),
            Nothing => Nothing,
        }
    }
}

impl<T> Applicative for Maybe<T> {
    fn pure(value: T) -> Self {
        Just(value)
    }

    fn ap<A, B>(self, arg: Maybe<A>) -> Maybe<B>
    where
        T: FnOnce(A) -> B,
    {
        match self {
            Just(f) => arg.fmap(f),
            Nothing => Nothing,
        }
    }
}

impl<T> Monad for Maybe<T> {
    fn bind<U, F>(self, f: F) -> Maybe<U>
    where
        F: FnOnce(T) -> Maybe<U>,
    {
        match self {
            Just(value) => f(value),
            Nothing => Nothing,
        }
    }
}

impl<T> Sequence for Maybe<T> {
    type Residual = Maybe<Infallible>;

    fn branch(self) -> ControlFlow<Self::Residual, T> {
        match self {
            Just(value) => ControlFlow::Continue(value),
            Nothing => ControlFlow::Break(Nothing),
        }
    }

    fn from_residual(_: Self::Residual) -> Self {
        Nothing
    }
}

/// `x >> y` sequences `y` after `x`, see [Monad::then].
impl<T, U> Shr<Maybe<U>> for Maybe<T> {
    type Output = Maybe<U>;

    fn shr(self, next: Maybe<U>) -> Maybe<U> {
        self.then(next)
    }
}
