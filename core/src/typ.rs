//! Runtime types.
//!
//! Every [`Value`](crate::value::Value) carries a runtime type, and types are arranged in a fixed
//! hierarchy rooted at [`Type::Dyn`]:
//!
//! ```text
//! Dyn
//! ├── Null, Bool, String, Path, Array, Record, Function, Error
//! ├── Number ── Integer, Rational
//! ├── Maybe ─── Just, Nothing
//! └── Either ── Left, Right
//! ```
//!
//! The hierarchy serves two purposes. A value is an instance of a type if its own type is that
//! type or one of its descendants, which is how signature slots such as `Maybe` accept both
//! `Just 1` and `Nothing`. And capabilities registered on a type are inherited by its
//! descendants, so that registering `Functor` on `Maybe` makes it available on `Just` values.
use std::{fmt, str::FromStr};

use crate::error::suggest;

/// The runtime type of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Type {
    /// The root of the hierarchy. Every value is an instance of `Dyn`.
    Dyn,
    Null,
    Bool,
    Number,
    /// A number with no fractional part.
    Integer,
    /// A number with a non-zero fractional part.
    Rational,
    String,
    Path,
    Array,
    Record,
    Function,
    /// A failure captured as a value.
    Error,
    Maybe,
    Just,
    Nothing,
    Either,
    Left,
    Right,
}

impl Type {
    /// All the runtime types, parents listed before their children.
    pub const ALL: [Type; 18] = [
        Type::Dyn,
        Type::Null,
        Type::Bool,
        Type::Number,
        Type::Integer,
        Type::Rational,
        Type::String,
        Type::Path,
        Type::Array,
        Type::Record,
        Type::Function,
        Type::Error,
        Type::Maybe,
        Type::Just,
        Type::Nothing,
        Type::Either,
        Type::Left,
        Type::Right,
    ];

    /// The direct parent of this type, or `None` for [`Type::Dyn`].
    pub fn parent(self) -> Option<Type> {
        match self {
            Type::Dyn => None,
            Type::Integer | Type::Rational => Some(Type::Number),
            Type::Just | Type::Nothing => Some(Type::Maybe),
            Type::Left | Type::Right => Some(Type::Either),
            _ => Some(Type::Dyn),
        }
    }

    /// Iterate over this type and all its ancestors, from the most specific to [`Type::Dyn`].
    pub fn ancestors(self) -> impl Iterator<Item = Type> {
        std::iter::successors(Some(self), |ty| ty.parent())
    }

    pub fn is_subtype_of(self, other: Type) -> bool {
        self.ancestors().any(|ty| ty == other)
    }

    /// The outermost type below [`Type::Dyn`] this type belongs to. For example the family of
    /// `Just` is `Maybe`.
    pub fn family(self) -> Type {
        self.ancestors()
            .take_while(|ty| *ty != Type::Dyn)
            .last()
            .unwrap_or(Type::Dyn)
    }

    pub fn name(self) -> &'static str {
        match self {
            Type::Dyn => "Dyn",
            Type::Null => "Null",
            Type::Bool => "Bool",
            Type::Number => "Number",
            Type::Integer => "Integer",
            Type::Rational => "Rational",
            Type::String => "String",
            Type::Path => "Path",
            Type::Array => "Array",
            Type::Record => "Record",
            Type::Function => "Function",
            Type::Error => "Error",
            Type::Maybe => "Maybe",
            Type::Just => "Just",
            Type::Nothing => "Nothing",
            Type::Either => "Either",
            Type::Left => "Left",
            Type::Right => "Right",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing the name of a type that doesn't exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownTypeError {
    pub name: String,
    pub suggestion: Option<String>,
}

impl fmt::Display for UnknownTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown type `{}`", self.name)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean `{suggestion}`?)")?;
        }
        Ok(())
    }
}

impl std::error::Error for UnknownTypeError {}

impl FromStr for Type {
    type Err = UnknownTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Type::ALL
            .into_iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Type::ALL.iter().map(|ty| ty.name()).collect();
                UnknownTypeError {
                    name: s.to_owned(),
                    suggestion: suggest::find_best_match(&names, &s).map(String::from),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_are_subtypes_of_their_family() {
        assert!(Type::Just.is_subtype_of(Type::Maybe));
        assert!(Type::Nothing.is_subtype_of(Type::Maybe));
        assert!(Type::Left.is_subtype_of(Type::Either));
        assert!(Type::Integer.is_subtype_of(Type::Number));
        assert!(!Type::Maybe.is_subtype_of(Type::Just));
        assert!(!Type::Right.is_subtype_of(Type::Maybe));
    }

    #[test]
    fn everything_is_dyn() {
        for ty in Type::ALL {
            assert!(ty.is_subtype_of(Type::Dyn), "{ty} should be a subtype of Dyn");
        }
    }

    #[test]
    fn ancestors_walk_up_to_dyn() {
        let chain: Vec<Type> = Type::Rational.ancestors().collect();
        assert_eq!(chain, vec![Type::Rational, Type::Number, Type::Dyn]);
    }

    #[test]
    fn family() {
        assert_eq!(Type::Right.family(), Type::Either);
        assert_eq!(Type::Maybe.family(), Type::Maybe);
        assert_eq!(Type::String.family(), Type::String);
        assert_eq!(Type::Dyn.family(), Type::Dyn);
    }

    #[test]
    fn parse_type_names() {
        assert_eq!("maybe".parse::<Type>(), Ok(Type::Maybe));
        assert_eq!("Integer".parse::<Type>(), Ok(Type::Integer));

        let err = "Eihter".parse::<Type>().unwrap_err();
        assert_eq!(err.suggestion.as_deref(), Some("Either"));
    }
}
