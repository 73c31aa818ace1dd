//! Signatures for runtime-checked functions.
//!
//! A [Signature] is a non-empty sequence of [Slot]s, built by chaining slots with `>>`. The
//! last slot is the return slot, the others are the argument slots. A slot is either a
//! concrete [Type], accepting values of that type or of one of its subtypes, or a
//! [Constraint], accepting values whose type has a set of capabilities:
//!
//! ```
//! use funcstuff_core::{typ::Type, typeclass::builtins::FUNCTOR, typed::Constraint};
//!
//! let functor = Constraint::from(FUNCTOR.clone());
//! let signature = functor.clone() >> Type::Integer >> functor;
//! assert_eq!(signature.to_string(), "(Functor a) => a -> Integer -> a");
//! ```
//!
//! Checked functions themselves are defined in [checked].
use std::{collections::BTreeSet, fmt, ops::Range, ops::Shr};

use smallvec::SmallVec;

use crate::{
    error::{RegistrationError, suggest},
    identifier::Ident,
    typ::Type,
    typeclass::{Capability, Registry},
    value::Value,
};

pub mod checked;

pub use checked::{def_typed, def_typed_curried, Applied, CurriedFn, Partial, TypedFn};

/// A set of capabilities a type must have.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Constraint(BTreeSet<Capability>);

impl Constraint {
    /// Build a constraint from one or more capabilities.
    pub fn new(capabilities: impl IntoIterator<Item = Capability>) -> Result<Self, RegistrationError> {
        let capabilities: BTreeSet<Capability> = capabilities.into_iter().collect();

        if capabilities.is_empty() {
            Err(RegistrationError::EmptyConstraint)
        } else {
            Ok(Constraint(capabilities))
        }
    }

    /// Build a constraint from capability names, looked up in `registry`.
    pub fn resolve<S: AsRef<str>>(
        registry: &Registry,
        names: impl IntoIterator<Item = S>,
    ) -> Result<Self, RegistrationError> {
        let capabilities = names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                registry
                    .capability(name)
                    .ok_or_else(|| RegistrationError::UnknownCapability {
                        name: name.to_owned(),
                        known: registry.capabilities().iter().map(Capability::name).collect(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Constraint::new(capabilities)
    }

    pub fn capabilities(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }

    /// Whether `typ` has all the capabilities of this constraint in `registry`.
    pub fn satisfied_by(&self, registry: &Registry, typ: Type) -> bool {
        registry.satisfies(typ, &self.0)
    }
}

impl From<Capability> for Constraint {
    fn from(capability: Capability) -> Self {
        Constraint(BTreeSet::from([capability]))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(|cap| cap.name().into_label()).collect();
        write!(f, "{}", names.join(" + "))
    }
}

/// An argument or return slot of a signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    Type(Type),
    Constraint(Constraint),
}

impl Slot {
    /// Whether `value` fits in this slot.
    pub fn accepts(&self, registry: &Registry, value: &Value) -> bool {
        match self {
            Slot::Type(typ) => value.is_instance_of(*typ),
            Slot::Constraint(constraint) => constraint.satisfied_by(registry, value.type_of()),
        }
    }
}

impl From<Type> for Slot {
    fn from(typ: Type) -> Self {
        Slot::Type(typ)
    }
}

impl From<Constraint> for Slot {
    fn from(constraint: Constraint) -> Self {
        Slot::Constraint(constraint)
    }
}

impl From<Capability> for Slot {
    fn from(capability: Capability) -> Self {
        Slot::Constraint(capability.into())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Type(typ) => write!(f, "`{typ}`"),
            Slot::Constraint(constraint) => write!(f, "a type with `{constraint}`"),
        }
    }
}

/// The signature of a checked function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    slots: SmallVec<[Slot; 4]>,
}

impl Signature {
    /// The signature of a function without arguments.
    pub fn returning(slot: impl Into<Slot>) -> Self {
        Signature {
            slots: SmallVec::from_iter([slot.into()]),
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn argument_types(&self) -> &[Slot] {
        &self.slots[..self.slots.len() - 1]
    }

    pub fn return_type(&self) -> &Slot {
        // A signature always has at least its return slot.
        &self.slots[self.slots.len() - 1]
    }

    pub fn arity(&self) -> usize {
        self.slots.len() - 1
    }

    fn push(mut self, slot: Slot) -> Self {
        self.slots.push(slot);
        self
    }

    /// Render the signature, along with the byte range of each slot in the rendering.
    ///
    /// Each distinct constraint gets a display variable, in order of first appearance. The
    /// variables are only cosmetic: nothing requires two slots with the same constraint to
    /// hold values of the same type.
    pub fn render_with_spans(&self) -> (String, Vec<Range<usize>>) {
        let mut variables: Vec<(&Constraint, String)> = Vec::new();

        for slot in &self.slots {
            if let Slot::Constraint(c) = slot {
                if !variables.iter().any(|(known, _)| *known == c) {
                    let var = display_variable(variables.len());
                    variables.push((c, var));
                }
            }
        }

        let mut out = String::new();

        if !variables.is_empty() {
            let context: Vec<String> = variables
                .iter()
                .map(|(c, var)| {
                    let names: Vec<&str> = c.capabilities().map(|cap| cap.name().label()).collect();
                    names
                        .iter()
                        .map(|name| format!("{name} {var}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .collect();
            out.push_str(&format!("({}) => ", context.join(", ")));
        }

        let mut spans = Vec::with_capacity(self.slots.len());

        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                out.push_str(" -> ");
            }

            let start = out.len();
            match slot {
                Slot::Type(typ) => out.push_str(typ.name()),
                Slot::Constraint(c) => {
                    let var = variables
                        .iter()
                        .find(|(known, _)| *known == c)
                        .map(|(_, var)| var.as_str())
                        .unwrap_or("?");
                    out.push_str(var);
                }
            }
            spans.push(start..out.len());
        }

        (out, spans)
    }
}

/// `a`, `b`, ..., `z`, `a1`, `b1`, ...
fn display_variable(index: usize) -> String {
    let letter = (b'a' + (index % 26) as u8) as char;
    match index / 26 {
        0 => letter.to_string(),
        n => format!("{letter}{n}"),
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render_with_spans().0)
    }
}

impl<S: Into<Slot>> Shr<S> for Signature {
    type Output = Signature;

    fn shr(self, next: S) -> Signature {
        self.push(next.into())
    }
}

impl<S: Into<Slot>> Shr<S> for Slot {
    type Output = Signature;

    fn shr(self, next: S) -> Signature {
        Signature::returning(self) >> next
    }
}

impl<S: Into<Slot>> Shr<S> for Type {
    type Output = Signature;

    fn shr(self, next: S) -> Signature {
        Slot::from(self) >> next
    }
}

impl<S: Into<Slot>> Shr<S> for Constraint {
    type Output = Signature;

    fn shr(self, next: S) -> Signature {
        Slot::from(self) >> next
    }
}

impl<S: Into<Slot>> Shr<S> for Capability {
    type Output = Signature;

    fn shr(self, next: S) -> Signature {
        Slot::from(self) >> next
    }
}

/// Suggest a declared capability close to an unknown name.
pub fn suggest_capability(registry: &Registry, name: &str) -> Option<Ident> {
    let known: Vec<&'static str> = registry
        .capabilities()
        .iter()
        .map(|cap| cap.name().label())
        .collect();
    suggest::find_best_match(&known, name).map(Ident::new)
}
