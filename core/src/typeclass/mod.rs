//! Capabilities: named sets of operations that unrelated types can share.
//!
//! A [Capability] is declared once with its [Operation]s. Some operations carry a default
//! [Implementation]; the others are *required* and must be supplied by every instance. A
//! capability whose operations all have a default is *derivable*.
//!
//! Types register against a capability in a [Registry], which then dispatches operations on
//! [values](crate::value::Value) according to their runtime [type](crate::typ::Type).
//! Registrations are inherited: an instance for `Maybe` also serves `Just` and `Nothing` values,
//! unless a more specific instance overrides it.
//!
//! Operations come in two kinds. *Methods* are called on a value, the receiver, which the
//! implementation gets as its second argument. *Constructors* are type-level operations such as
//! `pure` and `return`, which create a value of the type from their arguments.
use std::{cmp::Ordering, collections::HashSet, fmt, hash, sync::Arc};

use crate::{
    error::{Error, EvalError, RegistrationError, UnbindableReason},
    function::Function,
    identifier::Ident,
    typ::Type,
    value::Value,
};

pub mod builtins;
pub mod containers;
pub mod registry;

pub use registry::Registry;

/// Implementation of a method. Receives the registry, the receiver and the arguments.
pub type MethodFn = dyn Fn(&Registry, &Value, &[Value]) -> Result<Value, Error> + Send + Sync;

/// Implementation of a constructor. Receives the registry, the type the instance was registered
/// on and the arguments.
pub type ConstructorFn = dyn Fn(&Registry, Type, &[Value]) -> Result<Value, Error> + Send + Sync;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Method,
    Constructor,
}

/// The code of an operation.
#[derive(Clone)]
pub enum Implementation {
    Method(Arc<MethodFn>),
    Constructor(Arc<ConstructorFn>),
    /// A free function. It has no access to a receiver, so it can only implement constructors.
    Function(Function),
}

impl Implementation {
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&Registry, &Value, &[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Implementation::Method(Arc::new(f))
    }

    pub fn constructor<F>(f: F) -> Self
    where
        F: Fn(&Registry, Type, &[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        Implementation::Constructor(Arc::new(f))
    }

    pub fn function(f: Function) -> Self {
        Implementation::Function(f)
    }

    /// Check that this implementation can be bound to an operation of the given kind.
    fn bindable_to(&self, kind: OperationKind) -> Result<(), UnbindableReason> {
        match (self, kind) {
            (Implementation::Method(_), OperationKind::Method)
            | (Implementation::Constructor(_), OperationKind::Constructor)
            | (Implementation::Function(_), OperationKind::Constructor) => Ok(()),
            (Implementation::Method(_), OperationKind::Constructor) => {
                Err(UnbindableReason::UnexpectedReceiver)
            }
            (Implementation::Constructor(_) | Implementation::Function(_), OperationKind::Method) => {
                Err(UnbindableReason::NoReceiver)
            }
        }
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implementation::Method(_) => write!(f, "Implementation::Method(..)"),
            Implementation::Constructor(_) => write!(f, "Implementation::Constructor(..)"),
            Implementation::Function(func) => write!(f, "Implementation::Function({func})"),
        }
    }
}

/// An operation of a capability.
#[derive(Clone, Debug)]
pub struct Operation {
    name: Ident,
    kind: OperationKind,
    default: Option<Implementation>,
}

impl Operation {
    pub fn method(name: impl Into<Ident>) -> Self {
        Operation {
            name: name.into(),
            kind: OperationKind::Method,
            default: None,
        }
    }

    pub fn constructor(name: impl Into<Ident>) -> Self {
        Operation {
            name: name.into(),
            kind: OperationKind::Constructor,
            default: None,
        }
    }

    pub fn with_default(self, default: Implementation) -> Self {
        Operation {
            default: Some(default),
            ..self
        }
    }

    pub fn name(&self) -> Ident {
        self.name
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn default(&self) -> Option<&Implementation> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

#[derive(Debug)]
struct CapabilityData {
    name: Ident,
    operations: Vec<Operation>,
}

/// A declared capability.
///
/// Capabilities are cheap to clone and immutable. Two capabilities are equal only if they come
/// from the same declaration, even if they have the same name and operations. They are ordered
/// by name.
#[derive(Clone)]
pub struct Capability(Arc<CapabilityData>);

impl Capability {
    /// Declare a new capability, independently of any registry. See also [Registry::declare].
    pub fn new(
        name: impl Into<Ident>,
        operations: impl IntoIterator<Item = Operation>,
    ) -> Result<Self, RegistrationError> {
        let name = name.into();
        let operations: Vec<Operation> = operations.into_iter().collect();
        let mut seen = HashSet::new();

        for op in &operations {
            if !seen.insert(op.name) {
                return Err(RegistrationError::DuplicateOperation {
                    capability: name,
                    operation: op.name,
                });
            }

            if let Some(Err(reason)) = op.default.as_ref().map(|imp| imp.bindable_to(op.kind)) {
                return Err(RegistrationError::Unbindable {
                    capability: name,
                    typ: Type::Dyn,
                    operation: op.name,
                    reason,
                });
            }
        }

        log::debug!(
            "declared capability `{name}` with {} operation(s)",
            operations.len()
        );

        Ok(Capability(Arc::new(CapabilityData { name, operations })))
    }

    pub fn name(&self) -> Ident {
        self.0.name
    }

    pub fn operations(&self) -> &[Operation] {
        &self.0.operations
    }

    pub fn operation(&self, name: Ident) -> Option<&Operation> {
        self.0.operations.iter().find(|op| op.name == name)
    }

    /// The names of the operations without a default.
    pub fn required(&self) -> Vec<Ident> {
        self.0
            .operations
            .iter()
            .filter(|op| op.is_required())
            .map(Operation::name)
            .collect()
    }

    /// The names of the operations with a default.
    pub fn defaulted(&self) -> Vec<Ident> {
        self.0
            .operations
            .iter()
            .filter(|op| !op.is_required())
            .map(Operation::name)
            .collect()
    }

    /// A capability is derivable if all its operations have a default.
    pub fn is_derivable(&self) -> bool {
        self.0.operations.iter().all(|op| !op.is_required())
    }

    /// Validate the implementations supplied for an instance on `typ`, and return the full
    /// set of operations to bind, defaults included.
    ///
    /// Exactly the required operations may be supplied, plus overrides of defaulted ones.
    pub(crate) fn bind_instance(
        &self,
        typ: Type,
        supplied: Vec<(Ident, Implementation)>,
    ) -> Result<Vec<(Ident, OperationKind, Implementation)>, RegistrationError> {
        let supplied_names: Vec<Ident> = supplied.iter().map(|(name, _)| *name).collect();

        let missing: Vec<Ident> = self
            .required()
            .into_iter()
            .filter(|name| !supplied_names.contains(name))
            .collect();

        if !missing.is_empty() {
            return Err(RegistrationError::MissingOperations {
                capability: self.name(),
                typ,
                missing,
                required: self.required(),
                supplied: supplied_names,
            });
        }

        let unexpected: Vec<Ident> = supplied_names
            .iter()
            .filter(|name| self.operation(**name).is_none())
            .copied()
            .collect();

        if !unexpected.is_empty() {
            return Err(RegistrationError::UnexpectedOperations {
                capability: self.name(),
                typ,
                unexpected,
                defined: self.operations().iter().map(Operation::name).collect(),
            });
        }

        let mut bound = Vec::with_capacity(self.0.operations.len());

        for op in &self.0.operations {
            let implementation = supplied
                .iter()
                .rev()
                .find(|(name, _)| *name == op.name)
                .map(|(_, imp)| imp)
                .or(op.default.as_ref());

            // Both cases are excluded by the checks above.
            let Some(implementation) = implementation else {
                continue;
            };

            implementation
                .bindable_to(op.kind)
                .map_err(|reason| RegistrationError::Unbindable {
                    capability: self.name(),
                    typ,
                    operation: op.name,
                    reason,
                })?;

            bound.push((op.name, op.kind, implementation.clone()));
        }

        Ok(bound)
    }
}

impl PartialEq for Capability {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Capability {}

impl hash::Hash for Capability {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state)
    }
}

impl PartialOrd for Capability {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// By name first. Distinct declarations with the same name are ordered arbitrarily but
// consistently.
impl Ord for Capability {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name()
            .cmp(&other.name())
            .then_with(|| Arc::as_ptr(&self.0).cmp(&Arc::as_ptr(&other.0)))
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability({})", self.name())
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Destructure the arguments of a builtin operation, checking their number.
pub(crate) fn operands<'a, const N: usize>(
    operation: &str,
    args: &'a [Value],
) -> Result<&'a [Value; N], Error> {
    args.try_into().map_err(|_| {
        EvalError::Arity {
            function: Ident::new(operation),
            expected: N,
            got: args.len(),
        }
        .into()
    })
}

/// Extract a function from an operand.
pub(crate) fn function_operand<'a>(operation: &str, arg: &'a Value) -> Result<&'a Function, Error> {
    arg.as_function().ok_or_else(|| {
        EvalError::OperandType {
            operation: Ident::new(operation),
            expected: String::from("a function"),
            got: arg.type_of(),
        }
        .into()
    })
}
