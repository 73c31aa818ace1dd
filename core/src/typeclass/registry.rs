//! The capability registry.
//!
//! The registry maps each runtime type to the capabilities it has been registered against and
//! to the implementations of their operations. It is usually populated once at start-up and
//! then only read: writers are serialized by a lock and publish a new immutable snapshot, while
//! readers keep using the snapshot they got, without waiting.
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::{Arc, Mutex, RwLock},
};

use once_cell::sync::Lazy;

use super::{builtins, Capability, Implementation, Operation, OperationKind};
use crate::{
    error::{Error, EvalError, RegistrationError},
    identifier::Ident,
    typ::Type,
    value::Value,
};

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::with_builtins);

/// An operation bound for a given type.
#[derive(Clone, Debug)]
struct Bound {
    capability: Ident,
    kind: OperationKind,
    implementation: Implementation,
}

/// The capabilities and bound operations registered for one type.
#[derive(Clone, Debug, Default)]
struct Instances {
    capabilities: BTreeSet<Capability>,
    operations: HashMap<Ident, Bound>,
}

#[derive(Clone, Debug, Default)]
struct Snapshot {
    declared: BTreeMap<Ident, Capability>,
    instances: HashMap<Type, Instances>,
}

impl Snapshot {
    /// Make `capability` known under its name. Two distinct capabilities can't share a name.
    fn declare(&mut self, capability: &Capability) -> Result<(), RegistrationError> {
        match self.declared.get(&capability.name()) {
            Some(existing) if existing == capability => Ok(()),
            Some(_) => Err(RegistrationError::DuplicateCapability {
                name: capability.name(),
            }),
            None => {
                self.declared.insert(capability.name(), capability.clone());
                Ok(())
            }
        }
    }

    /// Find the implementation of `operation` for `typ`, walking up the type hierarchy. Return
    /// the type the instance was found on as well.
    fn lookup(&self, typ: Type, operation: Ident) -> Option<(Type, &Bound)> {
        typ.ancestors().find_map(|ancestor| {
            self.instances
                .get(&ancestor)
                .and_then(|inst| inst.operations.get(&operation))
                .map(|bound| (ancestor, bound))
        })
    }

    fn capabilities_of(&self, typ: Type) -> BTreeSet<Capability> {
        typ.ancestors()
            .filter_map(|ancestor| self.instances.get(&ancestor))
            .flat_map(|inst| inst.capabilities.iter().cloned())
            .collect()
    }

    fn operations_of(&self, typ: Type) -> Vec<Ident> {
        let ops: BTreeSet<Ident> = typ
            .ancestors()
            .filter_map(|ancestor| self.instances.get(&ancestor))
            .flat_map(|inst| inst.operations.keys().copied())
            .collect();
        ops.into_iter().collect()
    }
}

struct Inner {
    /// Serializes writers. Readers never take it.
    writer: Mutex<()>,
    snapshot: RwLock<Arc<Snapshot>>,
}

/// A registry of capabilities and instances.
///
/// `Registry` is a handle: clones share the same underlying registry.
#[derive(Clone)]
pub struct Registry(Arc<Inner>);

impl Registry {
    /// Create an empty registry, without any capability or instance.
    pub fn new() -> Self {
        Registry(Arc::new(Inner {
            writer: Mutex::new(()),
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
        }))
    }

    /// Create a registry with the builtin capabilities and instances.
    pub fn with_builtins() -> Self {
        let registry = Registry::new();
        builtins::install(&registry)
            .unwrap_or_else(|err| panic!("builtin instances are ill-formed: {err}"));
        registry
    }

    /// The process-wide registry, holding the builtin capabilities and instances.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self
            .0
            .snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Apply a modification to a copy of the current snapshot and publish it if it succeeds.
    fn update<T>(
        &self,
        f: impl FnOnce(&mut Snapshot) -> Result<T, RegistrationError>,
    ) -> Result<T, RegistrationError> {
        let _writer = self
            .0
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut next = Snapshot::clone(&self.snapshot());
        let result = f(&mut next)?;

        *self
            .0
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(next);

        Ok(result)
    }

    /// Declare a new capability and make it known to this registry under its name.
    pub fn declare(
        &self,
        name: impl Into<Ident>,
        operations: impl IntoIterator<Item = Operation>,
    ) -> Result<Capability, RegistrationError> {
        let capability = Capability::new(name, operations)?;
        self.add_capability(capability.clone())?;
        Ok(capability)
    }

    /// Make an already declared capability known to this registry. Adding the same capability
    /// twice is a no-op, but two distinct capabilities can't share a name.
    pub fn add_capability(&self, capability: Capability) -> Result<(), RegistrationError> {
        self.update(|snapshot| snapshot.declare(&capability))
    }

    /// The capability declared under `name`, if any.
    pub fn capability(&self, name: impl Into<Ident>) -> Option<Capability> {
        self.snapshot().declared.get(&name.into()).cloned()
    }

    /// All the capabilities known to this registry, sorted by name.
    pub fn capabilities(&self) -> Vec<Capability> {
        self.snapshot().declared.values().cloned().collect()
    }

    /// Register `typ` as an instance of `capability`.
    ///
    /// `implementations` must provide exactly the operations of `capability` that don't have
    /// a default, and may override defaulted ones. Anything else is rejected, and so are
    /// implementations that can't be bound to their operation (e.g. a free function for a
    /// method). On success the capability is added to the capabilities of `typ`; registering
    /// other capabilities later adds to the set.
    pub fn register_instance<N>(
        &self,
        typ: Type,
        capability: &Capability,
        implementations: impl IntoIterator<Item = (N, Implementation)>,
    ) -> Result<(), RegistrationError>
    where
        N: Into<Ident>,
    {
        let supplied: Vec<(Ident, Implementation)> = implementations
            .into_iter()
            .map(|(name, imp)| (name.into(), imp))
            .collect();
        let bound = capability.bind_instance(typ, supplied)?;

        self.update(|snapshot| {
            snapshot.declare(capability)?;

            let instances = snapshot.instances.entry(typ).or_default();
            instances.capabilities.insert(capability.clone());

            for (name, kind, implementation) in bound {
                instances.operations.insert(
                    name,
                    Bound {
                        capability: capability.name(),
                        kind,
                        implementation,
                    },
                );
            }

            Ok(())
        })?;

        log::debug!("registered `{typ}` as an instance of `{capability}`");
        Ok(())
    }

    /// Register `typ` as an instance of `capability` using only the default implementations.
    pub fn derive(&self, typ: Type, capability: &Capability) -> Result<(), RegistrationError> {
        if !capability.is_derivable() {
            return Err(RegistrationError::NotDerivable {
                capability: capability.name(),
                typ,
                required: capability.required(),
            });
        }

        self.register_instance(typ, capability, Vec::<(Ident, Implementation)>::new())
    }

    /// The capabilities of `typ`, including the ones inherited from its ancestors, sorted by
    /// name. Empty if nothing was ever registered.
    pub fn capabilities_of(&self, typ: Type) -> BTreeSet<Capability> {
        self.snapshot().capabilities_of(typ)
    }

    /// The capabilities registered on `typ` itself, excluding inherited ones.
    pub fn own_capabilities(&self, typ: Type) -> BTreeSet<Capability> {
        self.snapshot()
            .instances
            .get(&typ)
            .map(|inst| inst.capabilities.clone())
            .unwrap_or_default()
    }

    /// Whether `typ` has all the given capabilities.
    pub fn satisfies<'c>(
        &self,
        typ: Type,
        capabilities: impl IntoIterator<Item = &'c Capability>,
    ) -> bool {
        let own = self.capabilities_of(typ);
        capabilities.into_iter().all(|cap| own.contains(cap))
    }

    /// Whether values of type `typ` have an operation called `operation`.
    pub fn responds_to(&self, typ: Type, operation: impl Into<Ident>) -> bool {
        self.snapshot().lookup(typ, operation.into()).is_some()
    }

    /// The names of the operations available on values of type `typ`, sorted.
    pub fn operations_of(&self, typ: Type) -> Vec<Ident> {
        self.snapshot().operations_of(typ)
    }

    /// Call `operation` on `receiver`.
    ///
    /// The implementation is looked up on the type of the receiver, then on its ancestors.
    /// Constructors can be called this way as well, in which case the receiver is only used to
    /// find the instance.
    pub fn invoke(
        &self,
        receiver: &Value,
        operation: impl Into<Ident>,
        args: &[Value],
    ) -> Result<Value, Error> {
        let operation = operation.into();
        let typ = receiver.type_of();
        let snapshot = self.snapshot();

        let Some((found, bound)) = snapshot.lookup(typ, operation) else {
            return Err(EvalError::MissingOperation {
                typ,
                operation,
                available: snapshot.operations_of(typ),
            }
            .into());
        };

        log::trace!(
            "dispatching `{operation}` on `{typ}` to the `{}` instance of `{found}`",
            bound.capability
        );

        match &bound.implementation {
            Implementation::Method(f) => f(self, receiver, args),
            Implementation::Constructor(f) => f(self, found, args),
            Implementation::Function(f) => f.call(args),
        }
    }

    /// Call a constructor of `typ`, such as `pure` or `return`.
    pub fn invoke_static(
        &self,
        typ: Type,
        operation: impl Into<Ident>,
        args: &[Value],
    ) -> Result<Value, Error> {
        let operation = operation.into();
        let snapshot = self.snapshot();

        let Some((found, bound)) = snapshot.lookup(typ, operation) else {
            return Err(EvalError::MissingOperation {
                typ,
                operation,
                available: snapshot.operations_of(typ),
            }
            .into());
        };

        log::trace!("dispatching constructor `{operation}` of `{typ}` (found on `{found}`)");

        match (&bound.kind, &bound.implementation) {
            (OperationKind::Method, _) | (_, Implementation::Method(_)) => {
                Err(EvalError::MissingReceiver { typ, operation }.into())
            }
            (_, Implementation::Constructor(f)) => f(self, found, args),
            (_, Implementation::Function(f)) => f.call(args),
        }
    }

    /// The types with at least one registered capability, in hierarchy order, along with their
    /// own capabilities.
    pub fn instances(&self) -> Vec<(Type, BTreeSet<Capability>)> {
        let snapshot = self.snapshot();
        Type::ALL
            .into_iter()
            .filter_map(|typ| {
                snapshot
                    .instances
                    .get(&typ)
                    .map(|inst| (typ, inst.capabilities.clone()))
            })
            .collect()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("instances", &self.instances())
            .finish()
    }
}
