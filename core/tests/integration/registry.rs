use assert_matches::assert_matches;
use funcstuff_core::{
    error::{RegistrationError, UnbindableReason},
    function::Function,
    identifier::Ident,
    typ::Type,
    typeclass::{builtins, Implementation},
    value::Value,
};
use pretty_assertions::assert_eq;

use crate::{describe_as, describe_registry};

#[test]
fn exact_implementation_set() {
    let (registry, describe) = describe_registry();
    registry
        .register_instance(Type::Record, &describe, [("describe", describe_as("a record"))])
        .unwrap();

    let record = Value::record([("a", 1)]);
    assert_eq!(
        registry.invoke(&record, "describe", &[]),
        Ok(Value::from("a record"))
    );
    assert_eq!(
        registry.invoke(&record, "shout", &[]),
        Ok(Value::from("A RECORD"))
    );
}

#[test]
fn overriding_a_default() {
    let (registry, describe) = describe_registry();
    registry
        .register_instance(
            Type::Record,
            &describe,
            [
                ("describe", describe_as("a record")),
                ("shout", describe_as("RECORD!")),
            ],
        )
        .unwrap();

    assert_eq!(
        registry.invoke(&Value::record([("a", 1)]), "shout", &[]),
        Ok(Value::from("RECORD!"))
    );
}

#[test]
fn short_implementation_set() {
    let (registry, describe) = describe_registry();
    let err = registry
        .register_instance(Type::Record, &describe, [("shout", describe_as("!"))])
        .unwrap_err();

    assert_eq!(
        err,
        RegistrationError::MissingOperations {
            capability: Ident::new("Describe"),
            typ: Type::Record,
            missing: vec![Ident::new("describe")],
            required: vec![Ident::new("describe")],
            supplied: vec![Ident::new("shout")],
        }
    );
    assert!(!registry.satisfies(Type::Record, [&describe]));
}

#[test]
fn extra_implementation() {
    let (registry, describe) = describe_registry();
    let err = registry
        .register_instance(
            Type::Record,
            &describe,
            [
                ("describe", describe_as("a record")),
                ("whisper", describe_as("...")),
            ],
        )
        .unwrap_err();

    assert_matches!(
        err,
        RegistrationError::UnexpectedOperations { unexpected, .. }
            if unexpected == vec![Ident::new("whisper")]
    );
}

#[test]
fn free_function_for_a_method_is_rejected() {
    let (registry, describe) = describe_registry();
    let err = registry
        .register_instance(
            Type::Record,
            &describe,
            [(
                "describe",
                Implementation::function(Function::constant(Value::from("x"))),
            )],
        )
        .unwrap_err();

    assert_matches!(
        err,
        RegistrationError::Unbindable {
            reason: UnbindableReason::NoReceiver,
            ..
        }
    );
}

#[test]
fn registered_and_unregistered_capabilities_across_subtypes() {
    let (registry, describe) = describe_registry();
    registry
        .register_instance(Type::Maybe, &describe, [("describe", describe_as("maybe"))])
        .unwrap();
    registry
        .register_instance(Type::Nothing, &describe, [("describe", describe_as("nothing"))])
        .unwrap();

    for typ in [Type::Maybe, Type::Just, Type::Nothing] {
        assert!(registry.satisfies(typ, [&describe]), "{typ}");
    }
    for typ in [Type::Either, Type::Right, Type::Dyn] {
        assert!(!registry.satisfies(typ, [&describe]), "{typ}");
    }

    // the most specific instance wins
    assert_eq!(
        registry.invoke(&Value::just(1), "describe", &[]),
        Ok(Value::from("maybe"))
    );
    assert_eq!(
        registry.invoke(&Value::nothing(), "describe", &[]),
        Ok(Value::from("nothing"))
    );
}

#[test]
fn capabilities_of_is_sorted_and_includes_ancestors() {
    let registry = funcstuff_core::typeclass::Registry::global();

    let names: Vec<String> = registry
        .capabilities_of(Type::Just)
        .iter()
        .map(|cap| cap.name().into_label())
        .collect();
    assert_eq!(names, vec!["Applicative", "Eq", "Functor", "Monad"]);

    let names: Vec<String> = registry
        .capabilities_of(Type::Integer)
        .iter()
        .map(|cap| cap.name().into_label())
        .collect();
    assert_eq!(names, vec!["Show", "ToNix"]);

    assert!(registry.capabilities_of(Type::Error).is_empty());
}

#[test]
fn builtin_capability_identity() {
    let registry = funcstuff_core::typeclass::Registry::global();
    assert_eq!(registry.capability("Monad"), Some(builtins::MONAD.clone()));
    assert!(registry.satisfies(Type::Right, [&*builtins::MONAD, &*builtins::EQ]));
    assert!(!registry.satisfies(Type::Array, [&*builtins::MONAD]));
}
