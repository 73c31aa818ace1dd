use funcstuff_core::{
    container::Maybe,
    error::{Error, EvalError, RegistrationError},
    function::Function,
    typ::Type,
    typeclass::{Capability, Implementation, Operation, Registry},
    value::Value,
};

mod concurrency;
mod registry;
mod sequence;
mod typed;

/// A registry with a user-declared `Describe` capability: `describe` is required, `shout`
/// defaults to the upper-cased description.
pub fn describe_registry() -> (Registry, Capability) {
    let registry = Registry::new();
    let describe = registry
        .declare(
            "Describe",
            [
                Operation::method("describe"),
                Operation::method("shout").with_default(Implementation::method(
                    |registry, recv, _| match registry.invoke(recv, "describe", &[])? {
                        Value::Str(s) => Ok(Value::Str(s.to_uppercase())),
                        other => Err(Error::other(format!("not a description: {other}"))),
                    },
                )),
            ],
        )
        .unwrap();

    (registry, describe)
}

pub fn describe_as(text: &'static str) -> Implementation {
    Implementation::method(move |_, _, _| Ok(Value::from(text)))
}

#[test]
fn values_decoded_from_json_go_through_capabilities() {
    let registry = Registry::global();
    let value = funcstuff_core::deserialize::InputFormat::Json
        .parse(r#"{"deps": ["a", "b"], "enable": true}"#)
        .unwrap();

    assert_eq!(
        funcstuff_core::typeclass::builtins::to_nix(registry, &value).unwrap(),
        r#"{ "deps" = [ "a" "b" ]; "enable" = true; }"#
    );

    let deps = value.fetch_maybe(&Value::from("deps")).cloned();
    let Maybe::Just(deps) = deps else {
        panic!("missing deps");
    };
    let upper = Function::new("upper", 1, |args| match &args[0] {
        Value::Str(s) => Ok(Value::from(s.to_uppercase())),
        other => Err(Error::other(format!("not a string: {other}"))),
    });

    assert_eq!(
        registry.invoke(&deps, "fmap", &[Value::Func(upper)]),
        Ok(Value::Array(vec![Value::from("A"), Value::from("B")]))
    );
}

#[test]
fn unknown_operation_lists_what_is_available() {
    let err = Registry::global()
        .invoke(&Value::just(1), "fmpa", &[])
        .unwrap_err();

    let Error::EvalError(EvalError::MissingOperation { available, .. }) = err else {
        panic!("unexpected error {err:?}");
    };
    assert!(available.iter().any(|op| op.label() == "fmap"));
}

#[test]
fn builtin_capabilities_are_declared() {
    let names: Vec<String> = Registry::global()
        .capabilities()
        .iter()
        .map(|cap| cap.name().into_label())
        .collect();

    assert_eq!(
        names,
        vec!["Applicative", "Eq", "Functor", "Monad", "Show", "ToNix"]
    );
}

#[test]
fn deriving_a_capability_with_required_operations_fails() {
    let (registry, describe) = describe_registry();

    let err = registry.derive(Type::Bool, &describe).unwrap_err();
    assert!(matches!(err, RegistrationError::NotDerivable { .. }));
}
