use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use assert_matches::assert_matches;
use funcstuff_core::{
    error::{CallError, Error, ExpectedArity, Files, IntoDiagnostics},
    function::Function,
    typ::Type,
    typeclass::{builtins, Registry},
    typed::{def_typed, def_typed_curried, Applied, Constraint},
    value::Value,
};
use pretty_assertions::assert_eq;

/// `(Functor a) => Function -> a -> a`
fn checked_fmap(ran: Arc<AtomicBool>) -> funcstuff_core::typed::CurriedFn {
    let functor = Constraint::from(builtins::FUNCTOR.clone());

    def_typed_curried(
        "fmap",
        Type::Function >> functor.clone() >> functor,
        move |args| {
            ran.store(true, Ordering::SeqCst);
            Registry::global().invoke(&args[1], "fmap", &args[..1])
        },
    )
}

fn negate() -> Value {
    Value::Func(Function::new("negate", 1, |args| match &args[0] {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        other => Ok(other.clone()),
    }))
}

#[test]
fn partial_application_is_not_invoked() {
    let ran = Arc::new(AtomicBool::new(false));
    let fmap = checked_fmap(Arc::clone(&ran));

    let applied = fmap.call(&[negate()]).unwrap();
    assert!(!applied.is_saturated());
    assert!(!ran.load(Ordering::SeqCst));

    let Applied::Partial(partial) = applied else {
        unreachable!()
    };
    assert_eq!(
        partial.call(&[Value::just(true)]),
        Ok(Applied::Saturated(Value::just(false)))
    );
    assert!(ran.load(Ordering::SeqCst));
}

#[test]
fn saturating_behaves_like_a_full_call() {
    let fmap = checked_fmap(Arc::new(AtomicBool::new(false)));
    let args = [negate(), Value::right(Value::Bool(false))];

    let full = fmap.call(&args);
    let Ok(Applied::Partial(partial)) = fmap.call(&args[..1]) else {
        panic!("expected a partial application");
    };
    let step_by_step = partial.call(&args[1..]);

    assert_eq!(full, step_by_step);
    assert_eq!(full, Ok(Applied::Saturated(Value::right(Value::Bool(true)))));
}

#[test]
fn constraint_violation_in_a_partial_application() {
    let fmap = checked_fmap(Arc::new(AtomicBool::new(false)));
    let Ok(Applied::Partial(partial)) = fmap.call(&[negate()]) else {
        panic!("expected a partial application");
    };

    let err = partial.call(&[Value::from("not a functor")]).unwrap_err();
    assert_matches!(
        &err,
        Error::CallError(CallError::ArgumentType {
            position: 1,
            got: Type::String,
            ..
        })
    );
    assert_eq!(
        err.to_string(),
        "argument type mismatch in `fmap`: argument 2 expected a type with `Functor`, got `String`"
    );
}

#[test]
fn call_errors_point_at_the_signature() {
    let f = def_typed("to_int", Type::String >> Type::Integer, |_| Ok(Value::Null));

    let err = f.call(&[Value::from("1")]).unwrap_err();
    let mut files = Files::new();
    let diagnostics = err.into_diagnostics(&mut files);

    let label = &diagnostics[0].labels[0];
    let source = files.source(label.file_id);
    assert_eq!(source.as_str(), "String -> Integer");
    assert_eq!(&source[label.range.clone()], "Integer");
}

#[test]
fn arity_of_plain_checked_functions() {
    let f = def_typed("pair", Type::Dyn >> Type::Dyn >> Type::Array, |args| {
        Ok(Value::Array(args.to_vec()))
    });

    assert_eq!(
        f.call(&[1.into(), 2.into()]),
        Ok(Value::Array(vec![1.into(), 2.into()]))
    );
    for args in [vec![], vec![Value::Null; 3]] {
        assert_matches!(
            f.call(&args),
            Err(Error::CallError(CallError::Arity {
                expected: ExpectedArity::Exactly(2),
                ..
            }))
        );
    }
}

#[test]
fn constraints_follow_a_custom_registry() {
    let registry = Registry::new();
    let pretty = registry.declare("Pretty", []).unwrap();
    registry.derive(Type::Bool, &pretty).unwrap();

    let f = def_typed(
        "render",
        Constraint::from(pretty) >> Type::String,
        |args| Ok(Value::from(args[0].to_string())),
    )
    .with_registry(registry);

    assert_eq!(f.call(&[Value::Bool(true)]), Ok(Value::from("true")));
    assert!(f.call(&[Value::Null]).is_err());
}

#[test]
fn constrained_return_slot_rejects_plain_values() {
    let functor = Constraint::from(builtins::FUNCTOR.clone());
    let wrap = def_typed_curried("wrap", Type::Integer >> Type::Bool >> functor, |args| {
        Ok(if args[1] == Value::Bool(true) {
            Value::just(args[0].clone())
        } else {
            args[0].clone()
        })
    });

    assert_eq!(
        wrap.call(&[1.into(), Value::Bool(true)]),
        Ok(Applied::Saturated(Value::just(1)))
    );
    let err = wrap.call(&[1.into(), Value::Bool(false)]).unwrap_err();
    assert_matches!(
        err,
        Error::CallError(CallError::ReturnType {
            got: Type::Integer,
            ..
        })
    );
}

#[test]
fn checked_values_passed_to_fmap_keep_their_checks() {
    let inc = def_typed("inc", Type::Integer >> Type::Integer, |args| match &args[0] {
        Value::Num(n) => Ok(Value::Num(n + funcstuff_core::value::Number::from(1))),
        _ => unreachable!("arguments are checked"),
    })
    .into_function();

    let registry = Registry::global();
    assert_eq!(
        registry.invoke(&Value::just(1), "fmap", &[Value::Func(inc.clone())]),
        Ok(Value::just(2))
    );
    assert_matches!(
        registry.invoke(&Value::just("one"), "fmap", &[Value::Func(inc)]),
        Err(Error::CallError(CallError::ArgumentType { position: 0, .. }))
    );
}
