use std::cell::RefCell;

use assert_matches::assert_matches;
use funcstuff_core::{
    container::{sequence, sequence::sequence_values, Either, Just, Left, Maybe, Nothing, Right},
    error::{Error, EvalError},
    lookup::{FetchMaybe, IteratorMaybe},
    typeclass::Registry,
    value::Value,
};

#[test]
fn short_circuit_records_nothing_after_the_failure() {
    let log = RefCell::new(Vec::new());

    let result: Either<i32, i32> = sequence(|m| {
        log.borrow_mut().push(m.bind(Right(1))?);
        log.borrow_mut().push(m.bind(Left::<_, i32>(2))?);
        log.borrow_mut().push(m.bind(Right(3))?);
        Ok(Right(4))
    });

    assert_eq!(result, Left(2));
    assert_eq!(*log.borrow(), vec![1]);
}

#[test]
fn lookups_feed_sequencing_blocks() {
    let ports = vec![8080, 8443];
    let names = ["http", "https"];

    let pick = |index: isize| -> Maybe<(i32, &'static str)> {
        sequence(|m| {
            let port = m.bind(ports.fetch_maybe(&index))?;
            let name = m.bind(names.iter().find_maybe(|n| n.len() > 4))?;
            Ok(Just((*port, *name)))
        })
    };

    assert_eq!(pick(-1), Just((8443, "https")));
    assert_eq!(pick(5), Nothing);
}

#[test]
fn dynamic_block_over_maybe_values() {
    let registry = Registry::global();

    let record = Value::record([("host", Value::from("localhost")), ("port", Value::from(80))]);

    let endpoint = sequence_values(registry, |m| {
        let host = m.bind(record.fetch_maybe(&Value::from("host")).cloned().into())?;
        let port = m.bind(record.fetch_maybe(&Value::from("port")).cloned().into())?;
        Ok(Value::just(format!("{}:{port}", host.as_str().unwrap_or_default())))
    });
    assert_eq!(endpoint, Ok(Value::just("localhost:80")));

    let missing = sequence_values(registry, |m| {
        let user = m.bind(record.fetch_maybe(&Value::from("user")).cloned().into())?;
        Ok(Value::just(user))
    });
    assert_eq!(missing, Ok(Value::nothing()));
}

#[test]
fn dynamic_block_propagates_errors() {
    let result = sequence_values(Registry::global(), |m| {
        m.bind(Value::just(1))?;
        Err(Error::other("boom").into())
    });

    assert_matches!(result, Err(Error::EvalError(EvalError::Other(msg))) if msg == "boom");
}

#[test]
fn captured_dispatch_failures_skip_fmap() {
    let registry = Registry::global();
    let captured = Value::capture(|| registry.invoke(&Value::Null, "fmap", &[]));

    let Some(Either::Left(err)) = captured.as_either() else {
        panic!("expected a captured failure");
    };
    assert_matches!(
        err.as_error(),
        Some(Error::EvalError(EvalError::MissingOperation { .. }))
    );

    let id = Value::Func(funcstuff_core::function::Function::identity());
    assert_eq!(registry.invoke(&captured, "fmap", &[id]), Ok(captured.clone()));
}
