//! Functor, applicative and monad instances of the containers, for dynamic values.
//!
//! `Maybe` and `Either` values get `Eq`, `Functor`, `Applicative` and `Monad`. Arrays are
//! functors and applicatives: `ap` applies every function to every argument.
//!
//! `bind` checks that its continuation returns a value of the same family as the receiver, and
//! `ap` checks its argument the same way. A mismatch is an error, not a failure value.
use super::{
    builtins::{APPLICATIVE, EQ, FUNCTOR, MONAD},
    function_operand, operands, Implementation, Registry,
};
use crate::{
    container::{Either, Functor, Maybe},
    error::{Error, EvalError, RegistrationError},
    identifier::Ident,
    typ::Type,
    value::Value,
};

pub fn install(registry: &Registry) -> Result<(), RegistrationError> {
    for family in [Type::Maybe, Type::Either] {
        registry.derive(family, &EQ)?;
        registry.register_instance(family, &FUNCTOR, [("fmap", Implementation::method(fmap))])?;
        registry.register_instance(
            family,
            &APPLICATIVE,
            [
                ("pure", Implementation::constructor(wrap)),
                ("ap", Implementation::method(ap)),
            ],
        )?;
        registry.register_instance(
            family,
            &MONAD,
            [
                ("bind", Implementation::method(bind)),
                ("return", Implementation::constructor(wrap)),
            ],
        )?;
    }

    registry.register_instance(Type::Array, &FUNCTOR, [("fmap", Implementation::method(fmap))])?;
    registry.register_instance(
        Type::Array,
        &APPLICATIVE,
        [
            ("pure", Implementation::constructor(wrap)),
            ("ap", Implementation::method(ap)),
        ],
    )?;

    Ok(())
}

fn operand_type(operation: &str, expected: &str, got: &Value) -> Error {
    EvalError::OperandType {
        operation: Ident::new(operation),
        expected: expected.to_owned(),
        got: got.type_of(),
    }
    .into()
}

/// Check that `value` belongs to the `family` of the receiver of `operation`.
fn same_family(operation: &str, family: Type, value: &Value) -> Result<(), Error> {
    let got = value.type_of();

    if got.is_subtype_of(family) {
        Ok(())
    } else {
        Err(EvalError::FamilyMismatch {
            operation: Ident::new(operation),
            expected: family,
            got,
        }
        .into())
    }
}

/// `pure` and `return`: wrap a value in the success variant of the instance's family.
fn wrap(_: &Registry, typ: Type, args: &[Value]) -> Result<Value, Error> {
    let [value] = operands::<1>("pure", args)?;

    match typ.family() {
        Type::Maybe => Ok(Value::just(value.clone())),
        Type::Either => Ok(Value::right(value.clone())),
        Type::Array => Ok(Value::Array(vec![value.clone()])),
        other => Err(EvalError::Other(format!("`{other}` has no success variant")).into()),
    }
}

fn fmap(_: &Registry, recv: &Value, args: &[Value]) -> Result<Value, Error> {
    let [f] = operands::<1>("fmap", args)?;
    let f = function_operand("fmap", f)?;
    let apply = |x: &Value| f.call(std::slice::from_ref(x));

    match recv {
        Value::Maybe(m) => (**m)
            .as_ref()
            .fmap(apply)
            .transpose()
            .map(Value::from),
        Value::Either(e) => match (**e).as_ref() {
            Either::Left(_) => Ok(recv.clone()),
            Either::Right(x) => apply(x).map(Value::right),
        },
        Value::Array(elts) => elts
            .iter()
            .map(apply)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Err(operand_type("fmap", "a container", other)),
    }
}

fn ap(registry: &Registry, recv: &Value, args: &[Value]) -> Result<Value, Error> {
    let [arg] = operands::<1>("ap", args)?;
    let family = recv.type_of().family();

    match recv {
        Value::Maybe(m) => match &**m {
            Maybe::Nothing => Ok(recv.clone()),
            Maybe::Just(f) => {
                same_family("ap", family, arg)?;
                registry.invoke(arg, "fmap", std::slice::from_ref(f))
            }
        },
        Value::Either(e) => match &**e {
            Either::Left(_) => Ok(recv.clone()),
            Either::Right(f) => {
                same_family("ap", family, arg)?;
                registry.invoke(arg, "fmap", std::slice::from_ref(f))
            }
        },
        Value::Array(fs) => {
            same_family("ap", family, arg)?;
            let Value::Array(xs) = arg else {
                return Err(operand_type("ap", "an array", arg));
            };

            let mut result = Vec::with_capacity(fs.len() * xs.len());
            for f in fs {
                let f = function_operand("ap", f)?;
                for x in xs {
                    result.push(f.call(std::slice::from_ref(x))?);
                }
            }
            Ok(Value::Array(result))
        }
        other => Err(operand_type("ap", "a container", other)),
    }
}

fn bind(_: &Registry, recv: &Value, args: &[Value]) -> Result<Value, Error> {
    let [f] = operands::<1>("bind", args)?;
    let f = function_operand("bind", f)?;
    let family = recv.type_of().family();

    let inner = match recv {
        Value::Maybe(m) => match &**m {
            Maybe::Just(x) => x,
            Maybe::Nothing => return Ok(recv.clone()),
        },
        Value::Either(e) => match &**e {
            Either::Right(x) => x,
            Either::Left(_) => return Ok(recv.clone()),
        },
        other => return Err(operand_type("bind", "a monad", other)),
    };

    let result = f.call(std::slice::from_ref(inner))?;
    same_family("bind", family, &result)?;
    Ok(result)
}
