//! The builtin capabilities and their instances on scalar and collection types.
//!
//! The container instances (`Maybe`, `Either` and `Array` as functors, applicatives and
//! monads) live in [super::containers].
use std::cmp::Ordering;

use malachite::base::{num::conversion::traits::RoundingFrom, rounding_modes::RoundingMode};
use once_cell::sync::Lazy;

use super::{
    containers, function_operand, operands, Capability, Implementation, Operation, Registry,
};
use crate::{
    error::{Error, EvalError, RegistrationError},
    identifier::Ident,
    typ::Type,
    value::{Number, Value},
};

/// Build a builtin capability. The declarations below are fixed and known to be valid.
fn builtin(name: &str, operations: Vec<Operation>) -> Capability {
    Capability::new(name, operations)
        .unwrap_or_else(|err| panic!("invalid builtin capability `{name}`: {err}"))
}

/// Equality. `==` defaults to structural equality.
pub static EQ: Lazy<Capability> = Lazy::new(|| {
    builtin(
        "Eq",
        vec![Operation::method("==").with_default(Implementation::method(|_, recv, args| {
            let [other] = operands::<1>("==", args)?;
            Ok(Value::Bool(recv == other))
        }))],
    )
});

/// Human-readable rendering. `show` defaults to the `Display` rendering of the value.
pub static SHOW: Lazy<Capability> = Lazy::new(|| {
    builtin(
        "Show",
        vec![Operation::method("show").with_default(Implementation::method(|_, recv, args| {
            let [] = operands::<0>("show", args)?;
            Ok(Value::Str(recv.to_string()))
        }))],
    )
});

/// Rendering as a Nix literal.
pub static TO_NIX: Lazy<Capability> =
    Lazy::new(|| builtin("ToNix", vec![Operation::method("to_nix")]));

pub static FUNCTOR: Lazy<Capability> =
    Lazy::new(|| builtin("Functor", vec![Operation::method("fmap")]));

pub static APPLICATIVE: Lazy<Capability> = Lazy::new(|| {
    builtin(
        "Applicative",
        vec![Operation::constructor("pure"), Operation::method("ap")],
    )
});

/// `>>` defaults to binding a continuation that ignores its argument.
pub static MONAD: Lazy<Capability> = Lazy::new(|| {
    builtin(
        "Monad",
        vec![
            Operation::method("bind"),
            Operation::constructor("return"),
            Operation::method(">>").with_default(Implementation::method(|registry, recv, args| {
                let [next] = operands::<1>(">>", args)?;
                let constant = crate::function::Function::constant(next.clone());
                registry.invoke(recv, "bind", &[Value::Func(constant)])
            })),
        ],
    )
});

/// Declare the builtin capabilities in `registry` and register the builtin instances.
pub fn install(registry: &Registry) -> Result<(), RegistrationError> {
    for cap in [&EQ, &SHOW, &TO_NIX, &FUNCTOR, &APPLICATIVE, &MONAD] {
        registry.add_capability(Capability::clone(cap))?;
    }

    registry.derive(Type::Integer, &SHOW)?;
    install_to_nix(registry)?;
    containers::install(registry)?;

    Ok(())
}

fn to_nix_method<F>(render: F) -> Implementation
where
    F: Fn(&Registry, &Value) -> Result<String, Error> + Send + Sync + 'static,
{
    Implementation::method(move |registry, recv, args| {
        let [] = operands::<0>("to_nix", args)?;
        render(registry, recv).map(Value::Str)
    })
}

fn unexpected(expected: &str, got: &Value) -> Error {
    EvalError::OperandType {
        operation: Ident::new("to_nix"),
        expected: expected.to_owned(),
        got: got.type_of(),
    }
    .into()
}

/// Round a non-integer to the nearest float. The rounding saturates at `f64::MAX`, which
/// can't be exact for a non-integer, so hitting it means the number is out of range.
fn rational_to_float(n: &Number) -> Result<f64, Error> {
    let (x, ordering) = f64::rounding_from(n, RoundingMode::Nearest);

    if !x.is_finite() || (x.abs() == f64::MAX && ordering != Ordering::Equal) {
        return Err(EvalError::NumberOutOfRange {
            operation: Ident::new("to_nix"),
            value: n.to_string(),
        }
        .into());
    }

    Ok(x)
}

fn install_to_nix(registry: &Registry) -> Result<(), RegistrationError> {
    let instances: [(Type, Implementation); 9] = [
        (
            Type::Number,
            to_nix_method(|_, value| match value {
                Value::Num(n) => Ok(n.to_string()),
                other => Err(unexpected("a number", other)),
            }),
        ),
        // Nix has no exact fractions.
        (
            Type::Rational,
            to_nix_method(|_, value| match value {
                Value::Num(n) => rational_to_float(n).map(|x| x.to_string()),
                other => Err(unexpected("a number", other)),
            }),
        ),
        (
            Type::String,
            to_nix_method(|_, value| match value {
                Value::Str(s) => Ok(nix_string(s)),
                other => Err(unexpected("a string", other)),
            }),
        ),
        (
            Type::Path,
            to_nix_method(|_, value| match value {
                Value::Path(p) => Ok(nix_path(p)),
                other => Err(unexpected("a path", other)),
            }),
        ),
        (
            Type::Bool,
            to_nix_method(|_, value| match value {
                Value::Bool(b) => Ok(b.to_string()),
                other => Err(unexpected("a boolean", other)),
            }),
        ),
        (Type::Null, to_nix_method(|_, _| Ok(String::from("null")))),
        (
            Type::Array,
            to_nix_method(|registry, value| match value {
                Value::Array(elts) if elts.is_empty() => Ok(String::from("[ ]")),
                Value::Array(elts) => {
                    let rendered = elts
                        .iter()
                        .map(|elt| to_nix(registry, elt))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(format!("[ {} ]", rendered.join(" ")))
                }
                other => Err(unexpected("an array", other)),
            }),
        ),
        (
            Type::Record,
            to_nix_method(|registry, value| match value {
                Value::Record(fields) if fields.is_empty() => Ok(String::from("{ }")),
                Value::Record(fields) => {
                    let mut out = String::from("{ ");
                    for (key, value) in fields {
                        out.push_str(&format!(
                            "{} = {}; ",
                            nix_string(key.label()),
                            to_nix(registry, value)?
                        ));
                    }
                    out.push('}');
                    Ok(out)
                }
                other => Err(unexpected("a record", other)),
            }),
        ),
        // A nullary function producing Nix source directly.
        (
            Type::Function,
            to_nix_method(|_, value| {
                let f = function_operand("to_nix", value)?;
                if f.arity() != 0 {
                    return Err(unexpected("a function without arguments", value));
                }

                match f.call(&[])? {
                    Value::Str(s) => Ok(s),
                    other => Err(unexpected("a function returning a string", &other)),
                }
            }),
        ),
    ];

    for (typ, implementation) in instances {
        registry.register_instance(typ, &TO_NIX, [("to_nix", implementation)])?;
    }

    Ok(())
}

/// Render `value` as a Nix literal through its `ToNix` instance.
pub fn to_nix(registry: &Registry, value: &Value) -> Result<String, Error> {
    match registry.invoke(value, "to_nix", &[])? {
        Value::Str(s) => Ok(s),
        other => Err(unexpected("a string", &other)),
    }
}

/// Quote and escape a string for Nix.
fn nix_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');

    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            // `${` starts an interpolation
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            c => out.push(c),
        }
    }

    out.push('"');
    out
}

/// Nix path literals must contain a slash: relative paths get a `./` prefix.
fn nix_path(p: &std::path::Path) -> String {
    let rendered = p.display().to_string();
    if p.is_absolute() || rendered.starts_with('.') {
        rendered
    } else {
        format!("./{rendered}")
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{function::Function, value::Number};

    fn nix(value: Value) -> String {
        to_nix(Registry::global(), &value).unwrap()
    }

    #[test]
    fn scalars() {
        assert_eq!(nix(Value::from(42)), "42");
        assert_eq!(nix(Value::from(-7)), "-7");
        assert_eq!(nix(Value::Num(Number::from_signeds(1i64, 2i64))), "0.5");
        assert_eq!(nix(Value::Bool(true)), "true");
        assert_eq!(nix(Value::Null), "null");
    }

    #[test]
    fn huge_fractions_are_out_of_range() {
        let huge = (0..400).fold(Number::from(1), |acc, _| acc * Number::from(10))
            + Number::from_signeds(1i64, 2i64);
        assert_matches!(
            to_nix(Registry::global(), &Value::Num(huge)),
            Err(Error::EvalError(EvalError::NumberOutOfRange { .. }))
        );

        let tiny = -Number::from_signeds(1i64, 3i64);
        assert_eq!(nix(Value::Num(tiny)), "-0.3333333333333333");
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(nix(Value::from("plain")), r#""plain""#);
        assert_eq!(
            nix(Value::from("say \"hi\"\n${x} $y \\")),
            r#""say \"hi\"\n\${x} $y \\""#
        );
    }

    #[test]
    fn paths() {
        assert_eq!(nix(Value::Path(PathBuf::from("/etc/nixos"))), "/etc/nixos");
        assert_eq!(nix(Value::Path(PathBuf::from("src/lib.rs"))), "./src/lib.rs");
        assert_eq!(nix(Value::Path(PathBuf::from("../up"))), "../up");
    }

    #[test]
    fn collections() {
        assert_eq!(nix(Value::Array(vec![])), "[ ]");
        assert_eq!(
            nix(Value::Array(vec![Value::from(1), Value::from("a")])),
            r#"[ 1 "a" ]"#
        );
        assert_eq!(nix(Value::record(Vec::<(&str, Value)>::new())), "{ }");
        assert_eq!(
            nix(Value::record([
                ("name", Value::from("x")),
                ("deps", Value::Array(vec![Value::Bool(false)]))
            ])),
            r#"{ "name" = "x"; "deps" = [ false ]; }"#
        );
    }

    #[test]
    fn nullary_function_renders_its_result() {
        let raw = Function::new("raw", 0, |_| Ok(Value::from("pkgs.hello")));
        assert_eq!(nix(Value::Func(raw)), "pkgs.hello");

        let unary = Function::identity();
        assert_matches!(
            to_nix(Registry::global(), &Value::Func(unary)),
            Err(Error::EvalError(EvalError::OperandType { .. }))
        );
    }

    #[test]
    fn no_instance_for_containers() {
        assert_matches!(
            to_nix(Registry::global(), &Value::just(1)),
            Err(Error::EvalError(EvalError::MissingOperation { .. }))
        );
    }

    #[test]
    fn eq_and_show() {
        let registry = Registry::global();
        assert_eq!(
            registry.invoke(&Value::just(1), "==", &[Value::just(1)]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            registry.invoke(&Value::right(1), "==", &[Value::left(1)]),
            Ok(Value::Bool(false))
        );
        assert_eq!(
            registry.invoke(&Value::from(3), "show", &[]),
            Ok(Value::from("3"))
        );
        assert!(!registry.responds_to(Type::Rational, "show"));
    }
}
