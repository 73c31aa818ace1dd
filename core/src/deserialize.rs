//! Decoding configuration input (JSON, YAML or TOML) into [Value]s.
use std::{fmt, io::Read, path::Path};

use malachite::base::num::basic::floats::PrimitiveFloat;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::{
    error::ImportError,
    identifier::Ident,
    value::{IndexMap, Number, Value},
};

/// Available input formats.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum InputFormat {
    #[default]
    Json,
    Yaml,
    Toml,
}

impl InputFormat {
    /// Guess the format of a file from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<InputFormat> {
        match path.as_ref().extension()?.to_str()? {
            "json" => Some(InputFormat::Json),
            "yaml" | "yml" => Some(InputFormat::Yaml),
            "toml" => Some(InputFormat::Toml),
            _ => None,
        }
    }

    /// Decode `input` in this format.
    pub fn parse(self, input: &str) -> Result<Value, ImportError> {
        let result = match self {
            InputFormat::Json => serde_json::from_str(input).map_err(|err| err.to_string()),
            InputFormat::Yaml => serde_yaml::from_str(input).map_err(|err| err.to_string()),
            InputFormat::Toml => toml::from_str(input).map_err(|err| err.to_string()),
        };

        result.map_err(|message| ImportError::Parse {
            format: self,
            message,
        })
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
            Self::Toml => write!(f, "toml"),
        }
    }
}

/// Read and decode a file. The format is taken from `format` if given, then from the
/// extension of the file, and defaults to JSON.
pub fn from_path(path: &Path, format: Option<InputFormat>) -> Result<Value, ImportError> {
    let input = std::fs::read_to_string(path).map_err(|err| ImportError::Io {
        path: Some(path.to_owned()),
        message: err.to_string(),
    })?;

    let format = format
        .or_else(|| InputFormat::from_path(path))
        .unwrap_or_default();
    log::debug!("reading {} as {format}", path.display());

    format.parse(&input)
}

/// Read and decode a source, such as the standard input.
pub fn from_reader(mut reader: impl Read, format: InputFormat) -> Result<Value, ImportError> {
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .map_err(|err| ImportError::Io {
            path: None,
            message: err.to_string(),
        })?;

    format.parse(&input)
}

/// Convert a float to an exact number. NaN and infinities don't have one.
fn number_from_float<F: PrimitiveFloat, E: de::Error>(float_value: F) -> Result<Number, E>
where
    Number: TryFrom<
        F,
        Error = malachite_q::conversion::from_primitive_float::RationalFromPrimitiveFloatError,
    >,
{
    Number::try_from_float_simplest(float_value).map_err(|_| {
        E::custom(format!(
            "couldn't convert {float_value} to a number: NaN and infinity aren't supported"
        ))
    })
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a configuration value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Value, E> {
        Ok(Value::Num(Number::from(n)))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Value, E> {
        Ok(Value::Num(Number::from(n)))
    }

    fn visit_f64<E: de::Error>(self, n: f64) -> Result<Value, E> {
        number_from_float(n).map(Value::Num)
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::Str(s.to_owned()))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::Str(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut elts = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(elt) = seq.next_element()? {
            elts.push(elt);
        }
        Ok(Value::Array(elts))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut fields = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            fields.insert(Ident::new(key), value);
        }
        Ok(Value::Record(fields))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}
