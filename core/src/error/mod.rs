//! Error types and error reporting.
//!
//! Errors are grouped by the phase that produces them:
//!
//! - [RegistrationError]: declaring capabilities, registering instances and building
//!   constraints. These happen at start-up and are fatal by convention.
//! - [CallError]: a checked function rejected a call because of its arity, the type of an
//!   argument or the type of its result.
//! - [EvalError]: dispatching an operation or running a sequencing block went wrong, for
//!   example a `bind` continuation returned a value of another container family.
//! - [ImportError]: decoding configuration input into values.
//!
//! Each of them can be turned into [codespan](https://crates.io/crates/codespan-reporting)
//! diagnostics through [IntoDiagnostics], and printed with [report::report].
pub use codespan::{FileId, Files};
pub use codespan_reporting::diagnostic::{Diagnostic, Label, LabelStyle};

use std::{fmt, path::PathBuf};

use crate::{
    deserialize::InputFormat,
    identifier::Ident,
    typ::Type,
    typed::{Signature, Slot},
};

pub mod report;
pub mod suggest;

/// A general error, of any phase.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    RegistrationError(#[from] RegistrationError),
    #[error(transparent)]
    CallError(#[from] CallError),
    #[error(transparent)]
    EvalError(#[from] EvalError),
    #[error(transparent)]
    ImportError(#[from] ImportError),
}

impl Error {
    /// A free-form failure, mostly useful for user-supplied function bodies.
    pub fn other(msg: impl Into<String>) -> Self {
        Error::EvalError(EvalError::Other(msg.into()))
    }
}

/// Render a list of names as `a, b, c`.
fn join(names: &[Ident]) -> String {
    names
        .iter()
        .map(|name| format!("`{name}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why an implementation couldn't be bound to an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnbindableReason {
    /// The operation is a method, but the implementation has no way to receive the value it's
    /// called on.
    NoReceiver,
    /// The operation is type-level, but the implementation expects a receiver.
    UnexpectedReceiver,
}

impl fmt::Display for UnbindableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnbindableReason::NoReceiver => {
                write!(f, "the operation is a method but the implementation takes no receiver")
            }
            UnbindableReason::UnexpectedReceiver => write!(
                f,
                "the operation is type-level but the implementation expects a receiver"
            ),
        }
    }
}

/// An error occurring while declaring a capability, registering an instance or building a
/// constraint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistrationError {
    #[error("capability `{capability}` declares operation `{operation}` more than once")]
    DuplicateOperation { capability: Ident, operation: Ident },
    #[error("a capability named `{name}` is already declared")]
    DuplicateCapability { name: Ident },
    #[error(
        "instance of `{capability}` for `{typ}` is missing required operations: {}",
        join(.missing)
    )]
    MissingOperations {
        capability: Ident,
        typ: Type,
        missing: Vec<Ident>,
        required: Vec<Ident>,
        supplied: Vec<Ident>,
    },
    #[error(
        "instance of `{capability}` for `{typ}` implements operations the capability doesn't define: {}",
        join(.unexpected)
    )]
    UnexpectedOperations {
        capability: Ident,
        typ: Type,
        unexpected: Vec<Ident>,
        defined: Vec<Ident>,
    },
    #[error("cannot bind the implementation of `{capability}.{operation}` for `{typ}`: {reason}")]
    Unbindable {
        capability: Ident,
        typ: Type,
        operation: Ident,
        reason: UnbindableReason,
    },
    #[error(
        "capability `{capability}` can't be derived for `{typ}`: {} have no default",
        join(.required)
    )]
    NotDerivable {
        capability: Ident,
        typ: Type,
        required: Vec<Ident>,
    },
    #[error("`{name}` is not a declared capability")]
    UnknownCapability { name: String, known: Vec<Ident> },
    #[error("a constraint needs at least one capability")]
    EmptyConstraint,
}

/// Expected argument count of a checked call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedArity {
    Exactly(usize),
    AtMost(usize),
}

impl fmt::Display for ExpectedArity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedArity::Exactly(n) => write!(f, "{n}"),
            ExpectedArity::AtMost(n) => write!(f, "at most {n}"),
        }
    }
}

/// A checked function rejected a call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    #[error("wrong number of arguments to `{function}`: expected {expected}, got {got}")]
    Arity {
        function: Ident,
        signature: Signature,
        expected: ExpectedArity,
        got: usize,
    },
    #[error(
        "argument type mismatch in `{function}`: argument {} expected {expected}, got `{got}`",
        .position + 1
    )]
    ArgumentType {
        function: Ident,
        signature: Signature,
        /// Index of the offending argument in the signature.
        position: usize,
        expected: Slot,
        got: Type,
    },
    #[error("return value type mismatch in `{function}`: expected {expected}, got `{got}`")]
    ReturnType {
        function: Ident,
        signature: Signature,
        expected: Slot,
        got: Type,
    },
}

impl CallError {
    pub fn function(&self) -> Ident {
        match self {
            CallError::Arity { function, .. }
            | CallError::ArgumentType { function, .. }
            | CallError::ReturnType { function, .. } => *function,
        }
    }
}

/// The step of a sequencing block that produced a non-monadic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStep {
    /// A value passed to the bind operator.
    Bound,
    /// The value returned by the block.
    Returned,
}

impl fmt::Display for SequenceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceStep::Bound => write!(f, "value bound in a sequencing block"),
            SequenceStep::Returned => write!(f, "value returned by a sequencing block"),
        }
    }
}

/// An error occurring while dispatching an operation or evaluating a function.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("no operation `{operation}` for values of type `{typ}`")]
    MissingOperation {
        typ: Type,
        operation: Ident,
        /// Operations available on `typ`, used for suggestions.
        available: Vec<Ident>,
    },
    #[error("`{operation}` is a method of `{typ}` and needs a value to be called on")]
    MissingReceiver { typ: Type, operation: Ident },
    #[error("`{operation}` expected a result of the `{expected}` family, got `{got}`")]
    FamilyMismatch {
        operation: Ident,
        expected: Type,
        got: Type,
    },
    #[error("`{operation}` expected {expected}, got `{got}`")]
    OperandType {
        operation: Ident,
        expected: String,
        got: Type,
    },
    #[error("`{function}` takes {expected} argument(s), got {got}")]
    Arity {
        function: Ident,
        expected: usize,
        got: usize,
    },
    #[error("only functions of arity 1 can be composed, `{function}` has arity {arity}")]
    NotComposable { function: Ident, arity: usize },
    #[error("`{operation}` can't represent {value} without losing precision")]
    NumberOutOfRange { operation: Ident, value: String },
    #[error("{step} is not a monad: got `{got}`")]
    NotAMonad { step: SequenceStep, got: Type },
    #[error("{0}")]
    Other(String),
}

/// An error occurring while reading configuration input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImportError {
    #[error("could not read {}: {message}", display_source(.path))]
    Io {
        path: Option<PathBuf>,
        message: String,
    },
    #[error("invalid {format} input: {message}")]
    Parse { format: InputFormat, message: String },
}

fn display_source(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => String::from("<stdin>"),
    }
}

/// A trait for converting an error to a diagnostic.
pub trait IntoDiagnostics {
    /// Convert an error to a list of printable formatted diagnostics.
    ///
    /// # Arguments
    ///
    /// - `files`: the file database used for reporting. Errors without a source location, such
    ///   as a rejected call, add the text they want to point at (e.g. the signature of the
    ///   function) as a new file in the database and label it.
    fn into_diagnostics(self, files: &mut Files<String>) -> Vec<Diagnostic<FileId>>;
}

// Allow the use of a single `Diagnostic` directly as an error that can be reported.
impl IntoDiagnostics for Diagnostic<FileId> {
    fn into_diagnostics(self, _files: &mut Files<String>) -> Vec<Diagnostic<FileId>> {
        vec![self]
    }
}

impl IntoDiagnostics for Error {
    fn into_diagnostics(self, files: &mut Files<String>) -> Vec<Diagnostic<FileId>> {
        match self {
            Error::RegistrationError(err) => err.into_diagnostics(files),
            Error::CallError(err) => err.into_diagnostics(files),
            Error::EvalError(err) => err.into_diagnostics(files),
            Error::ImportError(err) => err.into_diagnostics(files),
        }
    }
}

fn labels(names: &[Ident]) -> Vec<&'static str> {
    names.iter().map(|name| name.label()).collect()
}

impl IntoDiagnostics for RegistrationError {
    fn into_diagnostics(self, _files: &mut Files<String>) -> Vec<Diagnostic<FileId>> {
        let message = self.to_string();
        let mut notes = Vec::new();

        match self {
            RegistrationError::MissingOperations {
                required, supplied, ..
            } => {
                notes.push(format!("required: [{}]", join(&required)));
                notes.push(format!("implemented: [{}]", join(&supplied)));
            }
            RegistrationError::UnexpectedOperations {
                unexpected,
                defined,
                ..
            } => {
                notes.push(format!("operations of the capability: [{}]", join(&defined)));
                for op in &unexpected {
                    suggest::add_suggestion(&mut notes, &labels(&defined), op);
                }
            }
            RegistrationError::Unbindable { .. } => {
                notes.push(String::from(
                    "Methods must be implemented with `Implementation::method`, which receives \
                    the value the operation is called on",
                ));
            }
            RegistrationError::NotDerivable { capability, .. } => {
                notes.push(format!(
                    "Register the instance with `register_instance` and implement the required \
                    operations of `{capability}`"
                ));
            }
            RegistrationError::UnknownCapability { name, known } => {
                suggest::add_suggestion(&mut notes, &labels(&known), &name);
            }
            RegistrationError::DuplicateOperation { .. }
            | RegistrationError::DuplicateCapability { .. }
            | RegistrationError::EmptyConstraint => (),
        }

        vec![Diagnostic::error()
            .with_message(message)
            .with_notes(notes)]
    }
}

/// Add the rendering of a signature to the file database and return a label pointing at one of
/// its slots.
fn signature_label(
    files: &mut Files<String>,
    function: Ident,
    signature: &Signature,
    slot: usize,
    message: String,
) -> Label<FileId> {
    let (text, spans) = signature.render_with_spans();
    let span = spans.get(slot).cloned().unwrap_or(0..text.len());
    let file_id = files.add(format!("<signature of {function}>"), text);
    Label::primary(file_id, span).with_message(message)
}

impl IntoDiagnostics for CallError {
    fn into_diagnostics(self, files: &mut Files<String>) -> Vec<Diagnostic<FileId>> {
        let message = self.to_string();

        let diagnostic = match self {
            CallError::Arity {
                function,
                signature,
                expected,
                got,
            } => {
                let (text, _) = signature.render_with_spans();
                let len = text.len();
                let file_id = files.add(format!("<signature of {function}>"), text);
                Diagnostic::error()
                    .with_message(message)
                    .with_labels(vec![Label::primary(file_id, 0..len)
                        .with_message(format!("expected {expected} argument(s), got {got}"))])
            }
            CallError::ArgumentType {
                function,
                signature,
                position,
                expected,
                got,
            } => {
                let label = signature_label(
                    files,
                    function,
                    &signature,
                    position,
                    format!("expected {expected}"),
                );
                Diagnostic::error()
                    .with_message(message)
                    .with_labels(vec![label])
                    .with_notes(vec![format!("the argument has type `{got}`")])
            }
            CallError::ReturnType {
                function,
                signature,
                expected,
                got,
            } => {
                let position = signature.arity();
                let label = signature_label(
                    files,
                    function,
                    &signature,
                    position,
                    format!("expected {expected}"),
                );
                Diagnostic::error()
                    .with_message(message)
                    .with_labels(vec![label])
                    .with_notes(vec![
                        format!("the function returned a value of type `{got}`"),
                        String::from(
                            "The arguments were valid: the function body doesn't respect its \
                            own signature",
                        ),
                    ])
            }
        };

        vec![diagnostic]
    }
}

impl IntoDiagnostics for EvalError {
    fn into_diagnostics(self, _files: &mut Files<String>) -> Vec<Diagnostic<FileId>> {
        let message = self.to_string();
        let mut notes = Vec::new();

        match self {
            EvalError::MissingOperation {
                typ,
                operation,
                available,
            } => {
                suggest::add_suggestion(&mut notes, &labels(&available), &operation);
                notes.push(format!(
                    "No capability registered for `{typ}` or its parent types defines \
                    `{operation}`"
                ));
            }
            EvalError::FamilyMismatch { operation, .. } => {
                notes.push(format!(
                    "The continuation passed to `{operation}` must return a value of the same \
                    container family as the receiver"
                ));
            }
            EvalError::NotAMonad { step, .. } => {
                if step == SequenceStep::Returned {
                    notes.push(String::from(
                        "The last value of a sequencing block must be wrapped, e.g. with \
                        `pure`/`return`",
                    ));
                }
            }
            EvalError::NumberOutOfRange { .. } => {
                notes.push(String::from(
                    "Non-integer numbers are exported as 64-bit floats",
                ));
            }
            EvalError::MissingReceiver { .. }
            | EvalError::OperandType { .. }
            | EvalError::Arity { .. }
            | EvalError::NotComposable { .. }
            | EvalError::Other(_) => (),
        }

        vec![Diagnostic::error()
            .with_message(message)
            .with_notes(notes)]
    }
}

impl IntoDiagnostics for ImportError {
    fn into_diagnostics(self, _files: &mut Files<String>) -> Vec<Diagnostic<FileId>> {
        vec![Diagnostic::error().with_message(self.to_string())]
    }
}
