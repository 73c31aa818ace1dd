use funcstuff_core::{
    error::{report, Diagnostic, FileId},
    typ::UnknownTypeError,
};

use crate::cli::GlobalOptions;

pub enum Error {
    /// An error raised by the library.
    Core {
        error: funcstuff_core::error::Error,
    },
    Io {
        error: std::io::Error,
    },
    /// A type name given on the command line that doesn't name a built-in type.
    UnknownType {
        error: UnknownTypeError,
    },
}

pub type CliResult<T> = Result<T, Error>;

impl From<funcstuff_core::error::Error> for Error {
    fn from(error: funcstuff_core::error::Error) -> Self {
        Error::Core { error }
    }
}

impl From<funcstuff_core::error::ImportError> for Error {
    fn from(error: funcstuff_core::error::ImportError) -> Self {
        Error::Core {
            error: error.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io { error }
    }
}

impl From<UnknownTypeError> for Error {
    fn from(error: UnknownTypeError) -> Self {
        Error::UnknownType { error }
    }
}

fn unknown_type_diagnostic(error: UnknownTypeError) -> Diagnostic<FileId> {
    let mut notes = vec!["Run `funcstuff instances` to list the built-in types.".to_owned()];
    if let Some(suggestion) = &error.suggestion {
        notes.insert(0, format!("Did you mean `{suggestion}`?"));
    }

    Diagnostic::error()
        .with_message(format!("unknown type `{}`", error.name))
        .with_notes(notes)
}

impl Error {
    pub fn report(self, global: &GlobalOptions) {
        match self {
            Error::Core { error } => {
                report::report(error, global.error_format, global.color_opt())
            }
            Error::UnknownType { error } => {
                report::report(
                    unknown_type_diagnostic(error),
                    global.error_format,
                    global.color_opt(),
                )
            }
            Error::Io { error } => eprintln!("{error}"),
        }
    }
}
