//! Error diagnostics reporting and serialization.

use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};

use super::*;

/// Serializable wrapper type to export diagnostics with a top-level attribute.
#[derive(serde::Serialize)]
pub struct DiagnosticsWrapper {
    pub diagnostics: Vec<Diagnostic<FileId>>,
}

impl From<Vec<Diagnostic<FileId>>> for DiagnosticsWrapper {
    fn from(diagnostics: Vec<Diagnostic<FileId>>) -> Self {
        Self { diagnostics }
    }
}

/// Available export formats for error diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ErrorFormat {
    #[default]
    Text,
    Json,
    Yaml,
    Toml,
}

pub type ColorOpt = colorchoice::ColorChoice;

fn colors_for_terminal(color_opt: ColorOpt, is_terminal: bool) -> ColorChoice {
    match color_opt {
        colorchoice::ColorChoice::Auto if is_terminal => ColorChoice::Auto,
        colorchoice::ColorChoice::Auto => ColorChoice::Never,
        colorchoice::ColorChoice::Always => ColorChoice::Always,
        colorchoice::ColorChoice::AlwaysAnsi => ColorChoice::AlwaysAnsi,
        colorchoice::ColorChoice::Never => ColorChoice::Never,
    }
}

/// Pretty-print an error on stderr.
///
/// Errors of this crate don't point into user files, so a fresh file database is used. Call
/// [report_with] to provide your own.
pub fn report<E: IntoDiagnostics>(error: E, format: ErrorFormat, color_opt: ColorOpt) {
    use std::io::{stderr, IsTerminal};

    report_with(
        &mut StandardStream::stderr(colors_for_terminal(color_opt, stderr().is_terminal())).lock(),
        &mut Files::new(),
        error,
        format,
    )
}

/// Report an error on `writer`, provided a file database.
///
/// Serialized formats are written as-is, without colors.
pub fn report_with<E: IntoDiagnostics>(
    writer: &mut dyn WriteColor,
    files: &mut Files<String>,
    error: E,
    format: ErrorFormat,
) {
    let config = codespan_reporting::term::Config::default();
    let diagnostics = error.into_diagnostics(files);

    let result = match format {
        ErrorFormat::Text => diagnostics.iter().try_for_each(|d| {
            codespan_reporting::term::emit(writer, &config, files, d).map_err(|err| err.to_string())
        }),
        ErrorFormat::Json => serde_json::to_string(&DiagnosticsWrapper::from(diagnostics))
            .map_err(|err| err.to_string())
            .and_then(|repr| writeln!(writer, "{repr}").map_err(|err| err.to_string())),
        ErrorFormat::Yaml => serde_yaml::to_string(&DiagnosticsWrapper::from(diagnostics))
            .map_err(|err| err.to_string())
            .and_then(|repr| write!(writer, "{repr}").map_err(|err| err.to_string())),
        ErrorFormat::Toml => toml::to_string(&DiagnosticsWrapper::from(diagnostics))
            .map_err(|err| err.to_string())
            .and_then(|repr| write!(writer, "{repr}").map_err(|err| err.to_string())),
    };

    if let Err(err) = result {
        log::error!("could not print an error report: {err}");
    }
}

#[cfg(test)]
mod tests {
    use codespan_reporting::term::termcolor::NoColor;

    use super::*;
    use crate::typ::Type;

    fn render(format: ErrorFormat) -> String {
        let error = Error::from(EvalError::MissingOperation {
            typ: Type::Maybe,
            operation: Ident::new("fmpa"),
            available: vec![Ident::new("fmap"), Ident::new("bind")],
        });
        let mut out = NoColor::new(Vec::new());
        report_with(&mut out, &mut Files::new(), error, format);
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn text_report_includes_suggestion() {
        let text = render(ErrorFormat::Text);
        assert!(text.contains("no operation `fmpa` for values of type `Maybe`"));
        assert!(text.contains("Did you mean `fmap`?"));
    }

    #[test]
    fn json_report_is_wrapped() {
        let json: serde_json::Value = serde_json::from_str(&render(ErrorFormat::Json)).unwrap();
        let diagnostics = json["diagnostics"].as_array().unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0]["severity"], "Error");
    }
}
