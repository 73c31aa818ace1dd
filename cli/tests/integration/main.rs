use std::{
    io::Write,
    process::{Command, Stdio},
};

use pretty_assertions::assert_eq;
use tempfile::tempdir;

struct ProcessOutputs {
    status: i32,
    stderr: String,
    stdout: String,
}

fn run(args: &[&str], input: &str) -> ProcessOutputs {
    let funcstuff_bin = env!("CARGO_BIN_EXE_funcstuff");
    let mut funcstuff = Command::new(funcstuff_bin)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("funcstuff should be runnable");

    let mut stdin = funcstuff
        .stdin
        .take()
        .expect("couldn't retrieve stdin handle to funcstuff");
    stdin
        .write_all(input.as_bytes())
        .expect("writing into funcstuff stdin should work");
    drop(stdin);

    let output = funcstuff
        .wait_with_output()
        .expect("couldn't retrieve the output of funcstuff");

    ProcessOutputs {
        status: output.status.code().unwrap_or(-1),
        stderr: String::from_utf8(output.stderr).expect("stderr should be valid utf8"),
        stdout: String::from_utf8(output.stdout).expect("stdout should be valid utf8"),
    }
}

#[test]
fn to_nix_from_stdin_defaults_to_json() {
    let output = run(&["to-nix"], r#"{ "foo": "hello", "bar": [1, true, null] }"#);
    assert_eq!(output.stderr, "");
    assert_eq!(output.status, 0);
    assert_eq!(
        output.stdout,
        "{ \"foo\" = \"hello\"; \"bar\" = [ 1 true null ]; }\n"
    );
}

#[test]
fn to_nix_from_stdin_with_explicit_format() {
    let output = run(&["to-nix", "--format", "yaml"], "foo: hello\nbar: 123");
    assert_eq!(output.stderr, "");
    assert_eq!(output.stdout, "{ \"foo\" = \"hello\"; \"bar\" = 123; }\n");
}

#[test]
fn to_nix_guesses_the_format_from_the_extension() {
    let dir = tempdir().expect("should be able to make a temporary directory");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "ratio = 1.5\n").expect("should be able to write the input file");

    let output = run(&["to-nix", path.to_str().unwrap()], "");
    assert_eq!(output.stderr, "");
    assert_eq!(output.stdout, "{ \"ratio\" = 1.5; }\n");
}

#[test]
fn malformed_input_exits_with_an_error() {
    let output = run(&["to-nix"], "[1, ");
    assert_eq!(output.status, 1);
    assert_eq!(output.stdout, "");
    assert!(output.stderr.contains("json"), "{}", output.stderr);
}

#[test]
fn missing_file_exits_with_an_error() {
    let dir = tempdir().expect("should be able to make a temporary directory");
    let path = dir.path().join("absent.json");

    let output = run(&["to-nix", path.to_str().unwrap()], "");
    assert_eq!(output.status, 1);
    assert!(output.stderr.contains("absent.json"), "{}", output.stderr);
}

#[test]
fn errors_can_be_serialized() {
    let output = run(&["--error-format", "json", "to-nix"], "{");
    assert_eq!(output.status, 1);
    assert!(
        output.stderr.starts_with(r#"{"diagnostics":"#),
        "{}",
        output.stderr
    );
}

#[test]
fn instances_of_one_type() {
    let output = run(&["instances", "integer"], "");
    assert_eq!(output.stderr, "");
    assert_eq!(output.stdout, "Integer: Show, ToNix\n");

    let output = run(&["instances", "Integer", "--own"], "");
    assert_eq!(output.stdout, "Integer: Show\n");
}

#[test]
fn instances_of_every_type() {
    let output = run(&["instances"], "");
    assert_eq!(output.status, 0);
    assert_eq!(output.stdout.lines().count(), 18);
    assert!(output
        .stdout
        .lines()
        .any(|line| line == "Just: Applicative, Eq, Functor, Monad"));
}

#[test]
fn unknown_type_gets_a_suggestion() {
    let output = run(&["instances", "Intger"], "");
    assert_eq!(output.status, 1);
    assert!(
        output.stderr.contains("Did you mean `Integer`?"),
        "{}",
        output.stderr
    );
}

#[test]
fn automatic_color_on_non_tty() {
    let output = run(&["to-nix"], "{");
    for stream in [output.stdout, output.stderr] {
        // prefix of ANSI color escape codes
        assert_eq!(stream.find("\x1b["), None);
    }
}

#[test]
fn completions_are_generated() {
    let output = run(&["gen-completions", "bash"], "");
    assert_eq!(output.status, 0);
    assert!(output.stdout.contains("to-nix"));
}
