//! Invalid invocations must fail before any browser is started.

use std::process::{Command, Output};

fn pwrec(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_pwrec"))
		.args(args)
		.env("RUST_LOG", "off")
		.env("NO_COLOR", "1")
		.output()
		.expect("failed to execute pwrec")
}

fn stderr(output: &Output) -> String {
	String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn missing_url_is_usage_error() {
	let output = pwrec(&[]);
	assert_eq!(output.status.code(), Some(2));
	assert!(stderr(&output).contains("<URL>"));
}

#[test]
fn scheme_less_url_suggests_https() {
	let output = pwrec(&["example.com"]);
	assert_eq!(output.status.code(), Some(1));
	let err = stderr(&output);
	assert!(err.contains("[CONFIG]"), "stderr was: {err}");
	assert!(err.contains("https://example.com"), "stderr was: {err}");
	assert!(output.stdout.is_empty());
}

#[test]
fn unwritable_output_fails_fast() {
	let temp = tempfile::tempdir().unwrap();
	let output_path = temp.path().join("missing-dir").join("script.js");

	let output = pwrec(&["https://example.com", "-o", output_path.to_str().unwrap()]);
	assert_eq!(output.status.code(), Some(1));
	assert!(stderr(&output).contains("does not exist"));
	assert!(!output_path.exists());
}

#[test]
fn http_ws_endpoint_rejected() {
	let output = pwrec(&["https://example.com", "--ws-endpoint", "http://127.0.0.1:9222"]);
	assert_eq!(output.status.code(), Some(1));
	assert!(stderr(&output).contains("ws://"));
}

#[test]
fn help_lists_recording_flags() {
	let output = pwrec(&["--help"]);
	assert!(output.status.success());
	let help = String::from_utf8_lossy(&output.stdout);
	for flag in ["--output", "--save-dom", "--ws-endpoint", "--capture-scroll", "--runtime-module"] {
		assert!(help.contains(flag), "help is missing {flag}");
	}
}
