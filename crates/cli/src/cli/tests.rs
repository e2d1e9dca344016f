use std::path::PathBuf;

use clap::Parser;

use super::*;

#[test]
fn parse_url_only() {
	let cli = Cli::try_parse_from(["pwrec", "https://example.com"]).unwrap();

	assert_eq!(cli.url, "https://example.com");
	assert_eq!(cli.output, None);
	assert!(!cli.save_dom);
	assert_eq!(cli.port, 9222);
	assert!(!cli.capture_scroll);
	assert_eq!(cli.scroll_settle_ms, 1000);
	assert_eq!(cli.runtime_module, "@puppeteer/recorder");
	assert_eq!(cli.verbose, 0);
}

#[test]
fn parse_all_launch_flags() {
	let cli = Cli::try_parse_from([
		"pwrec",
		"https://example.com",
		"-o",
		"/tmp/script.js",
		"--save-dom",
		"--snapshot-dir",
		"/tmp/snaps",
		"--port",
		"9333",
		"--chrome",
		"/usr/bin/chromium",
		"--user-data-dir",
		"/tmp/profile",
		"--headless",
		"--capture-scroll",
		"--scroll-settle-ms",
		"250",
		"--runtime-module",
		"./runtime.js",
		"-vv",
	])
	.unwrap();

	assert_eq!(cli.output, Some(PathBuf::from("/tmp/script.js")));
	assert!(cli.save_dom);
	assert_eq!(cli.snapshot_dir, Some(PathBuf::from("/tmp/snaps")));
	assert_eq!(cli.port, 9333);
	assert_eq!(cli.chrome, Some(PathBuf::from("/usr/bin/chromium")));
	assert_eq!(cli.user_data_dir, Some(PathBuf::from("/tmp/profile")));
	assert!(cli.headless);
	assert!(cli.capture_scroll);
	assert_eq!(cli.scroll_settle_ms, 250);
	assert_eq!(cli.runtime_module, "./runtime.js");
	assert_eq!(cli.verbose, 2);
}

#[test]
fn parse_ws_endpoint() {
	let cli = Cli::try_parse_from([
		"pwrec",
		"--ws-endpoint",
		"ws://127.0.0.1:9222/devtools/browser/abc",
		"https://example.com",
	])
	.unwrap();

	assert_eq!(cli.ws_endpoint.as_deref(), Some("ws://127.0.0.1:9222/devtools/browser/abc"));
}

#[test]
fn ws_endpoint_conflicts_with_launch_flags() {
	let result = Cli::try_parse_from([
		"pwrec",
		"--ws-endpoint",
		"ws://127.0.0.1:9222/devtools/browser/abc",
		"--headless",
		"https://example.com",
	]);
	assert!(result.is_err());
}

#[test]
fn url_is_required() {
	let err = Cli::try_parse_from(["pwrec"]).unwrap_err();
	assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn zero_settle_rejected() {
	assert!(Cli::try_parse_from(["pwrec", "https://example.com", "--scroll-settle-ms", "0"]).is_err());
}
