#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;

/// Help colors in cargo's style: green bold headers, cyan literals.
fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().bold())
		.usage(AnsiColor::Green.on_default().bold())
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Cyan.on_default())
		.valid(AnsiColor::Cyan.on_default())
}

/// Record interactions with a web page as a replayable script.
///
/// The script is written to stdout as it is recorded. Close the page or press
/// Ctrl-C to finish.
#[derive(Parser, Debug)]
#[command(name = "pwrec")]
#[command(version)]
#[command(styles = cli_styles())]
pub struct Cli {
	/// Page to open and record
	#[arg(value_name = "URL")]
	pub url: String,

	/// Also write the script to FILE
	#[arg(short, long, value_name = "FILE")]
	pub output: Option<PathBuf>,

	/// Save the page's HTML before every recorded click
	#[arg(long)]
	pub save_dom: bool,

	/// Directory for DOM snapshots (default: current directory)
	#[arg(long, value_name = "DIR")]
	pub snapshot_dir: Option<PathBuf>,

	/// Attach to a running browser's DevTools WebSocket instead of launching one
	#[arg(long, value_name = "URL", conflicts_with_all = ["chrome", "user_data_dir", "headless"])]
	pub ws_endpoint: Option<String>,

	/// Remote debugging port for the launched browser
	#[arg(long, default_value_t = 9222)]
	pub port: u16,

	/// Chrome/Chromium executable (default: search common locations)
	#[arg(long, value_name = "PATH")]
	pub chrome: Option<PathBuf>,

	/// Profile directory for the launched browser
	#[arg(long, value_name = "DIR")]
	pub user_data_dir: Option<PathBuf>,

	/// Launch the browser without a window
	#[arg(long)]
	pub headless: bool,

	/// Record scrolls that load more content as scrollToBottom()
	#[arg(long)]
	pub capture_scroll: bool,

	/// How long scrolling must settle before the page height is compared
	#[arg(long, value_name = "MS", default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
	pub scroll_settle_ms: u64,

	/// Module the generated script imports its helpers from
	#[arg(long, value_name = "NAME", default_value = pwrec::DEFAULT_RUNTIME_MODULE)]
	pub runtime_module: String,

	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,
}
