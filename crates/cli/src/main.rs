use clap::Parser;
use pwrec_cli::{cli::Cli, logging, output, record};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = record::run(cli).await {
		output::print_error(&err);
		std::process::exit(1);
	}
}
