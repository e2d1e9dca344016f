//! The recording command: configure, connect, record, clean up.

use anyhow::Context;
use pwrec::{StopReason, page};

use crate::browser::BrowserHandle;
use crate::cli::Cli;
use crate::config::RecordConfig;
use crate::error::Result;
use crate::output::ScriptSink;

pub async fn run(cli: Cli) -> Result<()> {
	let config = RecordConfig::from_cli(&cli)?;
	let mut sink = ScriptSink::open(config.output.as_deref()).await?;

	let browser = BrowserHandle::open(&config.browser).await?;
	let recorded = record(&browser, &config, &mut sink).await;

	let owned = browser.owns_browser();
	let closed = browser.shutdown().await;
	let flushed = sink.finish().await;

	let reason = recorded?;
	closed?;
	flushed?;

	tracing::info!(?reason, closed_browser = owned, "Done");
	Ok(())
}

async fn record(browser: &BrowserHandle, config: &RecordConfig, sink: &mut ScriptSink) -> Result<StopReason> {
	let session = browser.page().await?;
	tracing::info!(session = session.session_id(), url = %config.url, "Attached to page");

	let events = page::forward(session.events());
	let mut recording = pwrec::start(session, events, config.record_options(), interrupted());

	while let Some(line) = recording.stream.next_line().await {
		sink.write_line(&line).await?;
	}

	let reason = recording.task.await.context("recording task panicked")??;
	Ok(reason)
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn interrupted() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::warn!(error = %e, "Cannot listen for Ctrl-C; close the page to finish");
		std::future::pending::<()>().await;
	}
	tracing::info!("Interrupted, finishing script");
}
