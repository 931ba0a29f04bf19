//! The `academy sync` command.

use std::path::PathBuf;

use anyhow::Result;

pub async fn execute(config: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config.as_deref())?;
    let mut tracker = super::build_tracker(&config)?;

    let summary = tracker.reconcile().await;
    println!(
        "Reconciled: {} merged from server, {} backfilled, {} deferred.",
        summary.merged, summary.backfilled, summary.deferred
    );
    if summary.deferred > 0 {
        println!("Run `academy sync` again to push the deferred entries.");
    }

    Ok(())
}
