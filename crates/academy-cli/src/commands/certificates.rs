//! The `academy certificates` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::Table;

pub async fn execute(config: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config.as_deref())?;
    let tracker = super::build_tracker(&config)?;

    let certificates = match tracker.certificates().await {
        Ok(certificates) => certificates,
        Err(e) => {
            // Listing is a convenience; an unreachable server is not fatal.
            println!("Certificates unavailable right now ({e:#}).");
            return Ok(());
        }
    };

    if certificates.is_empty() {
        println!("No certificates issued yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Reference", "Level", "Chapter", "Issued", "Sent"]);
    for cert in &certificates {
        table.add_row(vec![
            cert.reference.clone(),
            cert.level_key.clone(),
            format!("{} — {}", cert.chapter_id, cert.chapter_title),
            cert.issued_at.format("%Y-%m-%d").to_string(),
            cert.sent_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("{table}");

    Ok(())
}
