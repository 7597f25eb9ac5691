//! Read-only commands: listing the session's entries and showing the total.

use crate::commands::Out;
use crate::model::LedgerEntry;
use crate::Config;
use serde::{Deserialize, Serialize};

/// The structured result of the `total` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TotalOut {
    /// The display-formatted signed total, e.g. `-£1,234.50`.
    pub formatted: String,
    /// Whether the total is below zero. Presentation (e.g. coloring) is up
    /// to the caller.
    pub is_negative: bool,
}

/// Lists the session's entries in insertion order.
pub async fn list(config: Config) -> anyhow::Result<Out<Vec<LedgerEntry>>> {
    let ledger = config.load_ledger().await?;
    if ledger.is_empty() {
        return Ok(Out::new("The ledger is empty".to_string(), Vec::new()));
    }
    let mut message = format!(
        "{} entr{} (total {}):",
        ledger.len(),
        if ledger.len() == 1 { "y" } else { "ies" },
        ledger.total().amount(),
    );
    for entry in ledger.entries() {
        message.push_str(&format!(
            "\n  {}  {}  {}",
            entry.id(),
            entry.product(),
            entry.final_cost().value(),
        ));
    }
    Ok(Out::new(message, ledger.entries().to_vec()))
}

/// Shows the signed running total of the session.
pub async fn total(config: Config) -> anyhow::Result<Out<TotalOut>> {
    let ledger = config.load_ledger().await?;
    let total = ledger.total();
    let formatted = total.amount().to_string();
    let message = format!("Running total: {formatted}");
    Ok(Out::new(
        message,
        TotalOut {
            formatted,
            is_negative: total.is_negative(),
        },
    ))
}
