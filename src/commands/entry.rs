//! Add and duplicate command handlers.

use crate::args::{AddArgs, DuplicateArgs};
use crate::commands::{attach_backend, finish, Out};
use crate::model::LedgerEntry;
use crate::Config;

/// Adds an entry to the session ledger.
///
/// The product and cost are validated first; on a validation failure nothing
/// changes. The final cost is derived from the cost and the VAT/split flags,
/// and the entry's contribution to the running total is signed by the
/// Add/Subtract mode of this invocation.
///
/// # Returns
///
/// On success, an `Out` containing a summary message and the created entry.
pub async fn add(config: Config, args: AddArgs) -> anyhow::Result<Out<LedgerEntry>> {
    let mut ledger = config.load_ledger().await?;
    attach_backend(&config, &mut ledger);

    let entry = ledger
        .add(
            args.product(),
            args.cost(),
            args.vat(),
            args.split(),
            args.mode(),
        )?
        .clone();

    let message = format!(
        "Added entry {}: '{}' at {} (total {})",
        entry.id(),
        entry.product(),
        entry.final_cost().value(),
        ledger.total().amount(),
    );
    finish(&config, ledger).await?;
    Ok(Out::new(message, entry))
}

/// Duplicates an existing entry: same product, cost and flags; fresh id and
/// timestamp. Fails without effect if the source id is not in the ledger.
pub async fn duplicate(config: Config, args: DuplicateArgs) -> anyhow::Result<Out<LedgerEntry>> {
    let mut ledger = config.load_ledger().await?;
    attach_backend(&config, &mut ledger);

    let entry = ledger.duplicate(args.id(), args.mode())?.clone();

    let message = format!(
        "Duplicated entry {} as {}: '{}' at {} (total {})",
        args.id(),
        entry.id(),
        entry.product(),
        entry.final_cost().value(),
        ledger.total().amount(),
    );
    finish(&config, ledger).await?;
    Ok(Out::new(message, entry))
}
