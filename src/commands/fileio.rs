//! Export and import command handlers.

use crate::args::{ExportArgs, ImportArgs};
use crate::commands::{attach_backend, finish, Out};
use crate::{serial, utils, Config};
use anyhow::Context;

/// Exports the session's entries to a text document.
///
/// Nothing is written when the ledger is empty.
pub async fn export(config: Config, args: ExportArgs) -> anyhow::Result<Out<String>> {
    let ledger = config.load_ledger().await?;
    if ledger.is_empty() {
        return Ok("Nothing to export; the ledger is empty".into());
    }
    let document = serial::export(ledger.entries());
    utils::write(args.path(), &document)
        .await
        .context("Unable to write the export document")?;
    let message = format!(
        "Exported {} entr{} to {}",
        ledger.len(),
        if ledger.len() == 1 { "y" } else { "ies" },
        args.path().display(),
    );
    Ok(Out::new(message, document))
}

/// Imports entries from a text document into the session.
///
/// The import is all-or-nothing: a bad header or any malformed record aborts
/// it before a single entry is inserted. Restored entries keep their
/// persisted ids, and their contributions are signed with this invocation's
/// Add/Subtract mode.
pub async fn import(config: Config, args: ImportArgs) -> anyhow::Result<Out<usize>> {
    let document = utils::read(args.path()).await?;
    let mut ledger = config.load_ledger().await?;
    attach_backend(&config, &mut ledger);

    let count = serial::import(&mut ledger, &document, args.mode())?;

    let message = format!(
        "Imported {} entr{} from {} (total {})",
        count,
        if count == 1 { "y" } else { "ies" },
        args.path().display(),
        ledger.total().amount(),
    );
    finish(&config, ledger).await?;
    Ok(Out::new(message, count))
}
