//! Delete command handler.

use crate::args::DeleteArgs;
use crate::commands::{attach_backend, finish, Out};
use crate::model::LedgerEntry;
use crate::Config;

/// Deletes one or more entries by id.
///
/// Permissive batch semantics: ids that are not present are skipped without
/// error, matching the ledger core. Each removed entry's original delta is
/// reversed off the running total, and a removal is mirrored to the
/// persistence backend when one is configured.
pub async fn delete(config: Config, args: DeleteArgs) -> anyhow::Result<Out<Vec<LedgerEntry>>> {
    let mut ledger = config.load_ledger().await?;
    attach_backend(&config, &mut ledger);

    let removed = ledger.delete(args.ids());

    let count = removed.len();
    let skipped = args.ids().len() - count;
    let mut message = format!(
        "Deleted {} entr{}",
        count,
        if count == 1 { "y" } else { "ies" }
    );
    if skipped > 0 {
        message.push_str(&format!(
            " ({skipped} id{} not found)",
            if skipped == 1 { "" } else { "s" }
        ));
    }
    message.push_str(&format!(" (total {})", ledger.total().amount()));
    finish(&config, ledger).await?;
    Ok(Out::new(message, removed))
}
