pub mod accounts;
pub mod init;

use briventory_core::{OrmError, RepositoriesHandler};
use briventory_store::{SqliteContext, StoreConfig};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Open the store at `path`, creating missing tables.
fn open_handler(path: &Path) -> Result<RepositoriesHandler, Box<dyn Error>> {
    ensure_parent(path)?;
    let context = SqliteContext::open(&StoreConfig::file(path))?;
    Ok(RepositoriesHandler::new(Arc::new(context)))
}

/// Spell out validation findings, one message key per line.
fn describe(err: OrmError) -> Box<dyn Error> {
    let findings = err.validation_errors();
    if findings.is_empty() {
        return Box::new(err);
    }
    let mut message = format!("{err} [{}]", err.code());
    for finding in findings {
        message.push_str("\n  - ");
        if let Some(field) = &finding.field {
            message.push_str(field);
            message.push_str(": ");
        }
        message.push_str(&finding.message_key);
        if !finding.arguments.is_empty() {
            message.push_str(&format!(" ({})", finding.arguments.join(", ")));
        }
    }
    message.into()
}
