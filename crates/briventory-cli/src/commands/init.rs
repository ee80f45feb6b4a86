//! Init command
//!
//! Usage: briventory init

use briventory_store::{db, schema, StoreConfig};
use std::path::Path;

/// Execute init command
pub fn execute(db_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    super::ensure_parent(db_path)?;
    let conn = db::open(&StoreConfig::file(db_path))?;
    schema::ensure_schema(&conn)?;

    for table in schema::tables(&conn)? {
        println!("✓ {}", table);
    }
    println!("Store ready at {}", db_path.display());
    Ok(())
}
