//! Row store layer (Google Sheets).

pub mod memory;
pub mod sheets;

pub use memory::InMemorySheet;
pub use sheets::GoogleSheetsGateway;

use crate::error::StorageError;
use crate::models::Record;
use async_trait::async_trait;

/// Full worksheet contents at read time, header row first.
pub type RowSnapshot = Vec<Vec<String>>;

/// Append-only and read-all access to the remote row store.
///
/// Implementations own timeouts and any retry policy.
#[async_trait]
pub trait SheetGateway: Send + Sync {
    /// Append one record as a new row.
    async fn append_row(&self, record: &Record) -> Result<(), StorageError>;

    /// Fetch every row, uncached.
    async fn get_all_rows(&self) -> Result<RowSnapshot, StorageError>;
}
