use crate::data::export::{export_file_name, to_csv, ExportError};
use crate::data::loader::{load, LoadError};
use crate::data::model::Table;
use crate::data::transform::{apply, TransformError, Transformation};

// ---------------------------------------------------------------------------
// Session – the single in-memory table of one user session
// ---------------------------------------------------------------------------

/// Holds at most one table and the name of the file it came from.
///
/// Created empty when a user session starts and dropped when it ends. The
/// table is replaced wholesale on upload and by every successful
/// transformation; a failed load or transformation leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct Session {
    table: Option<Table>,
    file_name: Option<String>,
}

/// CSV bytes of the current table plus the name to save them under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn has_data(&self) -> bool {
        self.table.is_some()
    }

    /// Install a freshly loaded table and remember its source file name.
    pub fn set_table(&mut self, table: Table, file_name: impl Into<String>) {
        debug_assert!(table.validate().is_ok(), "table shape invariant violated");
        self.table = Some(table);
        self.file_name = Some(file_name.into());
    }

    /// Swap in a transformed table, keeping the source file name.
    pub fn replace_table(&mut self, table: Table) {
        debug_assert!(table.validate().is_ok(), "table shape invariant violated");
        self.table = Some(table);
    }

    /// Parse an upload and make it the current table.
    pub fn load(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), LoadError> {
        let table = load(file_name, bytes)?;
        log::info!(
            "Loaded {file_name}: {} rows × {} columns {:?}",
            table.n_rows(),
            table.n_cols(),
            table.column_names()
        );
        self.set_table(table, file_name);
        Ok(())
    }

    /// Run one transformation against the current table.
    pub fn apply(&mut self, request: &Transformation) -> Result<(), TransformError> {
        let current = self.table.as_ref().ok_or(TransformError::NoData)?;
        let next = apply(current, request)?;
        log::info!(
            "Applied {request}: {} → {} rows, {} → {} columns",
            current.n_rows(),
            next.n_rows(),
            current.n_cols(),
            next.n_cols()
        );
        self.replace_table(next);
        Ok(())
    }

    /// Serialise the current table for download as `processed_<file name>`.
    pub fn export(&self) -> Result<ExportedFile, ExportError> {
        let table = self.table.as_ref().ok_or(ExportError::NoData)?;
        let original = self.file_name.as_deref().unwrap_or("data.csv");
        Ok(ExportedFile {
            file_name: export_file_name(original),
            bytes: to_csv(table)?,
        })
    }
}
