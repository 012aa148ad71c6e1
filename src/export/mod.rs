//! Backup and CSV export/import.

pub mod backup;
pub mod csv;

pub use backup::{export_backup, import_backup};
pub use csv::leads_to_csv;
