pub mod csv_file;
pub mod sheets;
pub mod traits;

pub use csv_file::CsvSink;
pub use sheets::{GoogleSheetsSink, ServiceAccountKey, SheetsAuth};
pub use traits::RowSink;
