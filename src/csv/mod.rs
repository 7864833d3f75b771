pub mod export;
pub mod parse;

pub use export::{escape_cell, export_columns, to_csv};
pub use parse::{parse_accounts, read_accounts, CsvError};
