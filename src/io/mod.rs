//! Input/output module
//!
//! CSV handling for the replay tool:
//! - `csv_format` - Record structures, conversion to domain operations, and
//!   output serialization. Pure functions, no file I/O.
//! - `reader` - Streaming iterator over operation scripts and the seed
//!   balances loader.

pub mod csv_format;
pub mod reader;

pub use csv_format::{convert_operation_record, write_balances_csv, Operation, OperationRecord};
pub use reader::{read_seed_balances, OperationReader};
