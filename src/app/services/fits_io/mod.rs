//! FITS container reading and writing
//!
//! This module decodes a FITS byte stream into raw binary tables and encodes
//! raw tables back into a valid container. It knows nothing about OIFITS;
//! schema interpretation happens in the table loader.
//!
//! # Supported structure
//!
//! - 2880-byte logical records, 80-character header cards
//! - Primary HDU of any shape (skipped, only its size is honoured)
//! - `BINTABLE` extensions with big-endian fixed-width columns
//! - Any other extension type is skipped by size
//!
//! Variable-length (`P`, `Q`) and bit (`X`) columns are sized correctly but
//! decoded as [`RawData::Unsupported`].

pub mod header;
pub mod reader;
pub mod tform;
pub mod writer;

pub use header::{CardValue, Header, HeaderCard};
pub use reader::{RawColumn, RawData, RawTable, read_file, read_from_bytes};
pub use tform::{ColumnFormat, TypeCode, parse_tform};
pub use writer::{BinTableBuilder, to_bytes, write_tables};

#[cfg(test)]
pub mod tests;
