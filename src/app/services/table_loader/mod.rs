//! Schema-driven OIFITS table loader
//!
//! This module turns the raw binary tables of a FITS container into the
//! OIFITS domain model, validating every keyword and column against the
//! declarative table schemas. Validation findings never abort a load; they
//! are collected in a [`Checker`](crate::app::models::Checker) returned with
//! the loaded file.
//!
//! ## Architecture
//!
//! - [`loader`] - Two-pass orchestration (reference tables, then data tables)
//! - [`keywords`] - Keyword parsing, type inference and accepted values
//! - [`columns`] - Column format and unit checks, conversion and reshaping
//! - [`cross_checks`] - Reference integrity checks between tables
//!
//! ## Usage
//!
//! ```rust,no_run
//! use oifits_processor::app::services::table_loader::OiFitsLoader;
//! use oifits_processor::config::LoaderConfig;
//!
//! # fn example() -> oifits_processor::Result<()> {
//! let loader = OiFitsLoader::new(LoaderConfig::default());
//! let result = loader.load(std::path::Path::new("observation.fits"))?;
//!
//! println!("{} data tables, {}",
//!          result.file.data_tables().len(),
//!          result.checker.summary());
//! # Ok(())
//! # }
//! ```

pub mod columns;
pub mod cross_checks;
pub mod keywords;
pub mod loader;

#[cfg(test)]
pub mod tests;

pub use loader::{LoadResult, OiFitsLoader, load_oifits, resolve_location};
