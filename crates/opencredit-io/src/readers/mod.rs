//! Loader adapters producing fully materialized record sequences.
//!
//! Both adapters preserve source order and pass duplicates through untouched;
//! deduplication is the join's business.

pub mod csv;
pub mod dbase;
