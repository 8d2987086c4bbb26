//! Airport catalog sources.
//!
//! The atmosphere store never reads or writes airport metadata directly; it
//! goes through an [`AirportSource`], which supplies the ordered airport list
//! and accepts the updated list after every catalog mutation.
//!
//! - [`DatFileSource`] reads and writes the comma separated `airports.dat` format
//! - [`MemorySource`] keeps the list in memory (tests, ephemeral deployments)

pub mod dat_file;
pub mod source;

pub use dat_file::{format_line, parse_catalog, DatFileSource};
pub use source::{AirportSource, MemorySource};
