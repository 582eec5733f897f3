//! Search index for pinorama
//!
//! Records are JSON objects indexed in memory according to a
//! [`pinorama_types::Schema`]. The index supports prefix and fuzzy term
//! search over string properties, `where` filters, sorting, pagination and
//! facet counts, and can be saved to and restored from an NDJSON snapshot.

mod error;
mod fields;
mod index;
mod query;
mod snapshot;

pub use error::IndexError;
pub use index::{LogIndex, DEFAULT_FACET_LIMIT, DEFAULT_LIMIT, MAX_TOLERANCE};
