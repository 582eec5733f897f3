//! Shared types for pinorama
//!
//! This crate contains the data structures used across the pinorama crates:
//! the log schema, the introspection document served to the studio, the
//! search request/response model and the query payload builder.

mod introspection;
mod payload;
mod record;
mod schema;
mod search;

pub use introspection::{
    ColumnConfig, CssStyle, FacetKind, Formatter, Introspection, Label, StyleRule,
};
pub use payload::{
    build_payload, create_base_payload, with_cursor, with_search_filters, with_search_text,
};
pub use record::{created_at, lookup, stamp_created_at, value_key};
pub use schema::{Schema, SchemaField, SchemaNode, SchemaType};
pub use search::{
    BulkResponse, Comparison, Elapsed, ErrorBody, FacetRequest, FacetResult, HealthResponse,
    PersistResponse, Predicate, SearchHit, SearchParams, SearchResponse, SortBy, SortOrder,
    WhereClause,
};

// ============================================================================
// Constants
// ============================================================================

/// Property holding the creation time (epoch milliseconds) stamped on every
/// record when it is inserted
pub const CREATED_AT_PROPERTY: &str = "_pinorama.createdAt";

/// Top-level key of the internal metadata object inside a stored record
pub const INTERNAL_KEY: &str = "_pinorama";

/// Result limit used by the studio payload builder
pub const PAYLOAD_LIMIT: usize = 10_000;

/// Header carrying the admin secret
pub const ADMIN_SECRET_HEADER: &str = "x-pinorama-admin-secret";
