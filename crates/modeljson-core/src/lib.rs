//! Core types for modeljson.
//!
//! This crate holds the data the serializer consumes:
//!
//! - `Value`, a closed set of attribute value types
//! - `Record`, an ordered attribute bag with pre-resolved associations and
//!   injected entries
//! - `RecordCollection`, an ordered list of records
//! - `Error` and `Result`

pub mod association;
pub mod collection;
pub mod error;
pub mod record;
pub mod value;

pub use association::{Association, AssociationKind, RelationshipKind};
pub use collection::RecordCollection;
pub use error::{ConfigError, Error, Result, TypeError};
pub use record::{Record, UNNAMED_ASSOCIATION};
pub use value::Value;
