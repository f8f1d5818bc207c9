//! modeljson - render ORM records as JSON.
//!
//! A [`Record`] arrives here fully materialized: its attributes, the child and
//! parent records the persistence layer already loaded, and any injected
//! entries. Serialization is a single pass over that tree with no I/O besides
//! the output writer.
//!
//! # Quick Start
//!
//! ```
//! use modeljson::{Record, ToJson};
//!
//! let mut user = Record::for_table("users")
//!     .with("email", "mmonroe@yahoo.com")
//!     .with("last_name", "Monroe");
//! user.add_child(Record::for_table("addresses").with("city", "Springfield"));
//!
//! let json = user.to_json(true, &["email", "last_name"]).unwrap();
//! assert_eq!(
//!     json,
//!     "{\n  \"email\":\"mmonroe@yahoo.com\",\n  \"last_name\":\"Monroe\",\n  \"children\":{\n    \"addresses\":[\n      {\n        \"city\":\"Springfield\"\n      }\n    ]\n  }\n}"
//! );
//! ```
//!
//! # Output shape
//!
//! - attributes, in projection order or natural order
//! - `"children"`: has-many associations, one array per association name
//! - `"parents"`: belongs-to associations, one array per association name
//! - `"injected"`: entries not backed by a column
//!
//! Categories with nothing attached are left out. Related records always
//! render every attribute; the projection applies to the top level only.

use std::io;

pub mod format;
pub mod options;
pub mod sanitize;
mod ser;
pub mod zone;

pub use modeljson_core::{
    Association, AssociationKind, ConfigError, Error, Record, RecordCollection, RelationshipKind,
    Result, TypeError, Value,
};
pub use options::{AttributeCase, JsonOptions, MissingAttribute};
pub use ser::INJECTED_KEY;
pub use zone::{SourceZone, default_time_zone, set_default_time_zone};

use ser::{RecordView, RecordsView, write_view};

/// Types that render as a JSON document.
pub trait ToJson {
    /// Write the JSON document to `writer`.
    fn write_json<W: io::Write>(&self, writer: W, options: &JsonOptions) -> Result<()>;

    /// Render to a string with full options.
    fn to_json_with(&self, options: &JsonOptions) -> Result<String> {
        let mut buf = Vec::new();
        self.write_json(&mut buf, options)?;
        String::from_utf8(buf).map_err(|e| Error::Serde(e.to_string()))
    }

    /// Render to a string, optionally indented, keeping only `attributes`
    /// (all of them when empty).
    fn to_json(&self, pretty: bool, attributes: &[&str]) -> Result<String> {
        self.to_json_with(
            &JsonOptions::new()
                .with_pretty(pretty)
                .only(attributes.iter().copied()),
        )
    }
}

impl ToJson for Record {
    fn write_json<W: io::Write>(&self, writer: W, options: &JsonOptions) -> Result<()> {
        tracing::trace!(
            table = self.table().unwrap_or_default(),
            attributes = self.len(),
            associations = self.associations().len(),
            pretty = options.pretty,
            "Serializing record"
        );
        write_view(writer, &RecordView::top_level(self, options), options)
    }
}

impl ToJson for [Record] {
    fn write_json<W: io::Write>(&self, writer: W, options: &JsonOptions) -> Result<()> {
        tracing::trace!(
            count = self.len(),
            pretty = options.pretty,
            "Serializing record list"
        );
        let view = RecordsView {
            records: self,
            options,
            top_level: true,
        };
        write_view(writer, &view, options)
    }
}

impl ToJson for RecordCollection {
    fn write_json<W: io::Write>(&self, writer: W, options: &JsonOptions) -> Result<()> {
        self.as_slice().write_json(writer, options)
    }
}

/// Render `target` to a string; see [`ToJson::to_json`].
#[tracing::instrument(level = "trace", skip_all, fields(pretty = pretty))]
pub fn to_json<T: ToJson + ?Sized>(target: &T, pretty: bool, attributes: &[&str]) -> Result<String> {
    target.to_json(pretty, attributes)
}
