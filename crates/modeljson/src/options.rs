//! Per-call serialization options.

use crate::zone::{SourceZone, default_time_zone};

/// What to emit for a requested attribute the record does not have.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingAttribute {
    /// Emit the requested key with a `null` value.
    #[default]
    Null,
    /// Leave the key out.
    Omit,
}

/// How requested attribute names are matched against the record.
///
/// Either way the key is written exactly as requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttributeCase {
    /// Names must match byte for byte.
    #[default]
    Sensitive,
    /// Names match ignoring ASCII case; an exact match is preferred.
    Insensitive,
}

/// Options for [`ToJson`](crate::ToJson).
///
/// # Example
///
/// ```
/// use modeljson::{JsonOptions, MissingAttribute, Record, SourceZone, ToJson};
///
/// let user = Record::for_table("users")
///     .with("email", "mmonroe@yahoo.com")
///     .with("last_name", "Monroe");
///
/// let json = user.to_json_with(
///     &JsonOptions::new()
///         .pretty()
///         .only(["email", "phone"])
///         .missing(MissingAttribute::Omit)
///         .time_zone(SourceZone::Utc),
/// )?;
/// assert_eq!(json, "{\n  \"email\":\"mmonroe@yahoo.com\"\n}");
/// # Ok::<(), modeljson::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct JsonOptions {
    /// Indent two spaces per level instead of compact output
    pub pretty: bool,
    /// Attribute allow-list in output order; empty means every attribute
    pub attributes: Vec<String>,
    /// Zone naive timestamps were recorded in
    pub time_zone: SourceZone,
    /// Treatment of requested-but-absent attributes
    pub missing: MissingAttribute,
    /// Matching of requested names
    pub case: AttributeCase,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            attributes: Vec::new(),
            time_zone: default_time_zone(),
            missing: MissingAttribute::default(),
            case: AttributeCase::default(),
        }
    }
}

impl JsonOptions {
    /// Compact output, all attributes, default time zone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Compact output.
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    /// Choose the layout from a flag.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Only emit these attributes, in this order.
    ///
    /// Repeated names are kept once, at their first position.
    pub fn only(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.attributes.clear();
        for name in names {
            let name = name.into();
            if !self.attributes.contains(&name) {
                self.attributes.push(name);
            }
        }
        self
    }

    /// Set the zone naive timestamps are converted from.
    pub fn time_zone(mut self, zone: impl Into<SourceZone>) -> Self {
        self.time_zone = zone.into();
        self
    }

    /// Set the treatment of requested-but-absent attributes.
    pub fn missing(mut self, missing: MissingAttribute) -> Self {
        self.missing = missing;
        self
    }

    /// Set how requested names are matched.
    pub fn case(mut self, case: AttributeCase) -> Self {
        self.case = case;
        self
    }

    /// The projection, or `None` when every attribute is emitted.
    pub fn projection(&self) -> Option<&[String]> {
        if self.attributes.is_empty() {
            None
        } else {
            Some(&self.attributes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let options = JsonOptions::new()
            .pretty()
            .only(["email", "last_name", "email"])
            .time_zone(SourceZone::Utc)
            .missing(MissingAttribute::Omit)
            .case(AttributeCase::Insensitive);

        assert!(options.pretty);
        assert_eq!(options.attributes, ["email", "last_name"]);
        assert_eq!(options.time_zone, SourceZone::Utc);
        assert_eq!(options.missing, MissingAttribute::Omit);
        assert_eq!(options.case, AttributeCase::Insensitive);
        assert!(!options.compact().pretty);
    }

    #[test]
    fn empty_projection_means_everything() {
        let options = JsonOptions::new().only(Vec::<String>::new());
        assert!(options.projection().is_none());
        assert_eq!(
            JsonOptions::new().only(["name"]).projection(),
            Some(&["name".to_string()][..])
        );
    }

    #[test]
    fn defaults() {
        let options = JsonOptions::default();
        assert!(!options.pretty);
        assert_eq!(options.missing, MissingAttribute::Null);
        assert_eq!(options.case, AttributeCase::Sensitive);
        assert!(JsonOptions::new().with_pretty(true).pretty);
    }
}
