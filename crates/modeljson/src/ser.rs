//! `serde::Serialize` views over records.
//!
//! Nothing here copies or mutates the record: each view borrows its part of
//! the tree and the options, and `serde_json` drives the walk. Key order is
//! attributes, then `children`, then `parents`, then `injected`.

use std::fmt::Write as _;
use std::io;

use chrono::{NaiveDateTime, Timelike};
use modeljson_core::{AssociationKind, Record, Result, Value};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;
use serde_json::value::RawValue;

use crate::format::JsonFormatter;
use crate::options::{AttributeCase, JsonOptions, MissingAttribute};
use crate::sanitize::sanitize_bytes;
use crate::zone::SourceZone;

/// Reserved key for injected entries.
pub const INJECTED_KEY: &str = "injected";

/// Serialize `view` to `writer` with the layout chosen in `options`.
pub(crate) fn write_view<W, T>(writer: W, view: &T, options: &JsonOptions) -> Result<()>
where
    W: io::Write,
    T: Serialize + ?Sized,
{
    let mut ser = serde_json::Serializer::with_formatter(writer, JsonFormatter::new(options.pretty));
    view.serialize(&mut ser)?;
    Ok(())
}

/// One record. `projection` is only set for top-level records.
pub(crate) struct RecordView<'a> {
    pub record: &'a Record,
    pub options: &'a JsonOptions,
    pub projection: Option<&'a [String]>,
}

impl<'a> RecordView<'a> {
    pub(crate) fn top_level(record: &'a Record, options: &'a JsonOptions) -> Self {
        Self {
            record,
            options,
            projection: options.projection(),
        }
    }

    fn nested(record: &'a Record, options: &'a JsonOptions) -> Self {
        Self {
            record,
            options,
            projection: None,
        }
    }

    fn lookup(&self, name: &str) -> Option<&'a Value> {
        match self.options.case {
            AttributeCase::Sensitive => self.record.get(name),
            AttributeCase::Insensitive => self.record.get_ignore_case(name),
        }
    }
}

impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let zone = self.options.time_zone;
        let mut map = serializer.serialize_map(None)?;

        match self.projection {
            Some(names) => {
                for name in names {
                    match self.lookup(name) {
                        Some(value) => map.serialize_entry(name, &ValueView { value, zone })?,
                        None if self.options.missing == MissingAttribute::Null => {
                            map.serialize_entry(name, &())?;
                        }
                        None => {}
                    }
                }
            }
            None => {
                for (name, value) in self.record.attributes() {
                    map.serialize_entry(name, &ValueView { value, zone })?;
                }
            }
        }

        for kind in [AssociationKind::Children, AssociationKind::Parents] {
            if self.record.has_associations(kind) {
                map.serialize_entry(
                    kind.key(),
                    &AssociationsView {
                        record: self.record,
                        kind,
                        options: self.options,
                    },
                )?;
            }
        }

        if self.record.has_injected() {
            map.serialize_entry(
                INJECTED_KEY,
                &InjectedView {
                    record: self.record,
                    zone,
                },
            )?;
        }

        map.end()
    }
}

/// An array of records.
pub(crate) struct RecordsView<'a> {
    pub records: &'a [Record],
    pub options: &'a JsonOptions,
    pub top_level: bool,
}

impl Serialize for RecordsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for record in self.records {
            let view = if self.top_level {
                RecordView::top_level(record, self.options)
            } else {
                RecordView::nested(record, self.options)
            };
            seq.serialize_element(&view)?;
        }
        seq.end()
    }
}

/// The `children` or `parents` object of one record.
struct AssociationsView<'a> {
    record: &'a Record,
    kind: AssociationKind,
    options: &'a JsonOptions,
}

impl Serialize for AssociationsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for association in self.record.associations_of(self.kind) {
            map.serialize_entry(
                association.name(),
                &RecordsView {
                    records: association.records(),
                    options: self.options,
                    top_level: false,
                },
            )?;
        }
        map.end()
    }
}

struct InjectedView<'a> {
    record: &'a Record,
    zone: SourceZone,
}

impl Serialize for InjectedView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in self.record.injected() {
            map.serialize_entry(
                key,
                &ValueView {
                    value,
                    zone: self.zone,
                },
            )?;
        }
        map.end()
    }
}

/// A single attribute value.
struct ValueView<'a> {
    value: &'a Value,
    zone: SourceZone,
}

impl Serialize for ValueView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.value {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::TinyInt(i) => serializer.serialize_i8(*i),
            Value::SmallInt(i) => serializer.serialize_i16(*i),
            Value::Int(i) => serializer.serialize_i32(*i),
            Value::BigInt(i) => serializer.serialize_i64(*i),
            // serde_json writes non-finite floats as null
            Value::Float(f) => serializer.serialize_f32(*f),
            Value::Double(f) => serializer.serialize_f64(*f),
            Value::Decimal(s) => match decimal_literal(s) {
                Some(raw) => raw.serialize(serializer),
                None => serializer.serialize_str(s),
            },
            Value::Text(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_str(&sanitize_bytes(b)),
            Value::Date(days) => match self.value.as_naive_date() {
                Some(date) => serializer.collect_str(&date.format("%Y-%m-%d")),
                None => out_of_range(serializer, self.value, i64::from(*days)),
            },
            Value::Time(micros) => match self.value.as_naive_time() {
                Some(time) => {
                    let mut out = time.format("%H:%M:%S").to_string();
                    push_fraction(&mut out, time.nanosecond());
                    serializer.serialize_str(&out)
                }
                None => out_of_range(serializer, self.value, *micros),
            },
            Value::Timestamp(micros) => match self.value.as_naive_datetime() {
                Some(local) => serializer.serialize_str(&format_datetime(self.zone.to_utc(local))),
                None => out_of_range(serializer, self.value, *micros),
            },
            Value::TimestampTz(micros) => match self.value.as_naive_datetime() {
                Some(utc) => serializer.serialize_str(&format_datetime(utc)),
                None => out_of_range(serializer, self.value, *micros),
            },
            Value::Uuid(bytes) => serializer.serialize_str(&format_uuid(bytes)),
            Value::Json(json) => json.serialize(serializer),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for value in items {
                    seq.serialize_element(&ValueView {
                        value,
                        zone: self.zone,
                    })?;
                }
                seq.end()
            }
        }
    }
}

/// The decimal text as a JSON number literal, digits kept verbatim.
///
/// `None` when the text is not a JSON number (`NaN`, `1,5`, overflow).
fn decimal_literal(text: &str) -> Option<Box<RawValue>> {
    let text = text.trim();
    serde_json::from_str::<serde_json::Number>(text).ok()?;
    RawValue::from_string(text.to_owned()).ok()
}

fn out_of_range<S: Serializer>(
    serializer: S,
    value: &Value,
    raw: i64,
) -> std::result::Result<S::Ok, S::Error> {
    tracing::warn!(
        kind = value.type_name(),
        raw,
        "Temporal value outside the representable range; writing raw number"
    );
    serializer.serialize_i64(raw)
}

/// `YYYY-MM-DDTHH:MM:SS`, plus a fraction when there is one.
pub(crate) fn format_datetime(utc: NaiveDateTime) -> String {
    let mut out = utc.format("%Y-%m-%dT%H:%M:%S").to_string();
    push_fraction(&mut out, utc.nanosecond());
    out
}

/// Milliseconds when the value is a whole number of them, else microseconds.
fn push_fraction(out: &mut String, nanos: u32) {
    let micros = nanos / 1_000;
    if micros == 0 {
        return;
    }
    let _ = if micros % 1_000 == 0 {
        write!(out, ".{:03}", micros / 1_000)
    } else {
        write!(out, ".{:06}", micros)
    };
}

/// Lowercase hyphenated form, `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`.
fn format_uuid(bytes: &[u8; 16]) -> String {
    let mut out = String::with_capacity(36);
    for (i, byte) in bytes.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn render(value: Value, zone: SourceZone) -> String {
        serde_json::to_string(&ValueView {
            value: &value,
            zone,
        })
        .unwrap()
    }

    #[test]
    fn scalars() {
        assert_eq!(render(Value::Null, SourceZone::Utc), "null");
        assert_eq!(render(Value::Bool(false), SourceZone::Utc), "false");
        assert_eq!(render(Value::BigInt(-7), SourceZone::Utc), "-7");
        assert_eq!(render(Value::Double(2.5), SourceZone::Utc), "2.5");
        assert_eq!(render(Value::Double(f64::NAN), SourceZone::Utc), "null");
        assert_eq!(render(Value::Float(f32::INFINITY), SourceZone::Utc), "null");
    }

    #[test]
    fn decimals_are_numbers_when_they_parse() {
        assert_eq!(render(Value::Decimal("19.99".into()), SourceZone::Utc), "19.99");
        assert_eq!(render(Value::Decimal("42".into()), SourceZone::Utc), "42");
        assert_eq!(render(Value::Decimal("NaN".into()), SourceZone::Utc), "\"NaN\"");
        assert_eq!(render(Value::Decimal("1,5".into()), SourceZone::Utc), "\"1,5\"");
    }

    #[test]
    fn decimals_keep_every_digit() {
        assert_eq!(
            render(Value::Decimal("12345678901234567890.12".into()), SourceZone::Utc),
            "12345678901234567890.12"
        );
        assert_eq!(render(Value::Decimal("0.10".into()), SourceZone::Utc), "0.10");
        assert_eq!(render(Value::Decimal(" -3.1400 ".into()), SourceZone::Utc), "-3.1400");
    }

    #[test]
    fn dates_and_times() {
        let dob = NaiveDate::from_ymd_opt(1934, 12, 1).unwrap();
        assert_eq!(render(Value::from(dob), SourceZone::Utc), "\"1934-12-01\"");
        assert_eq!(render(Value::Time(3_723_000_000), SourceZone::Utc), "\"01:02:03\"");
        assert_eq!(render(Value::Time(3_723_500_000), SourceZone::Utc), "\"01:02:03.500\"");
        assert_eq!(render(Value::Time(-1), SourceZone::Utc), "-1");
    }

    #[test]
    fn timestamps_convert_to_utc() {
        let local = NaiveDate::from_ymd_opt(2022, 1, 24)
            .unwrap()
            .and_hms_opt(19, 13, 55)
            .unwrap();
        let plus_two = SourceZone::east(2 * 3600).unwrap();
        assert_eq!(render(Value::from(local), plus_two), "\"2022-01-24T17:13:55\"");
        assert_eq!(
            render(Value::from(local), SourceZone::Utc),
            "\"2022-01-24T19:13:55\""
        );
    }

    #[test]
    fn timestamptz_ignores_source_zone() {
        let utc = Value::TimestampTz(1_643_044_435_000_000);
        let plus_two = SourceZone::east(2 * 3600).unwrap();
        assert_eq!(render(utc, plus_two), "\"2022-01-24T17:13:55\"");
    }

    #[test]
    fn fraction_precision() {
        let base = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        let millis = base.and_hms_milli_opt(12, 0, 0, 250).unwrap();
        let micros = base.and_hms_micro_opt(12, 0, 0, 250_001).unwrap();
        assert_eq!(format_datetime(millis), "2020-02-29T12:00:00.250");
        assert_eq!(format_datetime(micros), "2020-02-29T12:00:00.250001");
    }

    #[test]
    fn uuid_and_nested() {
        let uuid = [
            0x55, 0x0e, 0x84, 0x00, 0xe2, 0x9b, 0x41, 0xd4, 0xa7, 0x16, 0x44, 0x66, 0x55, 0x44,
            0x00, 0x00,
        ];
        assert_eq!(
            render(Value::Uuid(uuid), SourceZone::Utc),
            "\"550e8400-e29b-41d4-a716-446655440000\""
        );
        assert_eq!(
            render(
                Value::Array(vec![Value::Int(1), Value::Null, Value::from("x")]),
                SourceZone::Utc
            ),
            "[1,null,\"x\"]"
        );
        assert_eq!(
            render(Value::Json(serde_json::json!({"k": [true]})), SourceZone::Utc),
            "{\"k\":[true]}"
        );
    }

    #[test]
    fn invalid_bytes_are_sanitized() {
        assert_eq!(
            render(Value::Bytes(b"bad\xFF\"q\"".to_vec()), SourceZone::Utc),
            "\"bad \\\"q\\\"\""
        );
    }
}
