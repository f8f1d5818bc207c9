//! Whitespace layout of the emitted JSON.
//!
//! Compact output has no whitespace at all. Pretty output indents two spaces
//! per nesting level, puts every entry on its own line and writes `"key":value`
//! with no space after the colon:
//!
//! ```text
//! {
//!   "email":"mmonroe@yahoo.com",
//!   "last_name":"Monroe"
//! }
//! ```

use std::io;

use serde_json::ser::Formatter;

const INDENT: &[u8] = b"  ";

/// A `serde_json` formatter with the two layouts used for record output.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pretty: bool,
    current_indent: usize,
    has_value: bool,
}

impl JsonFormatter {
    /// Formatter producing compact output.
    pub fn compact() -> Self {
        Self::default()
    }

    /// Formatter producing indented output.
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    /// Pick the layout from a flag.
    pub fn new(pretty: bool) -> Self {
        if pretty { Self::pretty() } else { Self::compact() }
    }

    /// Is this the indented layout?
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    fn open<W>(&mut self, writer: &mut W, bracket: &[u8]) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if self.pretty {
            self.current_indent += 1;
            self.has_value = false;
        }
        writer.write_all(bracket)
    }

    fn close<W>(&mut self, writer: &mut W, bracket: &[u8]) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if self.pretty {
            self.current_indent -= 1;
            if self.has_value {
                writer.write_all(b"\n")?;
                self.indent(writer)?;
            }
        }
        writer.write_all(bracket)
    }

    fn entry<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if self.pretty {
            writer.write_all(if first { b"\n" } else { b",\n" })?;
            self.indent(writer)
        } else if first {
            Ok(())
        } else {
            writer.write_all(b",")
        }
    }

    fn indent<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for _ in 0..self.current_indent {
            writer.write_all(INDENT)?;
        }
        Ok(())
    }
}

impl Formatter for JsonFormatter {
    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.open(writer, b"[")
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.close(writer, b"]")
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.entry(writer, first)
    }

    fn end_array_value<W>(&mut self, _writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.open(writer, b"{")
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.close(writer, b"}")
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.entry(writer, first)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b":")
    }

    fn end_object_value<W>(&mut self, _writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.has_value = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    fn render(value: &serde_json::Value, pretty: bool) -> String {
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut out, JsonFormatter::new(pretty));
        value.serialize(&mut ser).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn compact_has_no_whitespace() {
        let v = serde_json::json!({"a": [1, 2, {"b": null}], "c": {}});
        assert_eq!(render(&v, false), r#"{"a":[1,2,{"b":null}],"c":{}}"#);
    }

    #[test]
    fn pretty_uses_two_spaces_and_bare_colon() {
        let v = serde_json::json!({"a": [1, {"b": true}], "c": {}, "d": []});
        assert_eq!(
            render(&v, true),
            "{\n  \"a\":[\n    1,\n    {\n      \"b\":true\n    }\n  ],\n  \"c\":{},\n  \"d\":[]\n}"
        );
    }

    #[test]
    fn pretty_empty_object() {
        assert_eq!(render(&serde_json::json!({}), true), "{}");
        assert!(JsonFormatter::pretty().is_pretty());
        assert!(!JsonFormatter::compact().is_pretty());
    }
}
