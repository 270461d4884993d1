//! SQL literal rendering and string escaping

use crate::value::Value;

/// Renders [`Value`]s as MySQL literals.
///
/// Strings are single-quoted with backslash escaping, numbers and booleans
/// render bare, byte strings become hex literals. Drivers hand one of these
/// out so sessions and builders agree on literal syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct Escaper;

impl Escaper {
    /// Backslash-escape the characters MySQL treats specially inside a
    /// quoted string: NUL, newline, carriage return, backslash, both quote
    /// characters and Ctrl-Z.
    pub fn escape_text(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        for c in input.chars() {
            match c {
                '\0' => out.push_str("\\0"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                '"' => out.push_str("\\\""),
                '\x1a' => out.push_str("\\Z"),
                c => out.push(c),
            }
        }
        out
    }

    /// Render a value as a SQL literal. `Null` renders as `NULL`.
    pub fn escape(&self, value: &Value) -> String {
        self.escape_nullable(value, true)
    }

    /// Render a value as a SQL literal. `Null` renders as `NULL` when the
    /// column is nullable and as `''` otherwise. Lists render each element
    /// and join with commas, which is the form `IN (...)` substitution needs.
    pub fn escape_nullable(&self, value: &Value, nullable: bool) -> String {
        match value {
            Value::Null => if nullable { "NULL" } else { "''" }.to_string(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::I32(v) => v.to_string(),
            Value::I64(v) => v.to_string(),
            Value::F32(v) => v.to_string(),
            Value::F64(v) => v.to_string(),
            Value::String(s) => format!("'{}'", self.escape_text(s)),
            Value::Bytes(b) => {
                let hex: String = b.iter().map(|byte| format!("{:02X}", byte)).collect();
                format!("X'{}'", hex)
            }
            Value::Array(items) => items
                .iter()
                .map(|v| self.escape_nullable(v, nullable))
                .collect::<Vec<_>>()
                .join(","),
            #[cfg(feature = "uuid")]
            Value::Uuid(u) => format!("'{}'", u),
            #[cfg(feature = "chrono")]
            Value::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S")),
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(d) => d.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text_specials() {
        let esc = Escaper;
        assert_eq!(esc.escape_text("plain"), "plain");
        assert_eq!(esc.escape_text("it's"), "it\\'s");
        assert_eq!(esc.escape_text("a\\b"), "a\\\\b");
        assert_eq!(esc.escape_text("line\nbreak"), "line\\nbreak");
        assert_eq!(esc.escape_text("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(esc.escape_text("nul\0byte"), "nul\\0byte");
        assert_eq!(esc.escape_text("ret\rurn"), "ret\\rurn");
        assert_eq!(esc.escape_text("ctrl\x1az"), "ctrl\\Zz");
    }

    #[test]
    fn test_escape_literals() {
        let esc = Escaper;
        assert_eq!(esc.escape(&Value::Null), "NULL");
        assert_eq!(esc.escape(&Value::Bool(true)), "1");
        assert_eq!(esc.escape(&Value::Bool(false)), "0");
        assert_eq!(esc.escape(&Value::I32(42)), "42");
        assert_eq!(esc.escape(&Value::F64(1.5)), "1.5");
        assert_eq!(esc.escape(&Value::from("x")), "'x'");
        assert_eq!(esc.escape(&Value::from("it's")), "'it\\'s'");
    }

    #[test]
    fn test_escape_nullable() {
        let esc = Escaper;
        assert_eq!(esc.escape_nullable(&Value::Null, true), "NULL");
        assert_eq!(esc.escape_nullable(&Value::Null, false), "''");
    }

    #[test]
    fn test_escape_list() {
        let esc = Escaper;
        let list = Value::from(vec![1, 2, 3]);
        assert_eq!(esc.escape(&list), "1,2,3");
        let words = Value::from(vec!["a", "b"]);
        assert_eq!(esc.escape(&words), "'a','b'");
    }

    #[test]
    fn test_escape_bytes() {
        let esc = Escaper;
        assert_eq!(esc.escape(&Value::Bytes(vec![0xDE, 0xAD])), "X'DEAD'");
    }
}
