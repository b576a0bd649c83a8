use std::borrow::Cow;

use grammarc_runtime::Value;

#[derive(Clone)]
struct Cursor<'a> {
    inner: std::str::Chars<'a>,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Cursor<'a> {
        Self { inner: src.chars() }
    }

    fn peek(&self) -> Option<char> {
        self.inner.clone().next()
    }

    fn next(&mut self) -> Option<char> {
        self.inner.next()
    }

    fn char(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.next();
            true
        } else {
            false
        }
    }

    fn hex_digits(&mut self, min: usize, max: usize) -> Result<u32, Cow<'static, str>> {
        let mut value = 0u32;
        let mut count = 0;
        while count < max {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    self.next();
                    value = value
                        .checked_mul(16)
                        .and_then(|v| v.checked_add(digit))
                        .ok_or("Escape value is too large")?;
                    count += 1;
                }
                None => break,
            }
        }
        if count < min {
            return Err("Expected hexadecimal digits in escape".into());
        }
        Ok(value)
    }
}

/// Decode callback for quoted string tokens, accepts both `"` and `'` delimiters.
pub fn decode_string(text: &str) -> Result<Value, Cow<'static, str>> {
    let mut cursor = Cursor::new(text);
    let quote = match cursor.next() {
        Some(quote @ ('"' | '\'')) => quote,
        _ => return Err("Expected opening quote".into()),
    };

    let mut out = String::with_capacity(text.len());
    loop {
        match cursor.next() {
            Some('\\') => {
                let escaped = match cursor.next() {
                    Some('\\') => '\\',
                    Some('"') => '"',
                    Some('\'') => '\'',
                    Some('/') => '/',
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('0') => '\0',
                    Some('b') => '\u{8}',
                    Some('f') => '\u{c}',
                    Some('v') => '\u{b}',
                    Some('x') => {
                        let value = cursor.hex_digits(2, 2)?;
                        char::from_u32(value).ok_or("Invalid character escape")?
                    }
                    Some('u') => {
                        let value = if cursor.char('{') {
                            let value = cursor.hex_digits(1, 6)?;
                            if !cursor.char('}') {
                                return Err("Expected '}' to close unicode escape".into());
                            }
                            value
                        } else {
                            cursor.hex_digits(4, 4)?
                        };
                        char::from_u32(value).ok_or_else(|| {
                            Cow::Owned(format!("Invalid unicode scalar value {value:#x}"))
                        })?
                    }
                    Some(other) => {
                        return Err(format!("Unknown character escape '{}'", other.escape_default()).into())
                    }
                    None => return Err("Expected closing quote".into()),
                };
                out.push(escaped);
            }
            Some(c) if c == quote => break,
            Some(normal) => out.push(normal),
            None => return Err("Expected closing quote".into()),
        }
    }

    if cursor.next().is_some() {
        return Err("Trailing characters after closing quote".into());
    }

    Ok(Value::Text(out.into()))
}

pub fn decode_number(text: &str) -> Result<Value, Cow<'static, str>> {
    text.parse()
        .map(Value::Integer)
        .map_err(|_| "Number does not fit in 64 bits".into())
}

/// Writes `value` as a double quoted literal that [`decode_string`] reads back.
pub fn display_string(buf: &mut dyn std::fmt::Write, value: &str) -> std::fmt::Result {
    buf.write_char('"')?;
    for c in value.chars() {
        match c {
            '"' => buf.write_str("\\\"")?,
            '\\' => buf.write_str("\\\\")?,
            '\n' => buf.write_str("\\n")?,
            '\t' => buf.write_str("\\t")?,
            '\r' => buf.write_str("\\r")?,
            '\0' => buf.write_str("\\0")?,
            c if c.is_control() => write!(buf, "\\u{{{:x}}}", c as u32)?,
            c => buf.write_char(c)?,
        }
    }
    buf.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(src: &str) -> String {
        match decode_string(src) {
            Ok(Value::Text(text)) => text.to_string(),
            other => panic!("failed to decode {src:?}: {other:?}"),
        }
    }

    #[test]
    fn escaped_quote() {
        assert_eq!(text(r#""a\"b""#), "a\"b");
        assert_eq!(text(r"'it\'s'"), "it's");
        assert_eq!(text(r#"'say "hi"'"#), "say \"hi\"");
    }

    #[test]
    fn standard_escapes() {
        assert_eq!(text(r#""\n\t\r\0\\\/""#), "\n\t\r\0\\/");
        assert_eq!(text(r#""\b\f\v""#), "\u{8}\u{c}\u{b}");
        assert_eq!(text(r#""\x41é\u{1F600}""#), "Aé😀");
    }

    #[test]
    fn malformed_escapes() {
        assert!(decode_string(r#""\q""#).is_err());
        assert!(decode_string(r#""\x4""#).is_err());
        assert!(decode_string(r#""\u{110000}""#).is_err());
        assert!(decode_string(r#""\u{41""#).is_err());
        assert!(decode_string(r#""open"#).is_err());
    }

    #[test]
    fn display_reads_back() {
        let mut buf = String::new();
        display_string(&mut buf, "a\"b\\c\n\u{1}").unwrap();
        assert_eq!(buf, r#""a\"b\\c\n\u{1}""#);
        assert_eq!(text(&buf), "a\"b\\c\n\u{1}");
    }

    #[test]
    fn numbers() {
        assert_eq!(decode_number("42"), Ok(Value::Integer(42)));
        assert!(decode_number("99999999999999999999999").is_err());
    }
}
