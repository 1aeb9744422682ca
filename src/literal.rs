//! Literal-syntax helpers: radix-prefixed integers and quoted string
//! constants. String parsing is a thin leaf with no knowledge of the ISA;
//! callers turn `None` into their own diagnostics.

/// Parse a decimal or prefixed-radix (`0x`/`0o`/`0b`) integer literal,
/// optionally signed.
pub fn parse_int(text: &str) -> Option<i64> {
    let t = text.trim();
    let (neg, t) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t.strip_prefix('+').unwrap_or(t)),
    };
    let v = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = t.strip_prefix("0b").or_else(|| t.strip_prefix("0B")) {
        i64::from_str_radix(bin, 2).ok()?
    } else if let Some(oct) = t.strip_prefix("0o").or_else(|| t.strip_prefix("0O")) {
        i64::from_str_radix(oct, 8).ok()?
    } else {
        t.parse::<i64>().ok()?
    };
    Some(if neg { -v } else { v })
}

/// Parse a quoted string literal (single or double quotes) into its raw
/// UTF-8 byte sequence, resolving backslash escapes.
pub fn parse_string(text: &str) -> Option<Vec<u8>> {
    let t = text.trim();
    let mut chars = t.chars();
    let quote = chars.next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    if t.len() < 2 || !t.ends_with(quote) {
        return None;
    }
    let inner = &t[1..t.len() - quote.len_utf8()];

    let mut out = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            if c == quote {
                // unescaped closing quote in the middle of the literal
                return None;
            }
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        match chars.next()? {
            'n' => out.push(b'\n'),
            't' => out.push(b'\t'),
            'r' => out.push(b'\r'),
            '0' => out.push(0),
            'x' => {
                let hi = chars.next()?.to_digit(16)?;
                let lo = chars.next()?.to_digit(16)?;
                out.push((hi * 16 + lo) as u8);
            }
            other => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_radixes() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("0x2A"), Some(42));
        assert_eq!(parse_int("0b101010"), Some(42));
        assert_eq!(parse_int("0o52"), Some(42));
        assert_eq!(parse_int("-5"), Some(-5));
        assert_eq!(parse_int("zz"), None);
    }

    #[test]
    fn string_escapes() {
        assert_eq!(parse_string("\"Hi\""), Some(vec![0x48, 0x69]));
        assert_eq!(parse_string("'a\\n'"), Some(vec![b'a', b'\n']));
        assert_eq!(parse_string("\"\\x41\\0\""), Some(vec![0x41, 0x00]));
        assert_eq!(parse_string("\"\\\"\""), Some(vec![b'"']));
        assert_eq!(parse_string("unquoted"), None);
        assert_eq!(parse_string("\"open"), None);
    }
}
