//! Decoding of quoted literals.
//!
//! Single quoted strings and quoted path keys only drop the backslash of each
//! escape pair. Double quoted strings additionally understand C style escapes.

/// Removes the backslash from every escape pair, so `\\` becomes `\` and `\'` becomes `'`.
/// `\0` decodes to a NUL character.
pub fn strip_slashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('\0'),
            Some(escaped) => out.push(escaped),
            None => {}
        }
    }
    out
}

/// Decodes C style escapes: `\n`, `\t`, `\r`, `\v`, `\f`, `\a`, `\b`, octal `\NNN`
/// and hex `\xHH`. Any other escaped character stands for itself.
///
/// Escapes produce raw bytes, so sequences like `\xc3\xa9` combine into one
/// character. Byte sequences that are not valid UTF-8 are replaced.
pub fn strip_c_slashes(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut ix = 0;
    while ix < bytes.len() {
        let b = bytes[ix];
        ix += 1;
        if b != b'\\' {
            out.push(b);
            continue;
        }
        let Some(&escaped) = bytes.get(ix) else {
            break;
        };
        ix += 1;
        match escaped {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            b'a' => out.push(0x07),
            b'v' => out.push(0x0b),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'x' if bytes.get(ix).is_some_and(u8::is_ascii_hexdigit) => {
                let mut value = 0u8;
                for _ in 0..2 {
                    match bytes.get(ix).copied().and_then(hex_value) {
                        Some(digit) => {
                            value = value.wrapping_mul(16).wrapping_add(digit);
                            ix += 1;
                        }
                        None => break,
                    }
                }
                out.push(value);
            }
            b'0'..=b'7' => {
                let mut value = escaped - b'0';
                for _ in 0..2 {
                    match bytes.get(ix) {
                        Some(digit @ b'0'..=b'7') => {
                            value = value.wrapping_mul(8).wrapping_add(digit - b'0');
                            ix += 1;
                        }
                        _ => break,
                    }
                }
                out.push(value);
            }
            other => out.push(other),
        }
    }
    String::from_utf8(out).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|digit| digit as u8)
}
