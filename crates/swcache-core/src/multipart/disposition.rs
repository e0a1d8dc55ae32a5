//! Content-Disposition parsing for form-data part headers (name, filename, filename*).

#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct Disposition {
    pub name: Option<String>,
    pub filename: Option<String>,
}

/// Parse `form-data; name="file"; filename="list.htm"`.
///
/// `filename*=UTF-8''...` (RFC 5987) takes precedence over `filename`.
/// Returns None when the disposition type isn't `form-data`.
pub(super) fn parse_form_data(header_value: &str) -> Option<Disposition> {
    let mut params = split_params(header_value.trim()).into_iter();
    let kind = params.next()?;
    if !kind.trim().eq_ignore_ascii_case("form-data") {
        return None;
    }

    let mut out = Disposition::default();
    let mut extended_filename = None;
    for param in params {
        let Some((name, v)) = param.split_once('=') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let v = v.trim();
        match name.as_str() {
            "name" => out.name = Some(unquote(v)),
            "filename" => out.filename = Some(unquote(v)),
            "filename*" => {
                let rest = v
                    .strip_prefix("utf-8''")
                    .or_else(|| v.strip_prefix("UTF-8''"));
                if let Some(rest) = rest {
                    let decoded = percent_decode(rest);
                    if !decoded.is_empty() {
                        extended_filename = Some(decoded);
                    }
                }
            }
            _ => {}
        }
    }
    if extended_filename.is_some() {
        out.filename = extended_filename;
    }
    Some(out)
}

/// Split on `;` outside of quoted strings.
fn split_params(value: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                out.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&value[start..]);
    out
}

fn unquote(v: &str) -> String {
    if v.len() >= 2 && v.starts_with('"') && v.ends_with('"') {
        decode_quoted(&v[1..v.len() - 1])
    } else {
        v.to_string()
    }
}

/// Decode backslash-escaped quotes in a quoted value.
fn decode_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Percent-decode an RFC 5987 value; invalid escapes are kept literally.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
