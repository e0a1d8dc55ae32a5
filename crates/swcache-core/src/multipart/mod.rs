//! `multipart/form-data` decoding for share-target submissions.

mod disposition;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultipartError {
    #[error("content type is not multipart/form-data")]
    NotFormData,
    #[error("multipart content type has no boundary")]
    MissingBoundary,
    #[error("malformed multipart body: {0}")]
    Malformed(&'static str),
}

/// One decoded form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    /// Present for file fields, absent for text fields.
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl FormPart {
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormData {
    parts: Vec<FormPart>,
}

impl FormData {
    /// First part named `name`.
    pub fn get(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|p| p.name == name)
    }

    pub fn take(mut self, name: &str) -> Option<FormPart> {
        let idx = self.parts.iter().position(|p| p.name == name)?;
        Some(self.parts.swap_remove(idx))
    }
}

/// Boundary parameter of a `multipart/form-data` Content-Type.
pub fn boundary(content_type: &str) -> Result<String, MultipartError> {
    let mut params = content_type.split(';');
    let essence = params.next().unwrap_or_default().trim();
    if !essence.eq_ignore_ascii_case("multipart/form-data") {
        return Err(MultipartError::NotFormData);
    }
    for param in params {
        if let Some((name, value)) = param.split_once('=') {
            if name.trim().eq_ignore_ascii_case("boundary") {
                let value = value.trim().trim_matches('"');
                if value.is_empty() {
                    break;
                }
                return Ok(value.to_string());
            }
        }
    }
    Err(MultipartError::MissingBoundary)
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Decode a full multipart body. Preamble and epilogue are ignored.
pub fn parse(body: &[u8], boundary: &str) -> Result<FormData, MultipartError> {
    let delimiter = format!("--{boundary}").into_bytes();
    let part_end = format!("\r\n--{boundary}").into_bytes();

    let mut pos = find(body, &delimiter, 0)
        .ok_or(MultipartError::Malformed("no opening boundary"))?
        + delimiter.len();
    let mut parts = Vec::new();

    loop {
        if body[pos..].starts_with(b"--") {
            break;
        }
        // Transport padding after the delimiter, then CRLF.
        while pos < body.len() && (body[pos] == b' ' || body[pos] == b'\t') {
            pos += 1;
        }
        if !body[pos..].starts_with(b"\r\n") {
            return Err(MultipartError::Malformed("boundary not followed by CRLF"));
        }
        pos += 2;

        let headers_end = if body[pos..].starts_with(b"\r\n") {
            (pos, pos + 2)
        } else {
            find(body, b"\r\n\r\n", pos)
                .map(|i| (i, i + 4))
                .ok_or(MultipartError::Malformed("unterminated part headers"))?
        };
        let header_block = String::from_utf8_lossy(&body[pos..headers_end.0]);
        let content_start = headers_end.1;

        let content_end = find(body, &part_end, content_start)
            .ok_or(MultipartError::Malformed("unterminated part"))?;

        let mut disposition = None;
        let mut content_type = None;
        for line in header_block.split("\r\n") {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let name = name.trim();
            if name.eq_ignore_ascii_case("content-disposition") {
                disposition = disposition::parse_form_data(value);
            } else if name.eq_ignore_ascii_case("content-type") {
                content_type = Some(value.trim().to_string());
            }
        }

        // Parts without a form-data name can't be addressed; skip them.
        if let Some(name) = disposition.as_ref().and_then(|d| d.name.clone()) {
            parts.push(FormPart {
                name,
                filename: disposition.and_then(|d| d.filename),
                content_type,
                data: body[content_start..content_end].to_vec(),
            });
        }

        pos = content_end + part_end.len();
    }

    Ok(FormData { parts })
}

/// `Content-Type` value announcing `boundary`.
pub fn content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={boundary}")
}

/// Encode parts as a `multipart/form-data` body (the inverse of `parse`).
pub fn encode(parts: &[FormPart], boundary: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        let mut disposition = format!(
            "Content-Disposition: form-data; name=\"{}\"",
            escape_quoted(&part.name)
        );
        if let Some(filename) = &part.filename {
            disposition.push_str(&format!("; filename=\"{}\"", escape_quoted(filename)));
        }
        out.extend_from_slice(disposition.as_bytes());
        out.extend_from_slice(b"\r\n");
        if let Some(ct) = &part.content_type {
            out.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&part.data);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    out
}

fn escape_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
