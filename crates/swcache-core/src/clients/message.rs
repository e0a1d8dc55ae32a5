//! Messages posted to client contexts.

use crate::checksum::sha256_hex;
use crate::multipart::FormPart;
use serde::{Serialize, Serializer};

/// A file received through the share target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharedFile {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    #[serde(serialize_with = "serialize_hex")]
    pub data: Vec<u8>,
}

fn serialize_hex<S: Serializer>(data: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&hex::encode(data))
}

impl SharedFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn sha256(&self) -> String {
        sha256_hex(&self.data)
    }
}

impl From<FormPart> for SharedFile {
    fn from(part: FormPart) -> Self {
        Self {
            name: part.filename,
            content_type: part.content_type,
            data: part.data,
        }
    }
}

/// Serialises as `{"type": "shared-file", "file": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    SharedFile { file: SharedFile },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_file_message_shape() {
        let msg = ClientMessage::SharedFile {
            file: SharedFile {
                name: Some("list.htm".to_string()),
                content_type: Some("text/html".to_string()),
                data: b"hi".to_vec(),
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "shared-file");
        assert_eq!(json["file"]["name"], "list.htm");
        assert_eq!(json["file"]["type"], "text/html");
        assert_eq!(json["file"]["data"], "6869");
    }

    #[test]
    fn from_form_part_keeps_filename_and_type() {
        let part = FormPart {
            name: "file".to_string(),
            filename: Some("stock.htm".to_string()),
            content_type: Some("text/html".to_string()),
            data: vec![1, 2, 3],
        };
        let file = SharedFile::from(part);
        assert_eq!(file.name.as_deref(), Some("stock.htm"));
        assert_eq!(file.size(), 3);
    }
}
