//! Blob - Handle の下に保存される不透明なペイロード
//!
//! # 実装詳細
//! datastore に書くレコードは次の形:
//!
//! ```text
//! [version: u8][header_len: u32 BE][header: JSON][data: raw bytes]
//! ```
//!
//! メタデータだけを JSON にし、data は生のバイト列のまま後ろに置く。

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

const RECORD_VERSION: u8 = 1;
const RECORD_PREFIX_LEN: usize = 1 + 4;

/// Opaque payload stored under a `Handle`.
///
/// `content_type` is the only metadata carried; application logic uses it to pick a
/// decoder when it reads the blob back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    data: Bytes,
    content_type: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum RecordError {
    #[error("unsupported blob record version {0}")]
    Version(u8),

    #[error("blob record truncated")]
    Truncated,

    #[error("blob record header too large")]
    HeaderTooLarge,

    #[error("blob record header: {0}")]
    Header(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize)]
struct RecordHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
}

impl Blob {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Record form written to a datastore.
    pub(crate) fn encode(&self) -> Result<Bytes, RecordError> {
        let header = serde_json::to_vec(&RecordHeader {
            content_type: self.content_type.clone(),
        })?;
        let header_len = u32::try_from(header.len()).map_err(|_| RecordError::HeaderTooLarge)?;

        let mut out = BytesMut::with_capacity(RECORD_PREFIX_LEN + header.len() + self.data.len());
        out.put_u8(RECORD_VERSION);
        out.put_u32(header_len);
        out.put_slice(&header);
        out.put_slice(&self.data);
        Ok(out.freeze())
    }

    /// Inverse of `encode`. `data` shares `raw`'s buffer.
    pub(crate) fn decode(mut raw: Bytes) -> Result<Self, RecordError> {
        if raw.len() < RECORD_PREFIX_LEN {
            return Err(RecordError::Truncated);
        }
        let version = raw.get_u8();
        if version != RECORD_VERSION {
            return Err(RecordError::Version(version));
        }
        let header_len = raw.get_u32() as usize;
        if raw.len() < header_len {
            return Err(RecordError::Truncated);
        }

        let header_raw = raw.split_to(header_len);
        let header: RecordHeader = serde_json::from_slice(&header_raw)?;
        Ok(Self {
            data: raw,
            content_type: header.content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn record_keeps_metadata() {
        let blob = Blob::new("result").with_content_type("image/png");

        let decoded = Blob::decode(blob.encode().unwrap()).unwrap();

        assert_eq!(decoded, blob);
        assert_eq!(decoded.content_type(), Some("image/png"));
        assert_eq!(decoded.data().as_ref(), b"result");
    }

    #[test]
    fn record_without_content_type() {
        let blob = Blob::new(Bytes::from_static(b"\x00\xff"));

        let decoded = Blob::decode(blob.encode().unwrap()).unwrap();

        assert_eq!(decoded, blob);
        assert_eq!(decoded.content_type(), None);
    }

    #[test]
    fn payload_is_stored_raw() {
        let data = vec![0xabu8; 64 * 1024];
        let blob = Blob::new(data.clone()).with_content_type("application/octet-stream");

        let raw = blob.encode().unwrap();

        // fixed prefix plus a small JSON header, not a per-byte expansion
        assert!(raw.len() < data.len() + 64, "record is {} bytes", raw.len());
        assert!(raw.ends_with(&data));
    }

    #[rstest]
    #[case::png_magic(&b"\x89PNG"[..])]
    #[case::empty(&b""[..])]
    #[case::unknown_version(&b"\x02\x00\x00\x00\x00"[..])]
    #[case::header_past_end(&b"\x01\x00\x00\x00\x10{}"[..])]
    #[case::header_not_json(&b"\x01\x00\x00\x00\x02xxdata"[..])]
    fn decode_rejects_foreign_bytes(#[case] raw: &'static [u8]) {
        assert!(Blob::decode(Bytes::from_static(raw)).is_err());
    }
}
