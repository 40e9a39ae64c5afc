//! multipart/form-data body assembly for presigned storage uploads
//!
//! The body is built by hand rather than with `reqwest::multipart` because
//! signed POST policies are field-order sensitive and the exact bytes must be
//! reproducible. Everything goes through a byte buffer so binary file content
//! is copied untouched.

use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

const BOUNDARY_PREFIX: &str = "----GhAttachBoundary";
const CRLF: &[u8] = b"\r\n";

/// The binary part of the form, always sent last under the name `file`
#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Fresh boundary token, unique per upload
pub fn generate_boundary() -> String {
    format!("{}{}", BOUNDARY_PREFIX, Uuid::new_v4().simple())
}

/// `Content-Type` header value for a body built with `boundary`
pub fn content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={}", boundary)
}

/// Serialize `fields` (in the given order) followed by `file`
pub fn build_body(boundary: &str, fields: &[(String, String)], file: &FilePart) -> Bytes {
    let fields_len: usize = fields
        .iter()
        .map(|(k, v)| boundary.len() + k.len() + v.len() + 64)
        .sum();
    let mut buf = BytesMut::with_capacity(
        fields_len + file.data.len() + file.file_name.len() + boundary.len() * 2 + 128,
    );

    for (name, value) in fields {
        put_delimiter(&mut buf, boundary);
        buf.put_slice(b"Content-Disposition: form-data; name=\"");
        buf.put_slice(name.as_bytes());
        buf.put_slice(b"\"");
        buf.put_slice(CRLF);
        buf.put_slice(CRLF);
        buf.put_slice(value.as_bytes());
        buf.put_slice(CRLF);
    }

    put_delimiter(&mut buf, boundary);
    buf.put_slice(b"Content-Disposition: form-data; name=\"file\"; filename=\"");
    buf.put_slice(file.file_name.as_bytes());
    buf.put_slice(b"\"");
    buf.put_slice(CRLF);
    buf.put_slice(b"Content-Type: ");
    buf.put_slice(file.content_type.as_bytes());
    buf.put_slice(CRLF);
    buf.put_slice(CRLF);
    buf.put_slice(&file.data);
    buf.put_slice(CRLF);

    buf.put_slice(b"--");
    buf.put_slice(boundary.as_bytes());
    buf.put_slice(b"--");
    buf.put_slice(CRLF);

    buf.freeze()
}

fn put_delimiter(buf: &mut BytesMut, boundary: &str) {
    buf.put_slice(b"--");
    buf.put_slice(boundary.as_bytes());
    buf.put_slice(CRLF);
}
