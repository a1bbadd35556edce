//! Message encoding and marker framing
//!
//! Frames carry no length prefix:
//!
//! ```text
//! <SOFABlender> [payload chunk 4096] [payload chunk 4096] ... [rest] </SOFABlender>
//! ```
//!
//! The receiver scans for the footer to find the end of a payload. A payload
//! that itself contains the footer bytes is cut short; the protocol has no
//! escaping for it.

use serde::{Serialize, de::DeserializeOwned};
use std::io::{self, Write};
use thiserror::Error;

/// Start-of-frame marker
pub const FRAME_HEADER: &[u8] = b"<SOFABlender>";

/// End-of-frame marker
pub const FRAME_FOOTER: &[u8] = b"</SOFABlender>";

/// Maximum size of one payload write
pub const CHUNK_SIZE: usize = 4096;

/// Serialization codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    /// JSON encoding
    #[default]
    Json,
}

impl Codec {
    /// Encode a message
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Json => serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string())),
        }
    }

    /// Decode a message
    pub fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError> {
        match self {
            Self::Json => {
                serde_json::from_slice(data).map_err(|e| CodecError::Decode(e.to_string()))
            }
        }
    }

    /// Get the content type of encoded payloads
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
        }
    }
}

/// Codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Decoding failed: {0}")]
    Decode(String),
}

/// Write one frame: header, payload in [`CHUNK_SIZE`] pieces, footer
///
/// Each chunk is a separate `write_all`. The first failing write aborts the
/// frame.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<usize> {
    writer.write_all(FRAME_HEADER)?;
    for chunk in payload.chunks(CHUNK_SIZE) {
        writer.write_all(chunk)?;
    }
    writer.write_all(FRAME_FOOTER)?;
    writer.flush()?;

    Ok(FRAME_HEADER.len() + payload.len() + FRAME_FOOTER.len())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Codec wrapped in frame markers
pub struct MarkerCodec {
    codec: Codec,
}

impl MarkerCodec {
    /// Create a new marker codec
    pub fn new(codec: Codec) -> Self {
        Self { codec }
    }

    /// Encode a message with markers
    pub fn encode_framed<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let data = self.codec.encode(value)?;

        let mut framed = Vec::with_capacity(FRAME_HEADER.len() + data.len() + FRAME_FOOTER.len());
        write_frame(&mut framed, &data).map_err(|e| CodecError::Encode(e.to_string()))?;

        Ok(framed)
    }

    /// Decode the first complete frame
    ///
    /// Returns (decoded value, bytes consumed) or None if incomplete. Bytes
    /// before the header are skipped and count as consumed.
    pub fn decode_framed<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<Option<(T, usize)>, CodecError> {
        let Some(start) = find(data, FRAME_HEADER) else {
            return Ok(None);
        };
        let payload_start = start + FRAME_HEADER.len();

        let Some(len) = find(&data[payload_start..], FRAME_FOOTER) else {
            return Ok(None);
        };

        let value = self
            .codec
            .decode(&data[payload_start..payload_start + len])?;
        Ok(Some((value, payload_start + len + FRAME_FOOTER.len())))
    }
}

/// Incremental frame scanner for the receiving side
///
/// Bytes arrive in arbitrary pieces; complete payloads come out in order.
/// Payload bytes already searched for the footer are not searched again, so
/// a frame costs time linear in its size however it is split.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    /// Payload bytes of the pending frame known to hold no footer
    scanned: usize,
}

impl FrameDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received bytes
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Bytes held back waiting for a footer
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Take the next complete payload, if any
    pub fn next_payload(&mut self) -> Option<Vec<u8>> {
        if self.scanned == 0 {
            let Some(start) = find(&self.buffer, FRAME_HEADER) else {
                // Keep a possible partial header at the tail
                let keep = (FRAME_HEADER.len() - 1).min(self.buffer.len());
                self.buffer.drain(..self.buffer.len() - keep);
                return None;
            };
            self.buffer.drain(..start);
        }

        // A footer may straddle the end of the previous scan
        let from = self.scanned.saturating_sub(FRAME_FOOTER.len() - 1);
        let body = &self.buffer[FRAME_HEADER.len()..];
        let Some(offset) = find(&body[from..], FRAME_FOOTER) else {
            self.scanned = body.len();
            return None;
        };
        let payload_end = FRAME_HEADER.len() + from + offset;

        let payload = self.buffer[FRAME_HEADER.len()..payload_end].to_vec();
        self.buffer.drain(..payload_end + FRAME_FOOTER.len());
        self.scanned = 0;
        Some(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenestream_core::{Document, MeshRecord};

    /// Records each `write` call separately
    #[derive(Default)]
    struct RecordingWriter {
        writes: Vec<Vec<u8>>,
    }

    impl Write for RecordingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn sample_document() -> Document {
        Document {
            iteration: Some(1),
            objects: vec![
                MeshRecord::new("visual", vec![[0.0, 1.0, 2.0]]).with_faces(vec![vec![0, 0, 0]]),
            ],
            node_name: Some("root".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let codec = Codec::Json;
        let encoded = codec.encode(&sample_document()).unwrap();
        let decoded: Document = codec.decode(&encoded).unwrap();

        assert_eq!(decoded, sample_document());
        assert_eq!(codec.content_type(), "application/json");
    }

    #[test]
    fn test_chunking() {
        for size in [0usize, 1, 4095, 4096, 4097, 9000] {
            let payload: Vec<u8> = (0..size).map(|i| b'a' + (i % 26) as u8).collect();
            let mut writer = RecordingWriter::default();

            let written = write_frame(&mut writer, &payload).unwrap();
            assert_eq!(written, FRAME_HEADER.len() + size + FRAME_FOOTER.len());

            let writes = &writer.writes;
            assert_eq!(writes.first().unwrap().as_slice(), FRAME_HEADER);
            assert_eq!(writes.last().unwrap().as_slice(), FRAME_FOOTER);

            let chunks = &writes[1..writes.len() - 1];
            assert_eq!(chunks.len(), size.div_ceil(CHUNK_SIZE));
            assert!(chunks.iter().all(|chunk| chunk.len() <= CHUNK_SIZE));
            assert!(
                chunks
                    .iter()
                    .rev()
                    .skip(1)
                    .all(|chunk| chunk.len() == CHUNK_SIZE)
            );
            assert_eq!(chunks.concat(), payload);
        }
    }

    #[test]
    fn test_write_failure_aborts_frame() {
        struct FailAfter(usize, Vec<u8>);

        impl Write for FailAfter {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if self.0 == 0 {
                    return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
                }
                self.0 -= 1;
                self.1.extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut writer = FailAfter(2, Vec::new());
        let payload = vec![b'x'; CHUNK_SIZE * 3];

        let result = write_frame(&mut writer, &payload);
        assert!(result.is_err());
        assert_eq!(writer.1.len(), FRAME_HEADER.len() + CHUNK_SIZE);
        assert!(find(&writer.1, FRAME_FOOTER).is_none());
    }

    #[test]
    fn test_marker_codec() {
        let framed = MarkerCodec::new(Codec::Json);
        let encoded = framed.encode_framed(&sample_document()).unwrap();

        assert!(encoded.starts_with(FRAME_HEADER));
        assert!(encoded.ends_with(FRAME_FOOTER));

        let (decoded, consumed): (Document, usize) =
            framed.decode_framed(&encoded).unwrap().unwrap();
        assert_eq!(consumed, encoded.len());
        assert_eq!(decoded, sample_document());
    }

    #[test]
    fn test_marker_codec_incomplete() {
        let framed = MarkerCodec::new(Codec::Json);

        let result: Result<Option<(Document, usize)>, _> = framed.decode_framed(b"{}");
        assert!(result.unwrap().is_none());

        let result: Result<Option<(Document, usize)>, _> =
            framed.decode_framed(b"<SOFABlender>{\"iteration\":");
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_marker_codec_bad_payload() {
        let framed = MarkerCodec::new(Codec::Json);
        let result: Result<Option<(Document, usize)>, _> =
            framed.decode_framed(b"<SOFABlender>{not json</SOFABlender>");
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_decoder_split_input() {
        let framed = MarkerCodec::new(Codec::Json);
        let mut stream = b"noise".to_vec();
        stream.extend(framed.encode_framed(&sample_document()).unwrap());
        stream.extend(framed.encode_framed(&Document::new()).unwrap());

        let mut decoder = FrameDecoder::new();
        let mut payloads = Vec::new();
        for piece in stream.chunks(7) {
            decoder.push(piece);
            while let Some(payload) = decoder.next_payload() {
                payloads.push(payload);
            }
        }

        assert_eq!(payloads.len(), 2);
        let first: Document = Codec::Json.decode(&payloads[0]).unwrap();
        assert_eq!(first, sample_document());
        assert_eq!(payloads[1], b"{}");
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_decoder_keeps_partial_header() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"garbage<SOFA");
        assert!(decoder.next_payload().is_none());
        assert_eq!(decoder.buffered(), FRAME_HEADER.len() - 1);

        decoder.push(b"Blender>{}</SOFABlender>");
        assert_eq!(decoder.next_payload().unwrap(), b"{}");
    }

    #[test]
    fn test_footer_inside_payload_truncates() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"<SOFABlender>{\"scene\":\"</SOFABlender>\"}</SOFABlender>");

        assert_eq!(decoder.next_payload().unwrap(), b"{\"scene\":\"");
    }

    #[test]
    fn test_decoder_footer_split_across_pushes() {
        for split in 1..FRAME_FOOTER.len() {
            let mut decoder = FrameDecoder::new();
            decoder.push(FRAME_HEADER);
            decoder.push(b"{}");
            decoder.push(&FRAME_FOOTER[..split]);
            assert!(decoder.next_payload().is_none());

            decoder.push(&FRAME_FOOTER[split..]);
            decoder.push(FRAME_HEADER);
            decoder.push(b"[]");
            decoder.push(FRAME_FOOTER);

            assert_eq!(decoder.next_payload().unwrap(), b"{}");
            assert_eq!(decoder.next_payload().unwrap(), b"[]");
            assert!(decoder.next_payload().is_none());
            assert_eq!(decoder.buffered(), 0);
        }
    }

    #[test]
    fn test_decoder_large_frame_in_chunks() {
        let size = 4 * 1024 * 1024;
        let payload: Vec<u8> = (0..size).map(|i| b'a' + (i % 26) as u8).collect();
        let mut writer = RecordingWriter::default();
        write_frame(&mut writer, &payload).unwrap();
        let stream = writer.writes.concat();

        let mut decoder = FrameDecoder::new();
        let mut payloads = Vec::new();
        for piece in stream.chunks(CHUNK_SIZE) {
            decoder.push(piece);
            while let Some(payload) = decoder.next_payload() {
                payloads.push(payload);
            }
        }

        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].len(), size);
        assert_eq!(payloads[0], payload);
        assert_eq!(decoder.buffered(), 0);
    }
}
