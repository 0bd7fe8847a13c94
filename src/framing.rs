//! Framing & Compression Wrapper: the version byte, the optional zlib
//! sub-frame, and the top-level `decode`/`encode` entry points that tie the
//! tag decoder and term encoder to it. Built on `flate2` so the compression
//! level argument has somewhere to go.

use std::io::Write;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::decode::{decode_term, DEFAULT_DEPTH_LIMIT};
use crate::encode::encode_term;
use crate::error::{DecodeError, EncodeError};
use crate::fallback::FallbackBridge;
use crate::reader::ByteReader;
use crate::tag;
use crate::term::Term;
use crate::writer::ByteWriter;

/// The `compression` argument to [`encode`]: off, the default level, or an
/// explicit level in `[0,9]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Off,
    Default,
    Level(u8),
}

/// Decodes one framed term, returning it together with the unread suffix of
/// `bytes` so callers can pack several frames back to back.
pub fn decode<'a>(bytes: &'a [u8], bridge: Option<&dyn FallbackBridge>) -> Result<(Term, &'a [u8]), DecodeError> {
    let mut reader = ByteReader::new(bytes);
    let version = reader.take_u8()?;
    if version != tag::VERSION {
        return Err(DecodeError::BadVersion { version });
    }
    if reader.peek_tag()? == tag::COMPRESSED {
        decode_compressed(&mut reader, bridge)
    } else {
        let term = decode_term(&mut reader, 0, DEFAULT_DEPTH_LIMIT, bridge)?;
        Ok((term, reader.remaining()))
    }
}

fn decode_compressed<'a>(
    reader: &mut ByteReader<'a>,
    bridge: Option<&dyn FallbackBridge>,
) -> Result<(Term, &'a [u8]), DecodeError> {
    reader.take_u8()?; // the 0x50 sub-tag itself
    let declared_size = reader.take_u32_be()? as usize;
    let compressed = reader.remaining();

    let mut decoder = ZlibDecoder::new(compressed);
    let mut inflated = Vec::with_capacity(declared_size);
    std::io::Read::read_to_end(&mut decoder, &mut inflated)
        .map_err(|err| DecodeError::BadCompression(err.to_string()))?;
    if inflated.len() != declared_size {
        return Err(DecodeError::BadCompression(format!(
            "declared inflated size {} but got {}",
            declared_size,
            inflated.len()
        )));
    }

    // Bytes the zlib stream itself did not consume belong to the next frame,
    // not to this term's tail.
    let tail = &compressed[decoder.total_in() as usize..];
    let mut inner = ByteReader::new(&inflated);
    let term = decode_term(&mut inner, 0, DEFAULT_DEPTH_LIMIT, bridge)?;
    Ok((term, tail))
}

/// Encodes `term`, optionally deflating the payload. Compression is only
/// emitted when it strictly shrinks the frame including its 5-byte header;
/// otherwise the uncompressed framing is returned even though compression
/// was requested.
pub fn encode(term: &Term, compression: Compression, bridge: Option<&dyn FallbackBridge>) -> Result<Vec<u8>, EncodeError> {
    let mut writer = ByteWriter::new();
    encode_term(term, &mut writer, bridge)?;
    let payload = writer.into_vec();

    let level = match compression {
        Compression::Off => return Ok(frame_uncompressed(payload)),
        Compression::Default => 6,
        Compression::Level(level) => level.min(9),
    };

    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::new(level as u32));
    encoder.write_all(&payload)?;
    let deflated = encoder.finish()?;

    if 5 + deflated.len() <= payload.len() {
        let mut frame = Vec::with_capacity(6 + deflated.len());
        frame.push(tag::VERSION);
        frame.push(tag::COMPRESSED);
        frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        frame.extend_from_slice(&deflated);
        Ok(frame)
    } else {
        Ok(frame_uncompressed(payload))
    }
}

fn frame_uncompressed(payload: Vec<u8>) -> Vec<u8> {
    let mut frame = Vec::with_capacity(1 + payload.len());
    frame.push(tag::VERSION);
    frame.extend_from_slice(&payload);
    frame
}
