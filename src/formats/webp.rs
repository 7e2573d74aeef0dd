//! WebP inside its RIFF container.
//!
//! The first sub-chunk decides the layout:
//! - `VP8 ` (lossy): 14-bit width/height after the keyframe start code
//! - `VP8L` (lossless): 14-bit width-1 and height-1 packed into a 32-bit word
//! - `VP8X` (extended): 24-bit canvas width-1 and height-1

use super::{Endian, Step, bytes, magic, matched, resolve};
use crate::types::{ImageFormat, ParseOutcome};

pub const RIFF_SIGNATURE: &[u8; 4] = b"RIFF";
pub const WEBP_FOURCC: &[u8; 4] = b"WEBP";

const FOURCC_OFFSET: usize = 8;
const CHUNK_TAG_OFFSET: usize = 12;
const PAYLOAD_OFFSET: usize = 20;

const VP8_START_CODE: [u8; 3] = [0x9D, 0x01, 0x2A];
const VP8L_SIGNATURE: u8 = 0x2F;
const DIMENSION_14_BITS: u32 = 0x3FFF;

pub fn parse(buf: &[u8]) -> ParseOutcome {
    resolve(read_first_chunk(buf))
}

fn read_first_chunk(buf: &[u8]) -> Step<ParseOutcome> {
    magic(buf, 0, RIFF_SIGNATURE)?;
    magic(buf, FOURCC_OFFSET, WEBP_FOURCC)?;

    match &bytes::<4>(buf, CHUNK_TAG_OFFSET)? {
        b"VP8 " => lossy(buf),
        b"VP8L" => lossless(buf),
        b"VP8X" => extended(buf),
        _ => Ok(ParseOutcome::NotThisFormat),
    }
}

fn lossy(buf: &[u8]) -> Step<ParseOutcome> {
    // frame tag(3) | start code(3) | width(2) | height(2)
    magic(buf, PAYLOAD_OFFSET + 3, &VP8_START_CODE)?;

    let width = Endian::Little.u16(buf, PAYLOAD_OFFSET + 6)? as u32 & DIMENSION_14_BITS;
    let height = Endian::Little.u16(buf, PAYLOAD_OFFSET + 8)? as u32 & DIMENSION_14_BITS;

    Ok(matched(ImageFormat::Webp, width, height))
}

fn lossless(buf: &[u8]) -> Step<ParseOutcome> {
    magic(buf, PAYLOAD_OFFSET, &[VP8L_SIGNATURE])?;

    let bits = Endian::Little.u32(buf, PAYLOAD_OFFSET + 1)?;
    let width = (bits & DIMENSION_14_BITS) + 1;
    let height = ((bits >> 14) & DIMENSION_14_BITS) + 1;

    Ok(matched(ImageFormat::Webp, width, height))
}

fn extended(buf: &[u8]) -> Step<ParseOutcome> {
    // flags(4) | canvas width-1 (3) | canvas height-1 (3)
    let [w0, w1, w2, h0, h1, h2] = bytes::<6>(buf, PAYLOAD_OFFSET + 4)?;
    let width = u32::from_le_bytes([w0, w1, w2, 0]) + 1;
    let height = u32::from_le_bytes([h0, h1, h2, 0]) + 1;

    Ok(matched(ImageFormat::Webp, width, height))
}
