use super::{Endian, Step, magic, matched, need, resolve};
use crate::types::{ImageFormat, ParseOutcome};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

pub const IHDR_CHUNK_TYPE: &[u8; 4] = b"IHDR";

const IHDR_TYPE_OFFSET: usize = 12;
const WIDTH_OFFSET: usize = 16;
const HEIGHT_OFFSET: usize = 20;
const IHDR_END: usize = 24;

pub fn parse(buf: &[u8]) -> ParseOutcome {
    resolve(read_ihdr(buf))
}

fn read_ihdr(buf: &[u8]) -> Step<ParseOutcome> {
    magic(buf, 0, &PNG_SIGNATURE)?;
    // IHDR must be the first chunk
    magic(buf, IHDR_TYPE_OFFSET, IHDR_CHUNK_TYPE)?;
    need(buf, IHDR_END)?;

    let width = Endian::Big.u32(buf, WIDTH_OFFSET)?;
    let height = Endian::Big.u32(buf, HEIGHT_OFFSET)?;

    Ok(matched(ImageFormat::Png, width, height))
}
