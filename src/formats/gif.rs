use super::{Endian, Step, magic, matched, need, resolve};
use crate::types::{ImageFormat, ParseOutcome};

/// Shared prefix of `GIF87a` and `GIF89a`.
pub const GIF_SIGNATURE: &[u8; 4] = b"GIF8";

// Logical screen descriptor follows the 6-byte header.
const SCREEN_WIDTH_OFFSET: usize = 6;
const SCREEN_HEIGHT_OFFSET: usize = 8;
const HEADER_LEN: usize = 10;

pub fn parse(buf: &[u8]) -> ParseOutcome {
    resolve(read_screen(buf))
}

fn read_screen(buf: &[u8]) -> Step<ParseOutcome> {
    magic(buf, 0, GIF_SIGNATURE)?;
    need(buf, HEADER_LEN)?;

    let width = Endian::Little.u16(buf, SCREEN_WIDTH_OFFSET)?;
    let height = Endian::Little.u16(buf, SCREEN_HEIGHT_OFFSET)?;

    Ok(matched(ImageFormat::Gif, width as u32, height as u32))
}
