use super::{Endian, Step, magic, matched, resolve};
use crate::types::{ImageFormat, ParseOutcome};

pub const BMP_SIGNATURE: &[u8; 2] = b"BM";

const DIB_HEADER_OFFSET: usize = 14;
const DIB_WIDTH_OFFSET: usize = 18;
/// OS/2 `BITMAPCOREHEADER` stores 16-bit dimensions.
const CORE_HEADER_SIZE: u32 = 12;

pub fn parse(buf: &[u8]) -> ParseOutcome {
    resolve(read_dib(buf))
}

fn read_dib(buf: &[u8]) -> Step<ParseOutcome> {
    magic(buf, 0, BMP_SIGNATURE)?;

    let header_size = Endian::Little.u32(buf, DIB_HEADER_OFFSET)?;

    if header_size == CORE_HEADER_SIZE {
        let width = Endian::Little.u16(buf, DIB_WIDTH_OFFSET)?;
        let height = Endian::Little.u16(buf, DIB_WIDTH_OFFSET + 2)?;
        return Ok(matched(ImageFormat::Bmp, width as u32, height as u32));
    }

    if header_size < CORE_HEADER_SIZE {
        return Ok(ParseOutcome::NotThisFormat);
    }

    let width = Endian::Little.i32(buf, DIB_WIDTH_OFFSET)?;
    // Negative height marks a top-down bitmap.
    let height = Endian::Little.i32(buf, DIB_WIDTH_OFFSET + 4)?;

    Ok(matched(
        ImageFormat::Bmp,
        width.unsigned_abs(),
        height.unsigned_abs(),
    ))
}
