use super::{Endian, Step, magic, matched, need, resolve};
use crate::types::{ImageFormat, ParseOutcome};

pub const PSD_SIGNATURE: &[u8; 4] = b"8BPS";

// signature(4) | version(2) | reserved(6) | channels(2) | height(4) | width(4)
const HEIGHT_OFFSET: usize = 14;
const WIDTH_OFFSET: usize = 18;
const HEADER_LEN: usize = 22;

pub fn parse(buf: &[u8]) -> ParseOutcome {
    resolve(read_header(buf))
}

fn read_header(buf: &[u8]) -> Step<ParseOutcome> {
    magic(buf, 0, PSD_SIGNATURE)?;
    need(buf, HEADER_LEN)?;

    let height = Endian::Big.u32(buf, HEIGHT_OFFSET)?;
    let width = Endian::Big.u32(buf, WIDTH_OFFSET)?;

    Ok(matched(ImageFormat::Psd, width, height))
}
