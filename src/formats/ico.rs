use super::{Endian, Step, bytes, matched, need, resolve};
use crate::types::{ImageFormat, ParseOutcome};

pub const ICO_SIGNATURE: [u8; 4] = [0x00, 0x00, 0x01, 0x00];
pub const CUR_SIGNATURE: [u8; 4] = [0x00, 0x00, 0x02, 0x00];

const COUNT_OFFSET: usize = 4;
const FIRST_ENTRY_OFFSET: usize = 6;

/// Icons and cursors share one container; the resource type word tells them apart.
pub fn parse(buf: &[u8]) -> ParseOutcome {
    resolve(read_directory(buf))
}

fn read_directory(buf: &[u8]) -> Step<ParseOutcome> {
    let format = match_signature(buf)?;

    let count = Endian::Little.u16(buf, COUNT_OFFSET)?;
    if count == 0 {
        return Ok(ParseOutcome::NotThisFormat);
    }

    let [width, height] = bytes::<2>(buf, FIRST_ENTRY_OFFSET)?;

    Ok(matched(format, entry_dimension(width), entry_dimension(height)))
}

fn match_signature(buf: &[u8]) -> Step<ImageFormat> {
    let avail = buf.len().min(ICO_SIGNATURE.len());
    let prefix = &buf[..avail];
    let ico = ICO_SIGNATURE.starts_with(prefix);
    let cur = CUR_SIGNATURE.starts_with(prefix);

    if !ico && !cur {
        return Err(ParseOutcome::NotThisFormat);
    }
    need(buf, ICO_SIGNATURE.len())?;

    Ok(if ico { ImageFormat::Ico } else { ImageFormat::Cur })
}

/// A stored 0 means 256 pixels.
#[inline]
fn entry_dimension(raw: u8) -> u32 {
    if raw == 0 { 256 } else { raw as u32 }
}
