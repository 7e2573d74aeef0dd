use super::{Endian, Step, matched, need, resolve};
use crate::types::{ImageFormat, ParseOutcome};

pub const TIFF_LE_SIGNATURE: [u8; 4] = [0x49, 0x49, 0x2A, 0x00];
pub const TIFF_BE_SIGNATURE: [u8; 4] = [0x4D, 0x4D, 0x00, 0x2A];

pub const TAG_IMAGE_WIDTH: u16 = 256;
pub const TAG_IMAGE_LENGTH: u16 = 257;

const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;

const HEADER_LEN: usize = 8;
const IFD_ENTRY_LEN: usize = 12;

pub fn parse(buf: &[u8]) -> ParseOutcome {
    resolve(read_first_ifd(buf))
}

fn byte_order(buf: &[u8]) -> Step<Endian> {
    let avail = buf.len().min(TIFF_LE_SIGNATURE.len());
    let prefix = &buf[..avail];

    let endian = if TIFF_LE_SIGNATURE.starts_with(prefix) {
        Endian::Little
    } else if TIFF_BE_SIGNATURE.starts_with(prefix) {
        Endian::Big
    } else {
        return Err(ParseOutcome::NotThisFormat);
    };
    need(buf, TIFF_LE_SIGNATURE.len())?;
    Ok(endian)
}

/// Scans IFD0 entry by entry, so a directory that lists both tags early
/// resolves without waiting for the rest of it. When an entry is cut off the
/// whole remaining directory is requested in one step.
fn read_first_ifd(buf: &[u8]) -> Step<ParseOutcome> {
    let endian = byte_order(buf)?;

    let ifd_offset = endian.u32(buf, 4)? as usize;
    if ifd_offset < HEADER_LEN {
        return Ok(ParseOutcome::NotThisFormat);
    }

    let entry_count = endian.u16(buf, ifd_offset)? as usize;
    let dir_end = ifd_offset + 2 + entry_count * IFD_ENTRY_LEN;
    let mut width = None;
    let mut height = None;

    for index in 0..entry_count {
        let entry = ifd_offset + 2 + index * IFD_ENTRY_LEN;
        if buf.len() < entry + IFD_ENTRY_LEN {
            need(buf, dir_end)?;
        }

        let tag = endian.u16(buf, entry)?;
        if tag != TAG_IMAGE_WIDTH && tag != TAG_IMAGE_LENGTH {
            continue;
        }

        let value = match endian.u16(buf, entry + 2)? {
            TYPE_SHORT => endian.u16(buf, entry + 8)? as u32,
            TYPE_LONG => endian.u32(buf, entry + 8)?,
            _ => continue,
        };

        if tag == TAG_IMAGE_WIDTH {
            width = Some(value);
        } else {
            height = Some(value);
        }

        if let (Some(w), Some(h)) = (width, height) {
            return Ok(matched(ImageFormat::Tiff, w, h));
        }
    }

    Ok(ParseOutcome::NotThisFormat)
}
