use super::{Endian, Step, magic, matched, need, resolve};
use crate::types::{ImageFormat, ParseOutcome};

pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

const MARKER_PREFIX: u8 = 0xFF;
const MARKER_TEM: u8 = 0x01;
const MARKER_SOI: u8 = 0xD8;
const MARKER_EOI: u8 = 0xD9;
const MARKER_SOS: u8 = 0xDA;

/// Start-Of-Frame markers carry the frame dimensions. `C4`, `C8` and `CC`
/// share the range but are DHT, JPG and DAC respectively.
#[inline]
pub fn is_sof_marker(marker: u8) -> bool {
    matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC)
}

#[inline]
fn is_standalone_marker(marker: u8) -> bool {
    matches!(marker, MARKER_TEM | MARKER_SOI | 0xD0..=0xD7)
}

pub fn parse(buf: &[u8]) -> ParseOutcome {
    resolve(walk_segments(buf))
}

fn walk_segments(buf: &[u8]) -> Step<ParseOutcome> {
    magic(buf, 0, &JPEG_SOI)?;

    let mut pos = 2;

    loop {
        need(buf, pos + 2)?;

        if buf[pos] != MARKER_PREFIX {
            return Ok(ParseOutcome::NotThisFormat);
        }

        let marker = buf[pos + 1];

        // Fill bytes: any number of 0xFF may precede a marker.
        if marker == MARKER_PREFIX {
            pos += 1;
            continue;
        }

        if is_standalone_marker(marker) {
            pos += 2;
            continue;
        }

        // Scan data or end of image before a frame header: nothing to find.
        if marker == MARKER_SOS || marker == MARKER_EOI || marker == 0x00 {
            return Ok(ParseOutcome::NotThisFormat);
        }

        let seg_len = Endian::Big.u16(buf, pos + 2)? as usize;
        if seg_len < 2 {
            return Ok(ParseOutcome::NotThisFormat);
        }

        if is_sof_marker(marker) {
            // FF Cx | length(2) | precision(1) | height(2) | width(2)
            let height = Endian::Big.u16(buf, pos + 5)?;
            let width = Endian::Big.u16(buf, pos + 7)?;
            return Ok(matched(ImageFormat::Jpeg, width as u32, height as u32));
        }

        pos += 2 + seg_len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sof_marker_range() {
        assert!(is_sof_marker(0xC0));
        assert!(is_sof_marker(0xC2));
        assert!(is_sof_marker(0xCF));
        assert!(!is_sof_marker(0xC4));
        assert!(!is_sof_marker(0xC8));
        assert!(!is_sof_marker(0xCC));
        assert!(!is_sof_marker(0xDB));
    }

    #[test]
    fn test_segment_skip_requests_exact_shortfall() {
        // APP0 announcing 0x20 bytes; next marker begins at 2 + 2 + 0x20 = 36
        let buf = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x20, 0x00];
        assert_eq!(parse(&buf), ParseOutcome::NeedMoreBytes(36 + 2 - buf.len()));
    }
}
