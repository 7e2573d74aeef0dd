//! Textual sniff for an `<svg>` root element.
//!
//! Leading whitespace, a UTF-8 BOM, the XML declaration, processing
//! instructions, a DOCTYPE and comments are skipped. Any other element in
//! front of `<svg` means the document is not an SVG image.

use memchr::{memchr, memmem};

use super::{Step, matched, need, resolve};
use crate::types::{ImageFormat, ParseOutcome};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const SVG_OPEN: &[u8; 4] = b"<svg";

/// Bytes requested whenever the markup is cut short; text gives no length hint.
pub const SVG_READ_STEP: usize = 512;

pub fn parse(buf: &[u8]) -> ParseOutcome {
    resolve(find_root(buf))
}

#[inline]
fn more() -> ParseOutcome {
    ParseOutcome::NeedMoreBytes(SVG_READ_STEP)
}

fn find_root(buf: &[u8]) -> Step<ParseOutcome> {
    let mut pos = skip_bom(buf)?;

    loop {
        while pos < buf.len() && buf[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos == buf.len() {
            return Err(more());
        }
        if buf[pos] != b'<' {
            return Ok(ParseOutcome::NotThisFormat);
        }
        need(buf, pos + SVG_OPEN.len() + 1)?;

        let rest = &buf[pos..];
        pos = if rest.starts_with(b"<!--") {
            pos + 4 + skip_past(&rest[4..], b"-->")?
        } else if rest.starts_with(b"<?") {
            pos + 2 + skip_past(&rest[2..], b"?>")?
        } else if rest.starts_with(b"<!") {
            pos + 2 + skip_declaration(&rest[2..])?
        } else if rest.starts_with(SVG_OPEN) && is_name_end(rest[SVG_OPEN.len()]) {
            return read_root_tag(&rest[SVG_OPEN.len()..]);
        } else {
            return Ok(ParseOutcome::NotThisFormat);
        };
    }
}

fn skip_bom(buf: &[u8]) -> Step<usize> {
    let avail = buf.len().min(UTF8_BOM.len());
    if buf[..avail] == UTF8_BOM[..avail] {
        need(buf, UTF8_BOM.len())?;
        Ok(UTF8_BOM.len())
    } else {
        Ok(0)
    }
}

/// Offset just past the first `terminator` in `haystack`.
fn skip_past(haystack: &[u8], terminator: &[u8]) -> Step<usize> {
    memmem::find(haystack, terminator)
        .map(|idx| idx + terminator.len())
        .ok_or_else(more)
}

/// Offset just past the `>` closing a `<!...>` declaration. Quoted literals
/// and a DOCTYPE internal subset in `[...]` may hold their own `>`.
fn skip_declaration(haystack: &[u8]) -> Step<usize> {
    let mut pos = 0;
    let mut in_subset = false;
    loop {
        let byte = *haystack.get(pos).ok_or_else(more)?;
        match byte {
            b'"' | b'\'' => {
                let close = memchr(byte, &haystack[pos + 1..]).ok_or_else(more)?;
                pos += close + 1;
            }
            b'<' if in_subset && haystack[pos..].starts_with(b"<!--") => {
                pos += 3 + skip_past(&haystack[pos + 4..], b"-->")?;
            }
            b'[' if !in_subset => in_subset = true,
            b']' if in_subset => in_subset = false,
            b'>' if !in_subset => return Ok(pos + 1),
            _ => {}
        }
        pos += 1;
    }
}

#[inline]
fn is_name_end(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == b'>' || byte == b'/'
}

/// `tail` starts right after `<svg`; waits until the whole start tag is present.
fn read_root_tag(tail: &[u8]) -> Step<ParseOutcome> {
    let tag = start_tag_body(tail)?;
    let attrs = Attributes::parse(tag);

    let width = attrs.width.and_then(parse_length);
    let height = attrs.height.and_then(parse_length);
    let view_box = attrs
        .view_box
        .and_then(parse_view_box)
        .filter(|&(w, h)| w > 0.0 && h > 0.0);

    // A single explicit side keeps the viewBox aspect ratio.
    let (width, height) = match (width, height, view_box) {
        (Some(w), Some(h), _) => (w, h),
        (Some(w), None, Some((vw, vh))) => (w, w * vh / vw),
        (None, Some(h), Some((vw, vh))) => (h * vw / vh, h),
        (None, None, Some(dims)) => dims,
        _ => return Ok(ParseOutcome::NotThisFormat),
    };

    Ok(matched(ImageFormat::Svg, to_pixels(width), to_pixels(height)))
}

/// Bytes up to the `>` closing the start tag, ignoring `>` inside quoted values.
fn start_tag_body(tail: &[u8]) -> Step<&[u8]> {
    let mut pos = 0;
    loop {
        let rel = tail[pos..]
            .iter()
            .position(|&b| b == b'>' || b == b'"' || b == b'\'')
            .ok_or_else(more)?;
        let idx = pos + rel;
        let byte = tail[idx];
        if byte == b'>' {
            return Ok(&tail[..idx]);
        }
        let close = memchr(byte, &tail[idx + 1..]).ok_or_else(more)?;
        pos = idx + 1 + close + 1;
    }
}

#[derive(Debug, Default)]
struct Attributes<'a> {
    width: Option<&'a [u8]>,
    height: Option<&'a [u8]>,
    view_box: Option<&'a [u8]>,
}

impl<'a> Attributes<'a> {
    fn parse(tag: &'a [u8]) -> Self {
        let mut attrs = Self::default();
        let mut pos = 0;

        while pos < tag.len() {
            while pos < tag.len() && (tag[pos].is_ascii_whitespace() || tag[pos] == b'/') {
                pos += 1;
            }
            let name_start = pos;
            while pos < tag.len() && !tag[pos].is_ascii_whitespace() && tag[pos] != b'=' {
                pos += 1;
            }
            let name = &tag[name_start..pos];
            if name.is_empty() {
                break;
            }

            while pos < tag.len() && tag[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos >= tag.len() || tag[pos] != b'=' {
                // Bare attribute without a value
                continue;
            }
            pos += 1;
            while pos < tag.len() && tag[pos].is_ascii_whitespace() {
                pos += 1;
            }

            let value = if pos < tag.len() && (tag[pos] == b'"' || tag[pos] == b'\'') {
                let quote = tag[pos];
                let start = pos + 1;
                let end = memchr(quote, &tag[start..]).map_or(tag.len(), |i| start + i);
                pos = (end + 1).min(tag.len());
                &tag[start..end]
            } else {
                let start = pos;
                while pos < tag.len() && !tag[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                &tag[start..pos]
            };

            if name.eq_ignore_ascii_case(b"width") {
                attrs.width = Some(value);
            } else if name.eq_ignore_ascii_case(b"height") {
                attrs.height = Some(value);
            } else if name.eq_ignore_ascii_case(b"viewBox") {
                attrs.view_box = Some(value);
            }
        }

        attrs
    }
}

/// Numeric prefix plus an absolute CSS unit, in CSS pixels. Percentages and
/// font-relative units have no intrinsic size.
fn parse_length(raw: &[u8]) -> Option<f64> {
    let text = std::str::from_utf8(raw).ok()?.trim();
    let boundary = text
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(text.len());
    let value: f64 = text[..boundary].parse().ok()?;

    let factor = match text[boundary..].trim().to_ascii_lowercase().as_str() {
        "" | "px" => 1.0,
        "pt" => 96.0 / 72.0,
        "pc" => 16.0,
        "in" => 96.0,
        "cm" => 96.0 / 2.54,
        "mm" => 96.0 / 25.4,
        _ => return None,
    };
    Some(value * factor)
}

/// `min-x min-y width height`: the box spans `maxX - minX` by `maxY - minY`,
/// which is the third and fourth number.
fn parse_view_box(raw: &[u8]) -> Option<(f64, f64)> {
    let text = std::str::from_utf8(raw).ok()?;
    let mut nums = text
        .split(|c: char| c.is_ascii_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().ok());

    let _min_x = nums.next()??;
    let _min_y = nums.next()??;
    let width = nums.next()??;
    let height = nums.next()??;
    Some((width, height))
}

#[inline]
fn to_pixels(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}
