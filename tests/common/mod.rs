//! Byte-level image headers shared by the integration tests.
//!
//! Each builder emits just enough of a real file for the header to be
//! complete, followed by filler standing in for pixel data.

#![allow(dead_code)]

use fastprobe::{EngineConfig, ImageFormat, MemoryTransport};

pub const FIXTURE_HOST: &str = "https://fixtures.test/";

pub fn url(name: &str) -> String {
    format!("{FIXTURE_HOST}{name}")
}

fn filler(out: &mut Vec<u8>, len: usize) {
    out.extend((0..len).map(|i| (i * 31 % 251) as u8));
}

pub fn jpeg(width: u16, height: u16) -> Vec<u8> {
    jpeg_with_app_padding(width, height, 0)
}

/// Baseline JPEG with a JFIF APP0, an optional APP1 of `padding` payload
/// bytes, a comment and the SOF0 frame header.
pub fn jpeg_with_app_padding(width: u16, height: u16, padding: usize) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];

    out.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    out.extend_from_slice(b"JFIF\x00\x01\x01\x00\x00\x48\x00\x48\x00\x00");

    let mut remaining = padding;
    while remaining > 0 {
        let chunk = remaining.min(0xFFFF - 2);
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&((chunk + 2) as u16).to_be_bytes());
        filler(&mut out, chunk);
        remaining -= chunk;
    }

    let comment = b"made by hand";
    out.extend_from_slice(&[0xFF, 0xFE]);
    out.extend_from_slice(&((comment.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(comment);

    out.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
    out.extend_from_slice(&height.to_be_bytes());
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);

    out.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x0C, 0x03, 0x01, 0x00, 0x02, 0x11, 0x03, 0x11, 0x00, 0x3F, 0x00]);
    filler(&mut out, 2048);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// Segments of maximum length forever, never reaching a frame header.
pub fn jpeg_endless_segments(total: usize) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    while out.len() < total {
        out.extend_from_slice(&[0xFF, 0xE2, 0xFF, 0xFF]);
        filler(&mut out, 0xFFFF - 2);
    }
    out
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    out.extend_from_slice(&13u32.to_be_bytes());
    out.extend_from_slice(b"IHDR");
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    out.extend_from_slice(&[0x08, 0x02, 0x00, 0x00, 0x00]);
    out.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(b"IEND");
    out.extend_from_slice(&[0xAE, 0x42, 0x60, 0x82]);
    out
}

pub fn gif(width: u16, height: u16) -> Vec<u8> {
    let mut out = b"GIF89a".to_vec();
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&[0x80, 0x00, 0x00]);
    filler(&mut out, 64);
    out.push(b';');
    out
}

fn bmp_file_header(out: &mut Vec<u8>, dib_len: u32) {
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(14 + dib_len + 64).to_le_bytes());
    out.extend_from_slice(&[0, 0, 0, 0]);
    out.extend_from_slice(&(14 + dib_len).to_le_bytes());
}

/// `BITMAPINFOHEADER`; a negative height stores the rows top-down.
pub fn bmp(width: i32, height: i32) -> Vec<u8> {
    let mut out = Vec::new();
    bmp_file_header(&mut out, 40);
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&[0u8; 24]);
    filler(&mut out, 64);
    out
}

/// OS/2 `BITMAPCOREHEADER` with 16-bit dimensions.
pub fn bmp_os2(width: u16, height: u16) -> Vec<u8> {
    let mut out = Vec::new();
    bmp_file_header(&mut out, 12);
    out.extend_from_slice(&12u32.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    filler(&mut out, 64);
    out
}

fn icon_directory(kind: u16, entries: &[(u8, u8)]) -> Vec<u8> {
    let mut out = vec![0x00, 0x00];
    out.extend_from_slice(&kind.to_le_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    let data_start = 6 + entries.len() as u32 * 16;
    for (index, &(w, h)) in entries.iter().enumerate() {
        out.extend_from_slice(&[w, h, 0, 0]);
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&32u16.to_le_bytes());
        out.extend_from_slice(&64u32.to_le_bytes());
        out.extend_from_slice(&(data_start + index as u32 * 64).to_le_bytes());
    }
    filler(&mut out, entries.len() * 64);
    out
}

/// Icon whose first directory entry is `width` x `height` (0 = 256).
pub fn ico(width: u8, height: u8) -> Vec<u8> {
    icon_directory(1, &[(width, height), (48, 48)])
}

pub fn cur(width: u8, height: u8) -> Vec<u8> {
    icon_directory(2, &[(width, height)])
}

pub fn psd(width: u32, height: u32) -> Vec<u8> {
    let mut out = b"8BPS".to_vec();
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&[0u8; 6]);
    out.extend_from_slice(&3u16.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&8u16.to_be_bytes());
    out.extend_from_slice(&3u16.to_be_bytes());
    filler(&mut out, 128);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffValue {
    Short(u16),
    Long(u32),
    Ascii,
}

/// Single-IFD TIFF. Extra tags go before the dimension tags, the way
/// encoders emit `NewSubfileType` first.
pub fn tiff(little_endian: bool, width: TiffValue, height: TiffValue, extra_tags: u16) -> Vec<u8> {
    let u16b = |v: u16| if little_endian { v.to_le_bytes() } else { v.to_be_bytes() };
    let u32b = |v: u32| if little_endian { v.to_le_bytes() } else { v.to_be_bytes() };

    let mut out = if little_endian {
        b"II\x2A\x00".to_vec()
    } else {
        b"MM\x00\x2A".to_vec()
    };
    out.extend_from_slice(&u32b(8));

    let count = extra_tags + 2;
    out.extend_from_slice(&u16b(count));

    for index in 0..extra_tags {
        // LONG zero tags ending at NewSubfileType (254)
        out.extend_from_slice(&u16b(255u16.saturating_sub(extra_tags) + index));
        out.extend_from_slice(&u16b(4));
        out.extend_from_slice(&u32b(1));
        out.extend_from_slice(&u32b(0));
    }

    for (tag, value) in [(256u16, width), (257u16, height)] {
        out.extend_from_slice(&u16b(tag));
        match value {
            TiffValue::Short(v) => {
                out.extend_from_slice(&u16b(3));
                out.extend_from_slice(&u32b(1));
                out.extend_from_slice(&u16b(v));
                out.extend_from_slice(&[0, 0]);
            }
            TiffValue::Long(v) => {
                out.extend_from_slice(&u16b(4));
                out.extend_from_slice(&u32b(1));
                out.extend_from_slice(&u32b(v));
            }
            TiffValue::Ascii => {
                out.extend_from_slice(&u16b(2));
                out.extend_from_slice(&u32b(4));
                out.extend_from_slice(b"abc\0");
            }
        }
    }

    out.extend_from_slice(&u32b(0));
    filler(&mut out, 256);
    out
}

fn riff(chunk: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&((4 + 8 + payload.len()) as u32).to_le_bytes());
    out.extend_from_slice(b"WEBP");
    out.extend_from_slice(chunk);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn webp_vp8(width: u16, height: u16) -> Vec<u8> {
    let mut payload = vec![0x30, 0x01, 0x00, 0x9D, 0x01, 0x2A];
    payload.extend_from_slice(&width.to_le_bytes());
    payload.extend_from_slice(&height.to_le_bytes());
    filler(&mut payload, 64);
    riff(b"VP8 ", &payload)
}

pub fn webp_vp8l(width: u32, height: u32) -> Vec<u8> {
    let bits = (width - 1) | ((height - 1) << 14) | (1 << 28);
    let mut payload = vec![0x2F];
    payload.extend_from_slice(&bits.to_le_bytes());
    filler(&mut payload, 64);
    riff(b"VP8L", &payload)
}

pub fn webp_vp8x(width: u32, height: u32) -> Vec<u8> {
    let mut payload = vec![0x10, 0x00, 0x00, 0x00];
    payload.extend_from_slice(&(width - 1).to_le_bytes()[..3]);
    payload.extend_from_slice(&(height - 1).to_le_bytes()[..3]);
    riff(b"VP8X", &payload)
}

pub const SVG_VIEWBOX_ONLY: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 36 36"><circle fill="#FFCC4D" cx="18" cy="18" r="18"/></svg>"##;

pub const SVG_VIEWBOX_PADDED: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 -30 36 96"><ellipse cx="18" cy="18" rx="18" ry="48"/></svg>"#;

pub const SVG_DIMENSIONS_AND_OFFSET_VIEWBOX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg width="36" height="42" viewBox="10 10 36 36" xmlns="http://www.w3.org/2000/svg">
  <circle cx="28" cy="28" r="18"/>
</svg>
"#;

pub const SVG_TAG_COMMENTED_OUT: &str = r#"<?xml version="1.0"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<!-- <svg width="100" height="100"> an older revision -->
<svg xmlns="http://www.w3.org/2000/svg" width="38px" height='44px'>
  <rect width="38" height="44"/>
</svg>
"#;

pub const SVG_NO_DIMENSIONS: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="1" height="1"/></svg>"#;

pub const HTML_PAGE: &str = "<!DOCTYPE html>\n<html><head><title>404 Not Found</title></head><body>nope</body></html>\n";

/// One fixture: name, body, expected format and size.
pub struct Fixture {
    pub name: &'static str,
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub size: [u32; 2],
}

/// One fixture per supported tag and layout, with the dimensions of the
/// well-known public test images.
pub fn all_fixtures() -> Vec<Fixture> {
    let fixture = |name, data, format, size| Fixture {
        name,
        data,
        format,
        size,
    };

    vec![
        fixture("exif_orientation.jpg", jpeg_with_app_padding(600, 450, 8_000), ImageFormat::Jpeg, [600, 450]),
        fixture("test.png", png(30, 20), ImageFormat::Png, [30, 20]),
        fixture("test.gif", gif(17, 32), ImageFormat::Gif, [17, 32]),
        fixture("test2.bmp", bmp(1920, 1080), ImageFormat::Bmp, [1920, 1080]),
        fixture("top_down.bmp", bmp(40, -27), ImageFormat::Bmp, [40, 27]),
        fixture("os2.bmp", bmp_os2(40, 27), ImageFormat::Bmp, [40, 27]),
        fixture("favicon.ico", ico(16, 16), ImageFormat::Ico, [16, 16]),
        fixture("large.ico", ico(0, 0), ImageFormat::Ico, [256, 256]),
        fixture("test.cur", cur(32, 32), ImageFormat::Cur, [32, 32]),
        fixture("test.psd", psd(17, 32), ImageFormat::Psd, [17, 32]),
        fixture("test.tiff", tiff(false, TiffValue::Short(85), TiffValue::Short(67), 1), ImageFormat::Tiff, [85, 67]),
        fixture("test_le.tiff", tiff(true, TiffValue::Long(85), TiffValue::Long(67), 3), ImageFormat::Tiff, [85, 67]),
        fixture("webp_vp8.webp", webp_vp8(550, 368), ImageFormat::Webp, [550, 368]),
        fixture("webp_vp8l.webp", webp_vp8l(386, 395), ImageFormat::Webp, [386, 395]),
        fixture("webp_vp8x.webp", webp_vp8x(386, 395), ImageFormat::Webp, [386, 395]),
        fixture("1f642.svg", SVG_VIEWBOX_ONLY.into(), ImageFormat::Svg, [36, 36]),
        fixture("smiley-oval-vertical-padding.svg", SVG_VIEWBOX_PADDED.into(), ImageFormat::Svg, [36, 96]),
        fixture("smiley-with-dimensions.svg", SVG_DIMENSIONS_AND_OFFSET_VIEWBOX.into(), ImageFormat::Svg, [36, 42]),
        fixture("svg-tag-commented-out.svg", SVG_TAG_COMMENTED_OUT.into(), ImageFormat::Svg, [38, 44]),
    ]
}

/// Memory transport serving every fixture under [`FIXTURE_HOST`].
pub fn fixture_transport() -> MemoryTransport {
    all_fixtures()
        .into_iter()
        .fold(MemoryTransport::new(), |transport, f| transport.with(url(f.name), f.data))
}

/// Small windows so that most fixtures need several growth steps.
pub fn small_window_config() -> EngineConfig {
    EngineConfig {
        initial_window: 8,
        ..EngineConfig::default()
    }
}
