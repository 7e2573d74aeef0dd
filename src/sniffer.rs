//! Ordered signature dispatch over the format parsers.
//!
//! Fixed-offset binary signatures come first, cheapest check first; the SVG
//! sniff scans text and therefore runs last.

use crate::formats::{bmp, gif, ico, jpeg, png, psd, svg, tiff, webp};
use crate::types::{ImageFormat, ParseOutcome};

pub type ParseFn = fn(&[u8]) -> ParseOutcome;

/// One row of the dispatch table. `formats` lists every tag the parser can
/// report (the ICO parser also recognises cursors).
#[derive(Clone, Copy)]
pub struct FormatProbe {
    pub name: &'static str,
    pub formats: &'static [ImageFormat],
    pub parse: ParseFn,
}

pub static PROBES: [FormatProbe; 9] = [
    FormatProbe {
        name: "bmp",
        formats: &[ImageFormat::Bmp],
        parse: bmp::parse,
    },
    FormatProbe {
        name: "jpeg",
        formats: &[ImageFormat::Jpeg],
        parse: jpeg::parse,
    },
    FormatProbe {
        name: "gif",
        formats: &[ImageFormat::Gif],
        parse: gif::parse,
    },
    FormatProbe {
        name: "png",
        formats: &[ImageFormat::Png],
        parse: png::parse,
    },
    FormatProbe {
        name: "ico",
        formats: &[ImageFormat::Ico, ImageFormat::Cur],
        parse: ico::parse,
    },
    FormatProbe {
        name: "psd",
        formats: &[ImageFormat::Psd],
        parse: psd::parse,
    },
    FormatProbe {
        name: "tiff",
        formats: &[ImageFormat::Tiff],
        parse: tiff::parse,
    },
    FormatProbe {
        name: "webp",
        formats: &[ImageFormat::Webp],
        parse: webp::parse,
    },
    FormatProbe {
        name: "svg",
        formats: &[ImageFormat::Svg],
        parse: svg::parse,
    },
];

/// Runs every parser over `buf` in table order.
///
/// The first `Matched` wins. If every parser rejects the buffer the result is
/// `NotThisFormat`. Otherwise the largest shortfall among the parsers still
/// undecided is returned, so a single follow-up read satisfies all of them.
pub fn sniff(buf: &[u8]) -> ParseOutcome {
    sniff_with(&PROBES, buf)
}

pub fn sniff_with(probes: &[FormatProbe], buf: &[u8]) -> ParseOutcome {
    let mut shortfall: Option<usize> = None;

    for probe in probes {
        match (probe.parse)(buf) {
            ParseOutcome::Matched(meta) => return ParseOutcome::Matched(meta),
            ParseOutcome::NeedMoreBytes(n) => {
                shortfall = Some(shortfall.map_or(n, |cur| cur.max(n)));
            }
            ParseOutcome::NotThisFormat => {}
        }
    }

    match shortfall {
        Some(n) => ParseOutcome::NeedMoreBytes(n.max(1)),
        None => ParseOutcome::NotThisFormat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_needs_bytes() {
        assert!(matches!(sniff(&[]), ParseOutcome::NeedMoreBytes(n) if n > 0));
    }

    #[test]
    fn test_plain_text_is_rejected() {
        assert_eq!(sniff(b"hello, world this is not an image"), ParseOutcome::NotThisFormat);
    }

    #[test]
    fn test_html_document_is_rejected() {
        assert_eq!(
            sniff(b"<!DOCTYPE html><html><body>404</body></html>"),
            ParseOutcome::NotThisFormat
        );
    }

    #[test]
    fn test_shortfall_is_maximum_of_candidates() {
        // "GIF8" needs 10 bytes total; nothing else survives a 'G' prefix.
        assert_eq!(sniff(b"GIF8"), ParseOutcome::NeedMoreBytes(6));
    }

    #[test]
    fn test_table_covers_every_format() {
        for format in ImageFormat::ALL {
            assert!(
                PROBES.iter().any(|p| p.formats.contains(&format)),
                "{format} has no parser"
            );
        }
        assert_eq!(PROBES.last().map(|p| p.name), Some("svg"));
    }
}
