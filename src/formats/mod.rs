//! Format parsers.
//!
//! Each parser looks at the bytes received so far and answers with a
//! [`ParseOutcome`]. A parser never reads past the end of the buffer: any
//! access beyond it short-circuits into `NeedMoreBytes` with the exact shortfall.

pub mod bmp;
pub mod gif;
pub mod ico;
pub mod jpeg;
pub mod png;
pub mod psd;
pub mod svg;
pub mod tiff;
pub mod webp;

use crate::types::{ImageFormat, ImageMeta, ParseOutcome};

/// Intermediate result inside a parser; `Err` carries the final verdict early.
pub(crate) type Step<T> = Result<T, ParseOutcome>;

#[inline]
pub(crate) fn resolve(step: Step<ParseOutcome>) -> ParseOutcome {
    step.unwrap_or_else(|outcome| outcome)
}

#[inline]
pub(crate) fn need(buf: &[u8], end: usize) -> Step<()> {
    if buf.len() >= end {
        Ok(())
    } else {
        Err(ParseOutcome::NeedMoreBytes(end - buf.len()))
    }
}

/// Checks `sig` at `offset`, rejecting as soon as an available byte differs.
pub(crate) fn magic(buf: &[u8], offset: usize, sig: &[u8]) -> Step<()> {
    let end = offset + sig.len();
    let avail = buf.len().min(end);
    if avail > offset && buf[offset..avail] != sig[..avail - offset] {
        return Err(ParseOutcome::NotThisFormat);
    }
    need(buf, end)
}

#[inline]
pub(crate) fn matched(format: ImageFormat, width: u32, height: u32) -> ParseOutcome {
    ImageMeta::new(format, width, height).map_or(ParseOutcome::NotThisFormat, ParseOutcome::Matched)
}

#[inline]
pub(crate) fn bytes<const N: usize>(buf: &[u8], at: usize) -> Step<[u8; N]> {
    need(buf, at + N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[at..at + N]);
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Endian {
    Little,
    Big,
}

impl Endian {
    #[inline]
    pub(crate) fn u16(self, buf: &[u8], at: usize) -> Step<u16> {
        let raw = bytes::<2>(buf, at)?;
        Ok(match self {
            Endian::Little => u16::from_le_bytes(raw),
            Endian::Big => u16::from_be_bytes(raw),
        })
    }

    #[inline]
    pub(crate) fn u32(self, buf: &[u8], at: usize) -> Step<u32> {
        let raw = bytes::<4>(buf, at)?;
        Ok(match self {
            Endian::Little => u32::from_le_bytes(raw),
            Endian::Big => u32::from_be_bytes(raw),
        })
    }

    #[inline]
    pub(crate) fn i32(self, buf: &[u8], at: usize) -> Step<i32> {
        self.u32(buf, at).map(|v| v as i32)
    }
}
