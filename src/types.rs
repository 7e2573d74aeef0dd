use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

const KB: usize = 1024;
const MB: usize = KB * 1024;

pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;
pub const DEFAULT_INITIAL_WINDOW: usize = 256;
pub const DEFAULT_MAX_BUFFER: usize = MB;

/// Final per-target mapping handed back by [`crate::Engine::batch`].
pub type BatchResult = HashMap<String, ProbeResult>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Ico,
    Cur,
    Psd,
    Tiff,
    Webp,
    Svg,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 10] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Gif,
        ImageFormat::Bmp,
        ImageFormat::Ico,
        ImageFormat::Cur,
        ImageFormat::Psd,
        ImageFormat::Tiff,
        ImageFormat::Webp,
        ImageFormat::Svg,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Ico => "ico",
            ImageFormat::Cur => "cur",
            ImageFormat::Psd => "psd",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Webp => "webp",
            ImageFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageMeta {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl ImageMeta {
    /// Returns `None` unless both dimensions are positive.
    pub fn new(format: ImageFormat, width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self {
            format,
            width,
            height,
        })
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }
}

/// Verdict of a format parser (or the sniffer) over the bytes received so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// At least this many further bytes are required before a verdict.
    NeedMoreBytes(usize),
    Matched(ImageMeta),
    NotThisFormat,
}

impl ParseOutcome {
    #[inline]
    pub fn is_match(&self) -> bool {
        matches!(self, ParseOutcome::Matched(_))
    }
}

/// Per-target entry of a [`BatchResult`].
///
/// Serializes as `{"type":"png","size":[30,20]}` on success and
/// `{"size":"failed"}` on failure; the failure shape deliberately carries no
/// `type` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "WireResult", from = "WireResult")]
pub enum ProbeResult {
    Success {
        format: ImageFormat,
        width: u32,
        height: u32,
    },
    Failed,
}

impl ProbeResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, ProbeResult::Failed)
    }

    pub fn format(&self) -> Option<ImageFormat> {
        match self {
            ProbeResult::Success { format, .. } => Some(*format),
            ProbeResult::Failed => None,
        }
    }

    pub fn size(&self) -> Option<[u32; 2]> {
        match self {
            ProbeResult::Success { width, height, .. } => Some([*width, *height]),
            ProbeResult::Failed => None,
        }
    }
}

impl From<ImageMeta> for ProbeResult {
    fn from(meta: ImageMeta) -> Self {
        ProbeResult::Success {
            format: meta.format,
            width: meta.width,
            height: meta.height,
        }
    }
}

impl<E> From<Result<ImageMeta, E>> for ProbeResult {
    fn from(result: Result<ImageMeta, E>) -> Self {
        result.map_or(ProbeResult::Failed, ProbeResult::from)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireResult {
    Success {
        #[serde(rename = "type")]
        format: ImageFormat,
        size: [u32; 2],
    },
    Failed {
        size: FailedMarker,
    },
}

#[derive(Serialize, Deserialize)]
enum FailedMarker {
    #[serde(rename = "failed")]
    Failed,
}

impl From<ProbeResult> for WireResult {
    fn from(result: ProbeResult) -> Self {
        match result {
            ProbeResult::Success {
                format,
                width,
                height,
            } => WireResult::Success {
                format,
                size: [width, height],
            },
            ProbeResult::Failed => WireResult::Failed {
                size: FailedMarker::Failed,
            },
        }
    }
}

impl From<WireResult> for ProbeResult {
    fn from(wire: WireResult) -> Self {
        match wire {
            WireResult::Success {
                format,
                size: [width, height],
            } => ProbeResult::Success {
                format,
                width,
                height,
            },
            WireResult::Failed { .. } => ProbeResult::Failed,
        }
    }
}
