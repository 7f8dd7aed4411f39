//! Segmented JSON manifest model.
//!
//! A manifest lists independently selectable video and audio renditions. Each
//! rendition carries its own base URL, a base64 init segment and an ordered
//! list of timed segments. Values are immutable once parsed; only the
//! ranking step reorders the two rendition lists.

pub mod parser;

pub use parser::parse_manifest;

/// Stand-in for a missing rendition or clip id when naming output files.
pub const PLACEHOLDER_ID: &str = "NO_ID";

/// Rendition media kind, used in output filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Video,
    Audio,
}

impl ContentType {
    pub fn label(self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Audio => "audio",
        }
    }
}

/// One time-bounded chunk of a rendition.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    /// Possibly relative to the owning rendition's base URL
    pub url: String,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Fields shared by every rendition regardless of media kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    /// Filename-safe id (placeholder when the manifest has none)
    pub id: String,
    /// Possibly relative to the manifest base URL
    pub base_url: String,
    /// Decoded initialization segment
    pub init_segment: Vec<u8>,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoRendition {
    pub stream: Stream,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub bitrate: Option<u64>,
    pub avg_bitrate: Option<u64>,
    pub codecs: Option<String>,
}

impl VideoRendition {
    /// Pixel area used as the ranking key. Missing dimensions count as 1.
    pub fn area(&self) -> u128 {
        u128::from(self.width.unwrap_or(1)) * u128::from(self.height.unwrap_or(1))
    }

    /// `{width}x{height}`, only when both dimensions are known.
    pub fn resolution(&self) -> Option<String> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(format!("{}x{}", w, h)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioRendition {
    pub stream: Stream,
    pub channels: Option<u64>,
    pub bitrate: Option<u64>,
    pub sample_rate: Option<u64>,
}

impl AudioRendition {
    /// `sample_rate * bitrate`, each defaulting to 1 when absent.
    pub fn quality(&self) -> u128 {
        u128::from(self.sample_rate.unwrap_or(1)) * u128::from(self.bitrate.unwrap_or(1))
    }
}

/// Common view over video and audio renditions.
pub trait Rendition {
    fn content_type(&self) -> ContentType;

    fn stream(&self) -> &Stream;

    /// `{id}_{video|audio}.m3u8`
    fn playlist_name(&self) -> String {
        format!("{}_{}.m3u8", self.stream().id, self.content_type().label())
    }

    /// `{id}_{video|audio}_init.mp4`
    fn init_name(&self) -> String {
        format!("{}_{}_init.mp4", self.stream().id, self.content_type().label())
    }
}

impl Rendition for VideoRendition {
    fn content_type(&self) -> ContentType {
        ContentType::Video
    }

    fn stream(&self) -> &Stream {
        &self.stream
    }
}

impl Rendition for AudioRendition {
    fn content_type(&self) -> ContentType {
        ContentType::Audio
    }

    fn stream(&self) -> &Stream {
        &self.stream
    }
}

/// A decoded manifest with at least one rendition.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// Filename-safe clip id, names the master playlist and merged output
    pub clip_id: String,
    /// Possibly relative to the URL the manifest was fetched from
    pub base_url: String,
    pub video: Vec<VideoRendition>,
    pub audio: Vec<AudioRendition>,
}

impl Manifest {
    pub fn master_name(&self) -> String {
        format!("master_{}.m3u8", self.clip_id)
    }

    pub fn rendition_count(&self) -> usize {
        self.video.len() + self.audio.len()
    }
}
