use super::{AudioRendition, Manifest, PLACEHOLDER_ID, Segment, Stream, VideoRendition};
use crate::error::{Result, SegmuxError};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawManifest {
    clip_id: Option<Value>,
    base_url: Option<String>,
    video: Vec<RawVideo>,
    audio: Vec<RawAudio>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStream {
    id: Option<Value>,
    base_url: Option<String>,
    init_segment: Option<String>,
    segments: Vec<RawSegment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawVideo {
    #[serde(flatten)]
    stream: RawStream,
    width: Option<u64>,
    height: Option<u64>,
    bitrate: Option<u64>,
    avg_bitrate: Option<u64>,
    codecs: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAudio {
    #[serde(flatten)]
    stream: RawStream,
    channels: Option<u64>,
    bitrate: Option<u64>,
    sample_rate: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSegment {
    start: f64,
    end: f64,
    url: String,
}

/// Parse manifest JSON into a [`Manifest`].
///
/// Absent fields fall back to neutral defaults. Fails with
/// [`SegmuxError::Parse`] on malformed JSON, corrupt base64 or a segment
/// ending before it starts, and with [`SegmuxError::NoRenditions`] when the
/// document decodes but lists neither video nor audio.
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    info!("Parsing manifest ({} bytes)", content.len());

    let raw: RawManifest = serde_json::from_str(content)?;

    if raw.video.is_empty() && raw.audio.is_empty() {
        return Err(SegmuxError::NoRenditions);
    }

    let video = raw
        .video
        .into_iter()
        .map(|v| {
            Ok(VideoRendition {
                stream: convert_stream(v.stream)?,
                width: v.width,
                height: v.height,
                bitrate: v.bitrate,
                avg_bitrate: v.avg_bitrate,
                codecs: v.codecs,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let audio = raw
        .audio
        .into_iter()
        .map(|a| {
            Ok(AudioRendition {
                stream: convert_stream(a.stream)?,
                channels: a.channels,
                bitrate: a.bitrate,
                sample_rate: a.sample_rate,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let manifest = Manifest {
        clip_id: file_stem(raw.clip_id.as_ref()),
        base_url: raw.base_url.unwrap_or_default(),
        video,
        audio,
    };

    info!(
        "Parsed manifest for clip {}: {} video, {} audio renditions",
        manifest.clip_id,
        manifest.video.len(),
        manifest.audio.len()
    );

    Ok(manifest)
}

fn convert_stream(raw: RawStream) -> Result<Stream> {
    let id = file_stem(raw.id.as_ref());

    let init_segment = match raw.init_segment.as_deref() {
        Some(encoded) => STANDARD.decode(encoded.trim())?,
        None => {
            debug!("Rendition {} has no init_segment", id);
            Vec::new()
        }
    };

    let segments = raw
        .segments
        .into_iter()
        .enumerate()
        .map(|(index, seg)| {
            if seg.end < seg.start {
                return Err(SegmuxError::Parse(format!(
                    "segment {} of rendition {} ends ({}) before it starts ({})",
                    index, id, seg.end, seg.start
                )));
            }
            Ok(Segment {
                start: seg.start,
                end: seg.end,
                url: seg.url,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Stream {
        id,
        base_url: raw.base_url.unwrap_or_default(),
        init_segment,
        segments,
    })
}

/// Turn a JSON id (string or number) into a filename-safe stem.
///
/// Anything outside `[A-Za-z0-9._-]` becomes `_`, so an id can never point
/// outside the output directory.
fn file_stem(value: Option<&Value>) -> String {
    let raw = match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return PLACEHOLDER_ID.to_string(),
    };

    let stem: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    // "." and ".." survive the character filter
    if stem.chars().all(|c| c == '.') {
        return stem.replace('.', "_");
    }
    stem
}
