//! HLS playlist generation.
//!
//! For every rendition the writer emits an init segment and a VOD media
//! playlist whose segment URLs are fully resolved; a master playlist then ties
//! the audio group and video variants together. All URLs are resolved before
//! the first artifact is written, so a bad manifest leaves the sink untouched.

use super::sink::ArtifactSink;
use crate::error::{Result, SegmuxError};
use crate::manifest::{ContentType, Manifest, Rendition};
use crate::resolve;
use std::collections::HashSet;
use std::fmt::Write;
use tracing::info;
use url::Url;

/// Group id shared by every audio rendition in the master playlist.
pub const AUDIO_GROUP_ID: &str = "audio";

/// A segment with its final URL and duration in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSegment {
    pub url: Url,
    pub duration: f64,
}

/// Files written for one rendition.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlaylist {
    pub content_type: ContentType,
    /// Media playlist filename
    pub playlist: String,
    /// Init segment filename
    pub init: String,
}

/// Everything one conversion wrote to its sink.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistSet {
    /// Master playlist filename
    pub master: String,
    pub renditions: Vec<ResolvedPlaylist>,
}

impl PlaylistSet {
    /// Every artifact name, rendition files first, master last.
    pub fn artifact_names(&self) -> impl Iterator<Item = &str> {
        self.renditions
            .iter()
            .flat_map(|r| [r.playlist.as_str(), r.init.as_str()])
            .chain(std::iter::once(self.master.as_str()))
    }
}

/// `ceil(longest segment) + 1`, or 1 for an empty playlist.
pub fn target_duration(segments: &[ResolvedSegment]) -> u64 {
    let longest = segments
        .iter()
        .map(|s| s.duration)
        .fold(0.0_f64, f64::max);
    (longest.ceil() as u64).saturating_add(1)
}

/// Render a VOD media playlist referencing `init_name` as its map.
pub fn render_media_playlist(init_name: &str, segments: &[ResolvedSegment]) -> String {
    let mut playlist = String::with_capacity(256 + segments.len() * 128);

    let _ = writeln!(playlist, "#EXTM3U");
    let _ = writeln!(playlist, "#EXT-X-VERSION:4");
    let _ = writeln!(playlist, "#EXT-X-MEDIA-SEQUENCE:0");
    let _ = writeln!(playlist, "#EXT-X-PLAYLIST-TYPE:VOD");
    let _ = writeln!(playlist, "#EXT-X-MAP:URI=\"{}\"", init_name);
    let _ = writeln!(playlist, "#EXT-X-TARGETDURATION:{}", target_duration(segments));

    for segment in segments {
        let _ = writeln!(playlist, "#EXTINF:{}", segment.duration);
        let _ = writeln!(playlist, "{}", segment.url);
    }

    let _ = writeln!(playlist, "#EXT-X-ENDLIST");
    playlist
}

/// Render the master playlist for an already ranked manifest.
///
/// Audio renditions become `#EXT-X-MEDIA` entries of one group, named
/// `{kbps}_{sample_rate}_{index}` where the index keeps otherwise identical
/// names apart. Video renditions become `#EXT-X-STREAM-INF` variants. Either
/// list may be empty.
pub fn render_master_playlist(manifest: &Manifest) -> String {
    let mut playlist = String::with_capacity(256);

    let _ = writeln!(playlist, "#EXTM3U");
    let _ = writeln!(playlist, "#EXT-X-INDEPENDENT-SEGMENTS");

    for (index, audio) in manifest.audio.iter().enumerate() {
        let kbps = audio.bitrate.unwrap_or(0) as f64 / 1000.0;
        let _ = write!(
            playlist,
            "#EXT-X-MEDIA:TYPE=AUDIO,URI=\"{}\",GROUP-ID=\"{}\",NAME=\"{}_{}_{}\"",
            audio.playlist_name(),
            AUDIO_GROUP_ID,
            kbps,
            audio.sample_rate.unwrap_or(0),
            index
        );
        if let Some(channels) = audio.channels {
            let _ = write!(playlist, ",CHANNELS=\"{}\"", channels);
        }
        let _ = writeln!(playlist);
    }

    for video in &manifest.video {
        let _ = write!(
            playlist,
            "#EXT-X-STREAM-INF:BANDWIDTH={}",
            video.bitrate.unwrap_or(0)
        );
        if let Some(avg) = video.avg_bitrate {
            let _ = write!(playlist, ",AVERAGE-BANDWIDTH={}", avg);
        }
        if let Some(codecs) = &video.codecs {
            let _ = write!(playlist, ",CODECS=\"{}\"", codecs);
        }
        if let Some(resolution) = video.resolution() {
            let _ = write!(playlist, ",RESOLUTION={}", resolution);
        }
        if !manifest.audio.is_empty() {
            let _ = write!(playlist, ",AUDIO=\"{}\"", AUDIO_GROUP_ID);
        }
        let _ = writeln!(playlist);
        let _ = writeln!(playlist, "{}", video.playlist_name());
    }

    playlist
}

/// A rendition rendered in memory, ready to be written.
struct RenderedRendition<'a> {
    entry: ResolvedPlaylist,
    init_segment: &'a [u8],
    text: String,
}

fn render_rendition<'a, R: Rendition>(
    rendition: &'a R,
    manifest_base: &Url,
) -> Result<RenderedRendition<'a>> {
    let stream = rendition.stream();
    let base = resolve::rendition_base(manifest_base, stream)?;

    let segments = stream
        .segments
        .iter()
        .map(|segment| {
            Ok(ResolvedSegment {
                url: resolve::segment_url(&base, segment)?,
                duration: segment.duration(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let entry = ResolvedPlaylist {
        content_type: rendition.content_type(),
        playlist: rendition.playlist_name(),
        init: rendition.init_name(),
    };
    let text = render_media_playlist(&entry.init, &segments);

    Ok(RenderedRendition {
        entry,
        init_segment: &stream.init_segment,
        text,
    })
}

/// Write init segments, media playlists and the master playlist to `sink`.
///
/// `manifest_url` is the URL the manifest was fetched from; it anchors the
/// resolution chain. Video renditions are written before audio, each in
/// ranked order, and the master playlist last. Two renditions that would
/// share a file name are a [`SegmuxError::Parse`] and nothing is written.
pub fn write_playlists<S: ArtifactSink + ?Sized>(
    manifest: &Manifest,
    manifest_url: &Url,
    sink: &mut S,
) -> Result<PlaylistSet> {
    let base = resolve::manifest_base(manifest_url, manifest)?;

    let mut rendered = Vec::with_capacity(manifest.rendition_count());
    for video in &manifest.video {
        rendered.push(render_rendition(video, &base)?);
    }
    for audio in &manifest.audio {
        rendered.push(render_rendition(audio, &base)?);
    }

    // Distinct ids can sanitize to the same file stem
    let mut names = HashSet::with_capacity(rendered.len() * 2);
    for item in &rendered {
        for name in [&item.entry.init, &item.entry.playlist] {
            if !names.insert(name.as_str()) {
                return Err(SegmuxError::Parse(format!(
                    "two renditions map to the same file name {}",
                    name
                )));
            }
        }
    }

    let mut renditions = Vec::with_capacity(rendered.len());
    for item in rendered {
        sink.write(&item.entry.init, item.init_segment)?;
        sink.write(&item.entry.playlist, item.text.as_bytes())?;
        info!(
            "Wrote {} playlist {}",
            item.entry.content_type.label(),
            item.entry.playlist
        );
        renditions.push(item.entry);
    }

    let master = manifest.master_name();
    sink.write(&master, render_master_playlist(manifest).as_bytes())?;
    info!(
        "Wrote master playlist {} ({} renditions)",
        master,
        renditions.len()
    );

    Ok(PlaylistSet { master, renditions })
}
