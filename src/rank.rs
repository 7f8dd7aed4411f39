//! Rendition ranking.
//!
//! Players tend to treat the first variant of a master playlist as the
//! default, so both lists are ordered highest quality first. Sorting is
//! stable: renditions with equal keys keep their manifest order.

use crate::manifest::{AudioRendition, Manifest, VideoRendition};
use std::cmp::Reverse;
use tracing::debug;

/// Order video renditions by pixel area, largest first.
pub fn rank_video(mut renditions: Vec<VideoRendition>) -> Vec<VideoRendition> {
    renditions.sort_by_key(|v| Reverse(v.area()));
    renditions
}

/// Order audio renditions by `sample_rate * bitrate`, largest first.
pub fn rank_audio(mut renditions: Vec<AudioRendition>) -> Vec<AudioRendition> {
    renditions.sort_by_key(|a| Reverse(a.quality()));
    renditions
}

/// Rank both rendition lists of a manifest.
pub fn rank(manifest: Manifest) -> Manifest {
    let ranked = Manifest {
        video: rank_video(manifest.video),
        audio: rank_audio(manifest.audio),
        ..manifest
    };

    if let Some(best) = ranked.video.first() {
        debug!("Top video rendition: {} (area {})", best.stream.id, best.area());
    }
    if let Some(best) = ranked.audio.first() {
        debug!("Top audio rendition: {} (key {})", best.stream.id, best.quality());
    }

    ranked
}
