//! Three-level URL resolution.
//!
//! Segment URLs in a manifest are relative to their rendition's base URL,
//! which is relative to the manifest's base URL, which in turn is relative to
//! the URL the manifest was fetched from. Every hop is resolved even when the
//! child is already absolute; joining an absolute reference returns it as-is.

use crate::error::{Result, SegmuxError};
use crate::manifest::{Manifest, Segment, Stream};
use url::Url;

/// Resolve `reference` against `base` using standard relative-URL rules.
///
/// An empty reference resolves to `base` itself.
pub fn resolve(base: &Url, reference: &str) -> Result<Url> {
    base.join(reference).map_err(|e| {
        SegmuxError::Parse(format!(
            "cannot resolve '{}' against {}: {}",
            reference, base, e
        ))
    })
}

/// Base URL of a manifest: hop one of the chain.
pub fn manifest_base(manifest_url: &Url, manifest: &Manifest) -> Result<Url> {
    resolve(manifest_url, &manifest.base_url)
}

/// Base URL of a rendition: hop two of the chain.
pub fn rendition_base(manifest_base: &Url, stream: &Stream) -> Result<Url> {
    resolve(manifest_base, &stream.base_url)
}

/// Final URL of a segment: hop three of the chain.
pub fn segment_url(rendition_base: &Url, segment: &Segment) -> Result<Url> {
    resolve(rendition_base, &segment.url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn relative_path_replaces_last_segment() {
        let base = url("https://cdn.example.com/exp=1/video/playlist.json?token=abc");
        assert_eq!(
            resolve(&base, "../").unwrap().as_str(),
            "https://cdn.example.com/exp=1/"
        );
        assert_eq!(
            resolve(&base, "sep/").unwrap().as_str(),
            "https://cdn.example.com/exp=1/video/sep/"
        );
    }

    #[test]
    fn absolute_reference_passes_through() {
        let base = url("https://cdn.example.com/a/b/playlist.json");
        let absolute = "https://other.example.net/x/segment-1.m4s?sig=1";
        assert_eq!(resolve(&base, absolute).unwrap().as_str(), absolute);
    }

    #[test]
    fn empty_reference_returns_base() {
        let base = url("https://cdn.example.com/a/b/playlist.json?token=abc");
        assert_eq!(resolve(&base, "").unwrap(), base);
    }

    #[test]
    fn root_relative_and_scheme_relative() {
        let base = url("https://cdn.example.com/a/b/");
        assert_eq!(
            resolve(&base, "/root/seg.m4s").unwrap().as_str(),
            "https://cdn.example.com/root/seg.m4s"
        );
        assert_eq!(
            resolve(&base, "//mirror.example.com/seg.m4s").unwrap().as_str(),
            "https://mirror.example.com/seg.m4s"
        );
    }

    #[test]
    fn three_hops_compose() {
        let manifest_url = url("https://vod.example.com/exp=9~acl=x/1234/sep/video/playlist.json");
        let manifest = Manifest {
            clip_id: "clip".to_string(),
            base_url: "../../".to_string(),
            video: Vec::new(),
            audio: Vec::new(),
        };
        let stream = Stream {
            id: "v".to_string(),
            base_url: "video/abc/chop/".to_string(),
            init_segment: Vec::new(),
            segments: Vec::new(),
        };
        let segment = Segment {
            start: 0.0,
            end: 6.0,
            url: "segment-1.m4s".to_string(),
        };

        let m = manifest_base(&manifest_url, &manifest).unwrap();
        assert_eq!(m.as_str(), "https://vod.example.com/exp=9~acl=x/1234/");

        let r = rendition_base(&m, &stream).unwrap();
        assert_eq!(r.as_str(), "https://vod.example.com/exp=9~acl=x/1234/video/abc/chop/");

        let s = segment_url(&r, &segment).unwrap();
        assert_eq!(
            s.as_str(),
            "https://vod.example.com/exp=9~acl=x/1234/video/abc/chop/segment-1.m4s"
        );
    }

    #[test]
    fn absolute_rendition_base_ignores_manifest_base() {
        let m = url("https://vod.example.com/a/");
        let stream = Stream {
            id: "a".to_string(),
            base_url: "https://audio.example.org/track/".to_string(),
            init_segment: Vec::new(),
            segments: Vec::new(),
        };
        assert_eq!(
            rendition_base(&m, &stream).unwrap().as_str(),
            "https://audio.example.org/track/"
        );
    }

    #[test]
    fn invalid_reference_is_parse_error() {
        let base = url("https://cdn.example.com/");
        let err = resolve(&base, "http://[::1").unwrap_err();
        assert!(matches!(err, SegmuxError::Parse(_)));
    }
}
