//! Converts segmented JSON ABR manifests into HLS playlist sets.
//!
//! The pipeline fetches a manifest ([`fetch`]), parses it ([`manifest`]),
//! ranks its renditions ([`rank`]), resolves segment URLs ([`resolve`]) and
//! writes media and master playlists ([`hls`]). [`convert`] runs those steps,
//! hands the master playlist to an external merge tool ([`merge`]) and
//! removes the intermediate files. [`server`] exposes it over HTTP.

pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod hls;
pub mod manifest;
pub mod merge;
pub mod metrics;
pub mod rank;
pub mod resolve;
pub mod server;
