pub mod sink;
pub mod writer;

pub use sink::{ArtifactSink, DirectorySink, MemorySink};
pub use writer::{PlaylistSet, ResolvedPlaylist, write_playlists};
