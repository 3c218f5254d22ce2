//! Read-only extraction of ID3v2.2, ID3v2.3 and ID3v2.4 tags.
//!
//! ```rust,no_run
//! let tag = id3v2::extract_tag_from_path("song.mp3", &Default::default())?;
//! println!("{} - {} ({})", tag.artist(), tag.title(), tag.genre_description());
//! # Ok::<(), id3v2::Id3Error>(())
//! ```

pub mod common;
pub mod id3;

pub use common::error::{ContentError, Id3Error, Result};
pub use common::source::{map_file, ByteSource};
pub use id3::options::{ExtractOptions, MalformedFramePolicy};
pub use id3::tags::{FrameSets, Tag};
pub use id3::{extract_tag, extract_tag_from_path, extract_tag_with, extract_tags_from_paths};
