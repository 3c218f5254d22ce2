pub mod fields;
pub mod frames;
pub mod genres;
pub mod header;
pub mod layout;
pub mod options;
pub mod specs;
pub mod tags;
pub mod unsynch;

use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;

use crate::common::error::Result;
use crate::common::source::{self, ByteSource};
use crate::id3::header::{TagFooter, TagHeader, FOOTER_LEN, HEADER_LEN};
use crate::id3::options::ExtractOptions;
use crate::id3::tags::Tag;

/// Extract the ID3v2 tag at the start of `source` with default options.
pub fn extract_tag<S: ByteSource + ?Sized>(source: &S) -> Result<Tag> {
    extract_tag_with(source, &ExtractOptions::default())
}

/// Extract the ID3v2 tag at the start of `source`.
///
/// Only the header and the declared tag region are read. Every call reads the
/// source afresh; nothing is cached between calls.
pub fn extract_tag_with<S: ByteSource + ?Sized>(source: &S, options: &ExtractOptions) -> Result<Tag> {
    let mut header_buf = [0u8; HEADER_LEN];
    let n = source::read_full_at(source, 0, &mut header_buf)?;
    let header = TagHeader::parse(&header_buf[..n])?;

    debug!(
        "ID3v2.{}.{} tag, {} data bytes, flags {:?}",
        header.major_version, header.minor_version, header.data_length, header.flags
    );

    // Read just the tag data (not the entire file!)
    let data = source::read_region(source, HEADER_LEN as u64, header.data_length as usize)?;
    if data.len() < header.data_length as usize {
        warn!(
            "source ends {} bytes into a {} byte tag",
            data.len(),
            header.data_length
        );
    }

    let (frame_sets, truncation) = tags::read_frames(&data, &header, options)?;

    if options.verify_footer {
        verify_footer(source, &header)?;
    }

    Ok(Tag::new(header, frame_sets, truncation))
}

/// Check the v2.4 footer against the header. Mismatches are logged only.
fn verify_footer<S: ByteSource + ?Sized>(source: &S, header: &TagHeader) -> Result<()> {
    let Some(offset) = header.footer_offset() else {
        return Ok(());
    };

    let mut buf = [0u8; FOOTER_LEN];
    let n = source::read_full_at(source, offset, &mut buf)?;
    if n < FOOTER_LEN {
        warn!("tag declares a footer at offset {offset} but the source ends first");
        return Ok(());
    }

    match TagFooter::parse(&buf) {
        Ok(footer) if footer.matches(header) => {}
        Ok(footer) => warn!("footer {footer:?} does not match header {header:?}"),
        Err(e) => warn!("bad footer at offset {offset}: {e}"),
    }
    Ok(())
}

/// Extract the tag of the file at `path`, read through a memory map.
pub fn extract_tag_from_path<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<Tag> {
    let path = path.as_ref();
    let len = std::fs::metadata(path)?.len();
    if len == 0 {
        // nothing to map
        return extract_tag_with(&File::open(path)?, options);
    }
    let map = source::map_file(path)?;
    extract_tag_with(&map, options)
}

/// Extract the tags of many files in parallel.
///
/// Each file gets its own handle; results come back in input order.
pub fn extract_tags_from_paths<P>(paths: &[P], options: &ExtractOptions) -> Vec<(PathBuf, Result<Tag>)>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            (path.to_path_buf(), extract_tag_from_path(path, options))
        })
        .collect()
}
