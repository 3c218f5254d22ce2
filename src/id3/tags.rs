use std::borrow::Cow;
use std::ops::Index;

use log::{debug, warn};

use crate::common::error::{Id3Error, Result};
use crate::id3::fields::Field;
use crate::id3::frames::Frame;
use crate::id3::genres::ContentType;
use crate::id3::header::{extended_header_len, HeaderFlags, TagHeader, HEADER_LEN};
use crate::id3::layout::{self, FrameLayout};
use crate::id3::options::{ExtractOptions, MalformedFramePolicy};
use crate::id3::unsynch;

/// Frames grouped by id, in the order each id first appears in the tag.
///
/// Uses a Vec instead of a HashMap: tags rarely carry more than a couple of
/// dozen distinct ids, and both the key order and the order within each key
/// are significant.
#[derive(Debug, Clone, Default)]
pub struct FrameSets {
    sets: Vec<(String, Vec<Frame>)>,
}

type Entry = (String, Vec<Frame>);

fn entry_view(entry: &Entry) -> (&str, &[Frame]) {
    (&entry.0, &entry.1)
}

/// Iterator over `(id, frames)` pairs of a [`FrameSets`].
pub type Iter<'a> = std::iter::Map<
    std::slice::Iter<'a, (String, Vec<Frame>)>,
    fn(&'a (String, Vec<Frame>)) -> (&'a str, &'a [Frame]),
>;

impl FrameSets {
    pub fn new() -> Self {
        FrameSets {
            sets: Vec::with_capacity(16),
        }
    }

    /// Append a frame to the list of its id, creating the key if needed.
    pub fn push(&mut self, frame: Frame) {
        if let Some((_, frames)) = self.sets.iter_mut().find(|(id, _)| id == frame.id()) {
            frames.push(frame);
        } else {
            self.sets.push((frame.id().to_string(), vec![frame]));
        }
    }

    pub fn get(&self, id: &str) -> Option<&[Frame]> {
        self.sets
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, frames)| frames.as_slice())
    }

    /// First frame with the given id.
    pub fn first(&self, id: &str) -> Option<&Frame> {
        self.get(id).and_then(|frames| frames.first())
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.sets.iter().any(|(k, _)| k == id)
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter<'a>(&'a self) -> Iter<'a> {
        self.sets
            .iter()
            .map(entry_view as fn(&'a Entry) -> (&'a str, &'a [Frame]))
    }

    /// All frames in tag order of their ids.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.sets.iter().flat_map(|(_, frames)| frames.iter())
    }

    /// Total number of frames across all ids.
    pub fn frame_count(&self) -> usize {
        self.sets.iter().map(|(_, frames)| frames.len()).sum()
    }
}

impl Index<&str> for FrameSets {
    type Output = [Frame];

    /// # Panics
    ///
    /// Panics if no frame with this id exists.
    fn index(&self, id: &str) -> &[Frame] {
        match self.get(id) {
            Some(frames) => frames,
            None => panic!("no {id} frame in tag"),
        }
    }
}

impl<'a> IntoIterator for &'a FrameSets {
    type Item = (&'a str, &'a [Frame]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Parse the frames of a tag from its data region.
///
/// `data` holds the bytes that followed the header, at most `data_length` of
/// them; fewer means the source ended early. Frame-level failures are either
/// returned alongside the frames collected so far or propagated, depending on
/// the malformed frame policy.
pub(crate) fn read_frames(
    data: &[u8],
    header: &TagHeader,
    options: &ExtractOptions,
) -> Result<(FrameSets, Option<Id3Error>)> {
    let mut frame_sets = FrameSets::new();

    match walk_frames(data, header, options, &mut frame_sets) {
        Ok(()) => Ok((frame_sets, None)),
        Err(e) if e.is_frame_error() && options.malformed_frames == MalformedFramePolicy::Truncate => {
            warn!(
                "frame parsing stopped after {} frames: {}",
                frame_sets.frame_count(),
                e
            );
            Ok((frame_sets, Some(e)))
        }
        Err(e) => Err(e),
    }
}

fn walk_frames(
    data: &[u8],
    header: &TagHeader,
    options: &ExtractOptions,
    frame_sets: &mut FrameSets,
) -> Result<()> {
    let major = header.major_version;
    let Some(layout) = FrameLayout::for_version(major) else {
        return Err(Id3Error::UnsupportedVersion {
            major,
            minor: header.minor_version,
        });
    };

    let declared = header.data_length as usize;
    let complete = data.len() >= declared;
    let mut data = Cow::Borrowed(&data[..data.len().min(declared)]);

    // Tag-wide unsynchronisation only exists up to v2.3; v2.4 flags each frame
    if header.flags.unsynchronisation && major < 4 && options.unsynchronisation {
        let decoded = match unsynch::decode(&data) {
            Cow::Owned(decoded) => Some(decoded),
            Cow::Borrowed(_) => None,
        };
        if let Some(decoded) = decoded {
            debug!("reversed tag unsynchronisation: {} -> {} bytes", data.len(), decoded.len());
            data = Cow::Owned(decoded);
        }
    }

    let mut offset = 0usize;
    if header.flags.extended && major >= 3 {
        offset = skip_extended_header(&data, major, declared, complete)?;
        debug!("skipping {offset} byte extended header");
    }

    let header_len = layout.header_len();

    loop {
        let remaining = &data[offset..];
        let tag_offset = HEADER_LEN + offset;

        if remaining.is_empty() {
            if complete {
                return Ok(());
            }
            return Err(Id3Error::TruncatedFrame {
                offset: tag_offset,
                needed: header_len,
            });
        }

        if remaining.len() < header_len {
            if layout::is_padding(remaining) {
                return Ok(());
            }
            if complete {
                return Err(Id3Error::malformed(
                    "",
                    tag_offset,
                    format!("{} trailing bytes are too short for a frame header", remaining.len()),
                ));
            }
            return Err(Id3Error::TruncatedFrame {
                offset: tag_offset,
                needed: header_len,
            });
        }

        if layout::is_padding(&remaining[..layout.id_len()]) {
            debug!("padding at tag offset {tag_offset}");
            return Ok(());
        }

        let mut frame_header = layout.parse_header(remaining, tag_offset)?;
        let size = frame_header.size as usize;
        let body_start = offset + header_len;
        let available = data.len() - body_start;

        if size > available {
            let declared_left = declared.saturating_sub(body_start);
            if complete || size > declared_left {
                return Err(Id3Error::malformed(
                    &frame_header.id,
                    tag_offset,
                    format!("declared size {size} exceeds the {available} bytes left in the tag"),
                ));
            }
            return Err(Id3Error::TruncatedFrame {
                offset: tag_offset,
                needed: header_len + size,
            });
        }

        if layout == FrameLayout::V24 && header.flags.unsynchronisation {
            frame_header.flags.unsynchronised = true;
        }

        debug!("{} frame, {} bytes at tag offset {}", frame_header.id, size, tag_offset);
        frame_sets.push(Frame::new(
            frame_header.id,
            layout,
            frame_header.flags,
            data[body_start..body_start + size].to_vec(),
        ));
        offset = body_start + size;
    }
}

/// Length of the extended header at the start of `data`.
///
/// A header running past what the source delivered is a truncation; one
/// running past the declared tag data is malformed.
fn skip_extended_header(data: &[u8], major: u8, declared: usize, complete: bool) -> Result<usize> {
    let Some(size) = data.get(..4) else {
        if complete || declared < 4 {
            return Err(Id3Error::malformed("", HEADER_LEN, "extended header truncated"));
        }
        return Err(Id3Error::TruncatedFrame {
            offset: HEADER_LEN,
            needed: 4,
        });
    };

    let mut field = [0u8; 4];
    field.copy_from_slice(size);
    let len = extended_header_len(field, major)?;
    if len > data.len() {
        if complete || len > declared {
            return Err(Id3Error::malformed(
                "",
                HEADER_LEN,
                format!("extended header of {len} bytes exceeds tag data"),
            ));
        }
        return Err(Id3Error::TruncatedFrame {
            offset: HEADER_LEN,
            needed: len,
        });
    }
    Ok(len)
}

/// An extracted ID3v2 tag.
///
/// Immutable once built. Accessors return the first value of the field's
/// frame, or an empty value when the frame is missing or cannot be decoded.
#[derive(Debug)]
pub struct Tag {
    header: TagHeader,
    frame_sets: FrameSets,
    truncation: Option<Id3Error>,
}

impl Tag {
    pub(crate) fn new(header: TagHeader, frame_sets: FrameSets, truncation: Option<Id3Error>) -> Self {
        Tag {
            header,
            frame_sets,
            truncation,
        }
    }

    pub fn header(&self) -> &TagHeader {
        &self.header
    }

    /// `"2.0"`, `"3.0"` or `"4.0"`.
    pub fn version(&self) -> String {
        self.header.version()
    }

    pub fn major_version(&self) -> u8 {
        self.header.major_version
    }

    pub fn minor_version(&self) -> u8 {
        self.header.minor_version
    }

    pub fn flags(&self) -> HeaderFlags {
        self.header.flags
    }

    /// Total tag size in bytes, header and footer included.
    pub fn length(&self) -> u32 {
        self.header.length()
    }

    pub fn data_length(&self) -> u32 {
        self.header.data_length
    }

    pub fn frame_sets(&self) -> &FrameSets {
        &self.frame_sets
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frame_sets.frames()
    }

    /// The frame-level error that ended parsing early, if any.
    pub fn truncation(&self) -> Option<&Id3Error> {
        self.truncation.as_ref()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }

    /// First frame carrying `field`, trying the field's ids in order of preference.
    pub fn field_frame(&self, field: Field) -> Option<&Frame> {
        field
            .frame_ids(self.header.major_version)
            .iter()
            .find_map(|id| self.frame_sets.first(id))
    }

    /// First value of the text frame `id`.
    pub fn text(&self, id: &str) -> Option<&str> {
        self.frame_sets
            .first(id)
            .and_then(|frame| frame.as_text())
            .map(|text| text.first())
    }

    fn field_text(&self, field: Field) -> &str {
        self.field_frame(field)
            .and_then(|frame| frame.as_text())
            .map_or("", |text| text.first())
    }

    pub fn track(&self) -> &str {
        self.field_text(Field::Track)
    }

    pub fn artist(&self) -> &str {
        self.field_text(Field::Artist)
    }

    pub fn title(&self) -> &str {
        self.field_text(Field::Title)
    }

    pub fn album(&self) -> &str {
        self.field_text(Field::Album)
    }

    pub fn year(&self) -> &str {
        self.field_text(Field::Year)
    }

    pub fn composer(&self) -> &str {
        self.field_text(Field::Composer)
    }

    pub fn original_artist(&self) -> &str {
        self.field_text(Field::OriginalArtist)
    }

    pub fn copyright(&self) -> &str {
        self.field_text(Field::Copyright)
    }

    pub fn encoder(&self) -> &str {
        self.field_text(Field::Encoder)
    }

    pub fn album_artist(&self) -> &str {
        self.field_text(Field::AlbumArtist)
    }

    pub fn disc(&self) -> &str {
        self.field_text(Field::Disc)
    }

    /// Numeric genre from `"N"`, `"(N)"` or `"(N)Text"`; `None` for free text.
    pub fn genre(&self) -> Option<u32> {
        ContentType::parse(self.field_text(Field::Genre)).code
    }

    pub fn genre_description(&self) -> &str {
        ContentType::parse(self.field_text(Field::Genre)).description()
    }

    /// Body of the first comment frame.
    pub fn comment(&self) -> &str {
        self.field_frame(Field::Comment)
            .and_then(|frame| frame.as_comment())
            .map_or("", |comment| comment.text.as_str())
    }

    pub fn lyrics(&self) -> &str {
        self.field_frame(Field::Lyrics)
            .and_then(|frame| frame.as_comment())
            .map_or("", |lyrics| lyrics.text.as_str())
    }

    /// URL of the first user-defined link frame.
    pub fn url(&self) -> &str {
        self.field_frame(Field::Url)
            .and_then(|frame| frame.url())
            .unwrap_or("")
    }

    pub fn album_image(&self) -> &[u8] {
        self.field_frame(Field::AlbumImage)
            .and_then(|frame| frame.as_picture())
            .map(|picture| picture.data.as_slice())
            .unwrap_or(&[])
    }

    pub fn album_image_mime_type(&self) -> &str {
        self.field_frame(Field::AlbumImage)
            .and_then(|frame| frame.as_picture())
            .map_or("", |picture| picture.mime.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id3::header::Synchsafe;
    use crate::id3::layout::FrameFlags;

    fn header(major: u8, flags: u8, data_length: u32) -> TagHeader {
        TagHeader {
            major_version: major,
            minor_version: 0,
            flags: HeaderFlags::from_byte(flags, major),
            data_length,
        }
    }

    fn v3_frame(id: &str, payload: &[u8]) -> Vec<u8> {
        let mut out = id.as_bytes().to_vec();
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(payload);
        out
    }

    fn frame(id: &str) -> Frame {
        Frame::new(id, FrameLayout::V23, FrameFlags::default(), Vec::new())
    }

    #[test]
    fn frame_sets_keep_order() {
        let mut sets = FrameSets::new();
        for id in ["TIT2", "COMM", "TPE1", "COMM"] {
            sets.push(frame(id));
        }
        assert_eq!(sets.keys().collect::<Vec<_>>(), ["TIT2", "COMM", "TPE1"]);
        assert_eq!(sets.len(), 3);
        assert_eq!(sets.frame_count(), 4);
        assert_eq!(sets["COMM"].len(), 2);
        assert!(sets.get("TALB").is_none());
        assert!(sets.contains_key("TPE1"));
        let ids: Vec<_> = (&sets).into_iter().map(|(id, frames)| (id, frames.len())).collect();
        assert_eq!(ids, [("TIT2", 1), ("COMM", 2), ("TPE1", 1)]);
    }

    #[test]
    fn walk_stops_at_padding() {
        let mut data = v3_frame("TIT2", b"\x00Song");
        data.extend_from_slice(&[0; 32]);
        let (sets, truncation) = read_frames(&data, &header(3, 0, data.len() as u32), &ExtractOptions::new()).unwrap();
        assert_eq!(sets.len(), 1);
        assert!(truncation.is_none());
    }

    #[test]
    fn oversized_frame_truncates() {
        let mut data = v3_frame("TIT2", b"\x00Song");
        data.extend_from_slice(b"TPE1\x00\x00\x10\x00\x00\x00abc");
        let tag_header = header(3, 0, data.len() as u32);

        let (sets, truncation) = read_frames(&data, &tag_header, &ExtractOptions::new()).unwrap();
        assert_eq!(sets.keys().collect::<Vec<_>>(), ["TIT2"]);
        assert!(matches!(
            truncation,
            Some(Id3Error::MalformedFrame { ref id, offset: 25, .. }) if id == "TPE1"
        ));

        let strict = ExtractOptions::new().malformed_frames(MalformedFramePolicy::Abort);
        assert!(matches!(
            read_frames(&data, &tag_header, &strict),
            Err(Id3Error::MalformedFrame { .. })
        ));
    }

    #[test]
    fn short_source_is_truncated_frame() {
        let data = v3_frame("TIT2", b"\x00Song");
        let (sets, truncation) = read_frames(&data[..12], &header(3, 0, 100), &ExtractOptions::new()).unwrap();
        assert!(sets.is_empty());
        assert!(matches!(truncation, Some(Id3Error::TruncatedFrame { offset: 10, needed: 15 })));

        let (_, truncation) = read_frames(&[], &header(3, 0, 257), &ExtractOptions::new()).unwrap();
        assert!(matches!(truncation, Some(Id3Error::TruncatedFrame { offset: 10, needed: 10 })));
    }

    #[test]
    fn tag_unsynchronisation_is_reversed() {
        // frame sizes count the bytes after unsynchronisation is undone
        let mut data = b"TIT2\x00\x00\x00\x04\x00\x00".to_vec();
        data.extend_from_slice(b"\x00A\xFF\x00\xE0");
        let tag_header = header(3, 0x80, data.len() as u32);

        let (sets, truncation) = read_frames(&data, &tag_header, &ExtractOptions::new()).unwrap();
        assert!(truncation.is_none());
        assert_eq!(sets.first("TIT2").unwrap().payload(), b"\x00A\xFF\xE0");

        let options = ExtractOptions::new().unsynchronisation(false);
        let (sets, truncation) = read_frames(&data, &tag_header, &options).unwrap();
        assert_eq!(sets.first("TIT2").unwrap().payload(), b"\x00A\xFF\x00");
        assert!(matches!(truncation, Some(Id3Error::MalformedFrame { .. })));
    }

    #[test]
    fn extended_header_is_skipped() {
        let mut data = vec![0x00, 0x00, 0x00, 0x06, 0, 0, 0, 0, 0, 0];
        data.extend(v3_frame("TALB", b"\x00Album"));
        let (sets, truncation) = read_frames(&data, &header(3, 0x40, data.len() as u32), &ExtractOptions::new()).unwrap();
        assert!(truncation.is_none());
        assert!(sets.contains_key("TALB"));
    }

    #[test]
    fn cut_extended_header_is_truncated_frame() {
        let data = [0x00, 0x00, 0x00, 0x06, 0, 0, 0, 0, 0, 0];
        let tag_header = header(3, 0x40, 32);

        let (sets, truncation) = read_frames(&data[..2], &tag_header, &ExtractOptions::new()).unwrap();
        assert!(sets.is_empty());
        assert!(matches!(truncation, Some(Id3Error::TruncatedFrame { offset: 10, needed: 4 })));

        let (_, truncation) = read_frames(&data[..6], &tag_header, &ExtractOptions::new()).unwrap();
        assert!(matches!(truncation, Some(Id3Error::TruncatedFrame { offset: 10, needed: 10 })));
    }

    #[test]
    fn oversized_extended_header_is_malformed() {
        let data = [0x00, 0x00, 0x00, 0x40, 0, 0, 0, 0, 0, 0];

        // larger than the declared tag data, even though the source is cut
        let (_, truncation) = read_frames(&data, &header(3, 0x40, 32), &ExtractOptions::new()).unwrap();
        assert!(matches!(
            truncation,
            Some(Id3Error::MalformedFrame { ref id, offset: 10, .. }) if id.is_empty()
        ));

        let (_, truncation) = read_frames(&data[..2], &header(3, 0x40, 2), &ExtractOptions::new()).unwrap();
        assert!(matches!(truncation, Some(Id3Error::MalformedFrame { offset: 10, .. })));
    }

    #[test]
    fn bad_v4_size_truncates() {
        let mut data = b"TIT2".to_vec();
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x85, 0x00, 0x00]);
        data.extend_from_slice(&[0; 8]);
        let (sets, truncation) = read_frames(&data, &header(4, 0, data.len() as u32), &ExtractOptions::new()).unwrap();
        assert!(sets.is_empty());
        assert!(matches!(truncation, Some(Id3Error::InvalidSynchsafeInt(_))));
    }

    #[test]
    fn v24_tag_flag_marks_frames_unsynchronised() {
        let payload = b"\x03A\xFF\x00\xE0";
        let mut data = b"TIT2".to_vec();
        data.extend_from_slice(&Synchsafe::encode(payload.len() as u32).unwrap());
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(payload);
        let (sets, _) = read_frames(&data, &header(4, 0x80, data.len() as u32), &ExtractOptions::new()).unwrap();
        let frame = sets.first("TIT2").unwrap();
        assert!(frame.flags().unsynchronised);
        assert_eq!(&*frame.body().unwrap(), b"\x03A\xFF\xE0");
    }
}
