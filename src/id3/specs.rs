use std::borrow::Cow;

use crate::common::error::ContentError;

/// Text encoding types used in ID3v2 frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Encoding {
    Latin1 = 0,
    Utf16 = 1,
    Utf16Be = 2,
    Utf8 = 3,
}

impl Encoding {
    /// Resolve an encoding byte. UTF-16BE and UTF-8 only exist from ID3v2.4 on.
    pub fn from_byte(b: u8, major: u8) -> Result<Self, ContentError> {
        match (b, major) {
            (0, _) => Ok(Encoding::Latin1),
            (1, _) => Ok(Encoding::Utf16),
            (2, 4) => Ok(Encoding::Utf16Be),
            (3, 4) => Ok(Encoding::Utf8),
            _ => Err(ContentError::InvalidEncoding { byte: b, major }),
        }
    }

    /// Width of a code unit, which is also the width of the null terminator.
    pub fn terminator_len(self) -> usize {
        match self {
            Encoding::Latin1 | Encoding::Utf8 => 1,
            Encoding::Utf16 | Encoding::Utf16Be => 2,
        }
    }
}

/// Decode text from bytes using the specified encoding.
/// Malformed sequences become U+FFFD rather than failing.
pub fn decode_text(data: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Latin1 => encoding_rs::mem::decode_latin1(data).into_owned(),
        Encoding::Utf16 => {
            if data.len() < 2 {
                return String::new();
            }
            // Check BOM
            let (decoder, start) = match (data[0], data[1]) {
                (0xFF, 0xFE) => (encoding_rs::UTF_16LE, 2),
                (0xFE, 0xFF) => (encoding_rs::UTF_16BE, 2),
                // Default to LE if no BOM
                _ => (encoding_rs::UTF_16LE, 0),
            };
            let (result, _) = decoder.decode_without_bom_handling(&data[start..]);
            result.into_owned()
        }
        Encoding::Utf16Be => {
            let (result, _) = encoding_rs::UTF_16BE.decode_without_bom_handling(data);
            result.into_owned()
        }
        Encoding::Utf8 => String::from_utf8_lossy(data).into_owned(),
    }
}

/// Drop trailing null terminators matching the encoding's code-unit width.
pub fn strip_terminators(data: &[u8], encoding: Encoding) -> &[u8] {
    let mut end = data.len();
    match encoding.terminator_len() {
        1 => {
            while end > 0 && data[end - 1] == 0 {
                end -= 1;
            }
        }
        _ => {
            // A lone trailing zero byte is a sloppy single-byte terminator
            if end % 2 == 1 && data[end - 1] == 0 {
                end -= 1;
            }
            while end >= 2 && data[end - 2] == 0 && data[end - 1] == 0 {
                end -= 2;
            }
        }
    }
    &data[..end]
}

/// Remove fixed-width padding (NULs and spaces) from the end of a value.
pub fn strip_padding(text: &str) -> &str {
    text.trim_end_matches(['\0', ' '])
}

/// Find the null terminator for the given encoding.
/// Returns the position of the null terminator (not including it).
pub fn find_null_terminator(data: &[u8], encoding: Encoding) -> Option<usize> {
    match encoding {
        Encoding::Latin1 | Encoding::Utf8 => memchr::memchr(0, data),
        Encoding::Utf16 | Encoding::Utf16Be => data
            .chunks_exact(2)
            .position(|unit| unit == [0, 0])
            .map(|i| i * 2),
    }
}

/// Read encoded text from data, returning (text, bytes_consumed).
/// The text is terminated by null or end of data.
pub fn read_encoded_text(data: &[u8], encoding: Encoding) -> (String, usize) {
    match find_null_terminator(data, encoding) {
        Some(pos) => (
            decode_text(&data[..pos], encoding),
            pos + encoding.terminator_len(),
        ),
        None => (decode_text(data, encoding), data.len()),
    }
}

/// Read null-terminated Latin1 text (no encoding byte prefix).
pub fn read_latin1_text(data: &[u8]) -> (Cow<'_, str>, usize) {
    match memchr::memchr(0, data) {
        Some(pos) => (encoding_rs::mem::decode_latin1(&data[..pos]), pos + 1),
        None => (encoding_rs::mem::decode_latin1(data), data.len()),
    }
}

/// Picture type enum matching ID3v2 APIC frame specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PictureType {
    Other = 0,
    FileIcon = 1,
    OtherFileIcon = 2,
    CoverFront = 3,
    CoverBack = 4,
    LeafletPage = 5,
    Media = 6,
    LeadArtist = 7,
    Artist = 8,
    Conductor = 9,
    Band = 10,
    Composer = 11,
    Lyricist = 12,
    RecordingLocation = 13,
    DuringRecording = 14,
    DuringPerformance = 15,
    MovieCapture = 16,
    AFishEvenBrighter = 17,
    Illustration = 18,
    BandLogo = 19,
    PublisherLogo = 20,
}

impl PictureType {
    pub fn from_byte(b: u8) -> Self {
        match b {
            1 => PictureType::FileIcon,
            2 => PictureType::OtherFileIcon,
            3 => PictureType::CoverFront,
            4 => PictureType::CoverBack,
            5 => PictureType::LeafletPage,
            6 => PictureType::Media,
            7 => PictureType::LeadArtist,
            8 => PictureType::Artist,
            9 => PictureType::Conductor,
            10 => PictureType::Band,
            11 => PictureType::Composer,
            12 => PictureType::Lyricist,
            13 => PictureType::RecordingLocation,
            14 => PictureType::DuringRecording,
            15 => PictureType::DuringPerformance,
            16 => PictureType::MovieCapture,
            17 => PictureType::AFishEvenBrighter,
            18 => PictureType::Illustration,
            19 => PictureType::BandLogo,
            20 => PictureType::PublisherLogo,
            _ => PictureType::Other,
        }
    }
}
