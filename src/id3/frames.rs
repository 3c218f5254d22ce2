use std::borrow::Cow;
use std::io::Read;
use std::sync::OnceLock;

use flate2::read::ZlibDecoder;
use log::warn;

use crate::common::error::ContentError;
use crate::id3::layout::{FrameFlags, FrameLayout};
use crate::id3::specs::{self, Encoding, PictureType};
use crate::id3::unsynch;

type ContentResult<T> = std::result::Result<T, ContentError>;

/// How a frame's payload is interpreted, chosen from its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Text,
    UserText,
    Url,
    UserUrl,
    Comment,
    Picture,
    Unknown,
}

impl FrameKind {
    /// Classify a frame id; v2.2 three-character ids map like their v2.3 forms.
    pub fn for_id(id: &str) -> Self {
        match id {
            "TXXX" | "TXX" => FrameKind::UserText,
            "WXXX" | "WXX" => FrameKind::UserUrl,
            "COMM" | "COM" | "USLT" | "ULT" => FrameKind::Comment,
            "APIC" | "PIC" => FrameKind::Picture,
            s if s.starts_with('T') => FrameKind::Text,
            s if s.starts_with('W') => FrameKind::Url,
            _ => FrameKind::Unknown,
        }
    }
}

/// A raw frame as found in the tag.
///
/// The payload is kept verbatim. Its interpretation is decoded on first
/// access and memoised, so a frame never changes once built.
#[derive(Debug, Clone)]
pub struct Frame {
    id: String,
    kind: FrameKind,
    layout: FrameLayout,
    flags: FrameFlags,
    payload: Vec<u8>,
    content: OnceLock<ContentResult<FrameContent>>,
}

impl Frame {
    pub fn new(id: impl Into<String>, layout: FrameLayout, flags: FrameFlags, payload: Vec<u8>) -> Self {
        let id = id.into();
        Frame {
            kind: FrameKind::for_id(&id),
            id,
            layout,
            flags,
            payload,
            content: OnceLock::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn flags(&self) -> FrameFlags {
        self.flags
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// Payload bytes exactly as stored in the tag.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload with the frame format flags undone: flag data stripped,
    /// unsynchronisation reversed and compression inflated.
    pub fn body(&self) -> ContentResult<Cow<'_, [u8]>> {
        if self.flags.encrypted {
            return Err(ContentError::EncryptedFrame(self.id.clone()));
        }

        let skip = self.layout.flag_data_len(&self.flags);
        if skip > self.payload.len() {
            return Err(ContentError::FrameTooShort {
                id: self.id.clone(),
                len: self.payload.len(),
            });
        }

        let mut body = Cow::Borrowed(&self.payload[skip..]);

        if self.flags.unsynchronised {
            let decoded = match unsynch::decode(&body) {
                Cow::Owned(decoded) => Some(decoded),
                Cow::Borrowed(_) => None,
            };
            if let Some(decoded) = decoded {
                body = Cow::Owned(decoded);
            }
        }

        if self.flags.compressed {
            body = Cow::Owned(decompress_zlib(&self.id, &body)?);
        }

        Ok(body)
    }

    /// Decoded content, computed once.
    pub fn content(&self) -> ContentResult<&FrameContent> {
        self.content
            .get_or_init(|| {
                self.decode()
                    .inspect_err(|e| warn!("undecodable {} frame: {}", self.id, e))
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    fn decode(&self) -> ContentResult<FrameContent> {
        let body = self.body()?;
        let major = self.layout.major_version();
        let content = match self.kind {
            FrameKind::Text => FrameContent::Text(parse_text_frame(&body, major)?),
            FrameKind::UserText => {
                FrameContent::UserText(parse_user_text_frame(&self.id, &body, major)?)
            }
            FrameKind::Url => FrameContent::Url(parse_url_frame(&body)),
            FrameKind::UserUrl => {
                FrameContent::UserUrl(parse_user_url_frame(&self.id, &body, major)?)
            }
            FrameKind::Comment => {
                FrameContent::Comment(parse_comment_frame(&self.id, &body, major)?)
            }
            FrameKind::Picture if self.layout == FrameLayout::V22 => {
                FrameContent::Picture(parse_v22_picture_frame(&self.id, &body)?)
            }
            FrameKind::Picture => {
                FrameContent::Picture(parse_picture_frame(&self.id, &body, major)?)
            }
            FrameKind::Unknown => FrameContent::Binary,
        };
        Ok(content)
    }

    pub fn as_text(&self) -> Option<&TextFrame> {
        match self.content() {
            Ok(FrameContent::Text(f)) => Some(f),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&CommentFrame> {
        match self.content() {
            Ok(FrameContent::Comment(f)) => Some(f),
            _ => None,
        }
    }

    pub fn as_picture(&self) -> Option<&PictureFrame> {
        match self.content() {
            Ok(FrameContent::Picture(f)) => Some(f),
            _ => None,
        }
    }

    /// URL of a `W***` or `WXXX` frame.
    pub fn url(&self) -> Option<&str> {
        match self.content() {
            Ok(FrameContent::Url(f)) => Some(&f.url),
            Ok(FrameContent::UserUrl(f)) => Some(&f.url),
            _ => None,
        }
    }
}

/// Interpreted frame payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameContent {
    Text(TextFrame),
    UserText(UserTextFrame),
    Url(UrlFrame),
    UserUrl(UserUrlFrame),
    Comment(CommentFrame),
    Picture(PictureFrame),
    /// Unknown frame type; only the raw payload is available.
    Binary,
}

/// Standard text frame (TIT2, TPE1, TALB, TRCK, TCON, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFrame {
    pub encoding: Encoding,
    /// Full decoded text; v2.4 separates multiple values with NUL.
    pub text: String,
}

impl TextFrame {
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.text
            .split('\0')
            .map(|v| v.trim_start_matches('\u{FEFF}'))
            .filter(|v| !v.is_empty())
    }

    /// First value, or `""` for an empty frame.
    pub fn first(&self) -> &str {
        self.values().next().unwrap_or("")
    }
}

/// User-defined text frame (TXXX).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTextFrame {
    pub encoding: Encoding,
    pub desc: String,
    pub text: String,
}

/// URL link frame (WOAR, WORS, etc.)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlFrame {
    pub url: String,
}

/// User-defined URL frame (WXXX).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUrlFrame {
    pub encoding: Encoding,
    pub desc: String,
    pub url: String,
}

/// Comment frame (COMM); unsynchronised lyrics (USLT) share the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentFrame {
    pub encoding: Encoding,
    pub lang: String,
    pub desc: String,
    pub text: String,
}

/// Picture frame (APIC, or PIC in v2.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureFrame {
    pub encoding: Encoding,
    pub mime: String,
    pub pic_type: PictureType,
    pub desc: String,
    pub data: Vec<u8>,
}

// ---- Parsing functions ----

/// Decode a value that runs to the end of the frame.
fn decode_value(data: &[u8], encoding: Encoding) -> String {
    let text = specs::decode_text(specs::strip_terminators(data, encoding), encoding);
    specs::strip_padding(&text).to_string()
}

fn too_short(id: &str, data: &[u8]) -> ContentError {
    ContentError::FrameTooShort {
        id: id.to_string(),
        len: data.len(),
    }
}

/// Parse a text frame from its body.
pub fn parse_text_frame(data: &[u8], major: u8) -> ContentResult<TextFrame> {
    let Some((&enc, text_data)) = data.split_first() else {
        return Ok(TextFrame {
            encoding: Encoding::Latin1,
            text: String::new(),
        });
    };

    let encoding = Encoding::from_byte(enc, major)?;
    Ok(TextFrame {
        encoding,
        text: decode_value(text_data, encoding),
    })
}

/// Parse a TXXX (user text) frame.
pub fn parse_user_text_frame(id: &str, data: &[u8], major: u8) -> ContentResult<UserTextFrame> {
    let Some((&enc, rest)) = data.split_first() else {
        return Err(too_short(id, data));
    };

    let encoding = Encoding::from_byte(enc, major)?;
    let (desc, consumed) = specs::read_encoded_text(rest, encoding);

    Ok(UserTextFrame {
        encoding,
        desc,
        text: decode_value(&rest[consumed..], encoding),
    })
}

/// Parse a URL frame (WXXX excluded). URLs carry no encoding byte.
pub fn parse_url_frame(data: &[u8]) -> UrlFrame {
    UrlFrame {
        url: decode_value(data, Encoding::Latin1),
    }
}

/// Parse a WXXX (user URL) frame. The URL itself is always Latin1.
pub fn parse_user_url_frame(id: &str, data: &[u8], major: u8) -> ContentResult<UserUrlFrame> {
    let Some((&enc, rest)) = data.split_first() else {
        return Err(too_short(id, data));
    };

    let encoding = Encoding::from_byte(enc, major)?;
    let (desc, consumed) = specs::read_encoded_text(rest, encoding);

    Ok(UserUrlFrame {
        encoding,
        desc,
        url: decode_value(&rest[consumed..], Encoding::Latin1),
    })
}

/// Parse a COMM (comment) or USLT (lyrics) frame.
pub fn parse_comment_frame(id: &str, data: &[u8], major: u8) -> ContentResult<CommentFrame> {
    if data.len() < 4 {
        return Err(too_short(id, data));
    }

    let encoding = Encoding::from_byte(data[0], major)?;
    let lang = specs::decode_text(&data[1..4], Encoding::Latin1);
    let rest = &data[4..];

    let (desc, consumed) = specs::read_encoded_text(rest, encoding);

    Ok(CommentFrame {
        encoding,
        lang,
        desc,
        text: decode_value(&rest[consumed..], encoding),
    })
}

/// Parse an APIC (picture) frame.
pub fn parse_picture_frame(id: &str, data: &[u8], major: u8) -> ContentResult<PictureFrame> {
    let Some((&enc, rest)) = data.split_first() else {
        return Err(too_short(id, data));
    };

    let encoding = Encoding::from_byte(enc, major)?;

    // MIME type is always Latin1
    let (mime, consumed) = specs::read_latin1_text(rest);
    let mime = mime.into_owned();
    let rest = &rest[consumed..];

    let Some((&pic_type, rest)) = rest.split_first() else {
        return Err(too_short(id, data));
    };

    let (desc, consumed) = specs::read_encoded_text(rest, encoding);

    Ok(PictureFrame {
        encoding,
        mime,
        pic_type: PictureType::from_byte(pic_type),
        desc,
        data: rest[consumed..].to_vec(),
    })
}

/// Parse a v2.2 PIC frame, which names a 3-character image format instead of a MIME type.
pub fn parse_v22_picture_frame(id: &str, data: &[u8]) -> ContentResult<PictureFrame> {
    if data.len() < 5 {
        return Err(too_short(id, data));
    }

    let encoding = Encoding::from_byte(data[0], 2)?;

    let img_format = specs::decode_text(&data[1..4], Encoding::Latin1);
    let mime = match img_format.to_ascii_uppercase().as_str() {
        "JPG" => "image/jpeg".to_string(),
        "PNG" => "image/png".to_string(),
        _ => format!("image/{}", img_format.to_ascii_lowercase()),
    };

    let pic_type = PictureType::from_byte(data[4]);
    let rest = &data[5..];

    let (desc, consumed) = specs::read_encoded_text(rest, encoding);

    Ok(PictureFrame {
        encoding,
        mime,
        pic_type,
        desc,
        data: rest[consumed..].to_vec(),
    })
}

fn decompress_zlib(id: &str, data: &[u8]) -> ContentResult<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut result = Vec::new();
    decoder
        .read_to_end(&mut result)
        .map_err(|_| ContentError::BadCompressedData(id.to_string()))?;
    Ok(result)
}
