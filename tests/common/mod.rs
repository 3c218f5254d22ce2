//! Builds synthetic ID3v2 tags for the integration tests.

#![allow(dead_code)]

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use id3v2::id3::header::Synchsafe;

pub struct TagBuilder {
    major: u8,
    flags: u8,
    body: Vec<u8>,
    footer: bool,
}

impl TagBuilder {
    pub fn new(major: u8) -> Self {
        TagBuilder {
            major,
            flags: 0,
            body: Vec::new(),
            footer: false,
        }
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags |= flags;
        self
    }

    /// Frame with no format flags.
    pub fn frame(self, id: &str, payload: &[u8]) -> Self {
        self.frame_with_flags(id, 0, payload)
    }

    pub fn frame_with_flags(mut self, id: &str, flags: u16, payload: &[u8]) -> Self {
        assert_eq!(id.len(), if self.major == 2 { 3 } else { 4 }, "{id}");
        self.body.extend_from_slice(id.as_bytes());
        let size = payload.len() as u32;
        match self.major {
            2 => self.body.extend_from_slice(&size.to_be_bytes()[1..]),
            3 => self.body.extend_from_slice(&size.to_be_bytes()),
            _ => self.body.extend_from_slice(&Synchsafe::encode(size).unwrap()),
        }
        if self.major > 2 {
            self.body.extend_from_slice(&flags.to_be_bytes());
        }
        self.body.extend_from_slice(payload);
        self
    }

    /// Latin-1 text frame.
    pub fn text(self, id: &str, text: &str) -> Self {
        let mut payload = vec![0u8];
        payload.extend_from_slice(text.as_bytes());
        self.frame(id, &payload)
    }

    /// Latin-1 comment frame (also the layout of lyrics frames).
    pub fn comment(self, id: &str, lang: &str, desc: &str, text: &str) -> Self {
        let mut payload = vec![0u8];
        payload.extend_from_slice(lang.as_bytes());
        payload.extend_from_slice(desc.as_bytes());
        payload.push(0);
        payload.extend_from_slice(text.as_bytes());
        self.frame(id, &payload)
    }

    /// Bytes appended to the tag data verbatim.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    pub fn padding(mut self, len: usize) -> Self {
        self.body.resize(self.body.len() + len, 0);
        self
    }

    pub fn footer(mut self) -> Self {
        self.footer = true;
        self.flags |= 0x10;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let size = Synchsafe::encode(self.body.len() as u32).unwrap();
        let mut out = b"ID3".to_vec();
        out.extend_from_slice(&[self.major, 0, self.flags]);
        out.extend_from_slice(&size);
        out.extend_from_slice(&self.body);
        if self.footer {
            out.extend_from_slice(b"3DI");
            out.extend_from_slice(&[self.major, 0, self.flags]);
            out.extend_from_slice(&size);
        }
        out
    }
}

/// Encoding byte, UTF-16LE BOM, text and a two-byte terminator.
pub fn utf16_payload(text: &str) -> Vec<u8> {
    let mut payload = vec![1u8, 0xFF, 0xFE];
    for unit in text.encode_utf16() {
        payload.extend_from_slice(&unit.to_le_bytes());
    }
    payload.extend_from_slice(&[0, 0]);
    payload
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// A PNG signature followed by deterministic filler, `len` bytes in total.
pub fn png_image(len: usize) -> Vec<u8> {
    let mut image = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    image.extend((0..len - image.len()).map(|i| (i * 31 % 251) as u8));
    image
}

/// Picture frame payload in v2.3/v2.4 layout.
pub fn apic_payload(mime: &str, pic_type: u8, desc: &str, image: &[u8]) -> Vec<u8> {
    let mut payload = vec![0u8];
    payload.extend_from_slice(mime.as_bytes());
    payload.push(0);
    payload.push(pic_type);
    payload.extend_from_slice(desc.as_bytes());
    payload.push(0);
    payload.extend_from_slice(image);
    payload
}

pub const ARTIST: &str = "ARTIST123456789012345678901234";
pub const TITLE: &str = "TITLE1234567890123456789012345";
pub const ALBUM: &str = "ALBUM1234567890123456789012345";
pub const COMMENT: &str = "COMMENT123456789012345678901";
pub const COMPOSER: &str = "COMPOSER23456789012345678901234";
pub const ORIGINAL_ARTIST: &str = "ORIGARTIST234567890123456789012";
pub const COPYRIGHT: &str = "COPYRIGHT2345678901234567890123";
pub const URL: &str = "URL2345678901234567890123456789";
pub const ENCODER: &str = "ENCODER234567890123456789012345";

/// An ID3v2.3 tag with twelve distinct frame ids, two of them `COMM`.
pub fn known_v23_tag() -> Vec<u8> {
    let mut wxxx = vec![0u8, 0];
    wxxx.extend_from_slice(URL.as_bytes());

    TagBuilder::new(3)
        .text("TENC", ENCODER)
        .frame("WXXX", &wxxx)
        .text("TCOP", COPYRIGHT)
        .text("TOPE", ORIGINAL_ARTIST)
        .text("TCOM", COMPOSER)
        .comment("COMM", "eng", "", COMMENT)
        .text("TPE1", ARTIST)
        .text("TALB", ALBUM)
        .comment("COMM", "eng", "second", "Another comment")
        .text("TRCK", "1")
        .text("TYER", "2001")
        .text("TCON", "(13)")
        .text("TIT2", TITLE)
        .padding(64)
        .build()
}
