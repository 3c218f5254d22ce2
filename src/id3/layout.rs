use byteorder::{BigEndian, ByteOrder};

use crate::common::error::{Id3Error, Result};
use crate::id3::header::Synchsafe;

/// Frame header layout of one ID3v2 major version.
///
/// Selected once from the tag header so the frame walk itself never branches
/// on the version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameLayout {
    /// 3-byte id, 3-byte plain size, no flags.
    V22,
    /// 4-byte id, 4-byte plain size, 2-byte flags.
    V23,
    /// 4-byte id, 4-byte synchsafe size, 2-byte flags.
    V24,
}

impl FrameLayout {
    pub fn for_version(major: u8) -> Option<Self> {
        match major {
            2 => Some(FrameLayout::V22),
            3 => Some(FrameLayout::V23),
            4 => Some(FrameLayout::V24),
            _ => None,
        }
    }

    pub fn major_version(self) -> u8 {
        match self {
            FrameLayout::V22 => 2,
            FrameLayout::V23 => 3,
            FrameLayout::V24 => 4,
        }
    }

    pub fn id_len(self) -> usize {
        match self {
            FrameLayout::V22 => 3,
            FrameLayout::V23 | FrameLayout::V24 => 4,
        }
    }

    pub fn header_len(self) -> usize {
        match self {
            FrameLayout::V22 => 6,
            FrameLayout::V23 | FrameLayout::V24 => 10,
        }
    }

    /// Parse a frame header from the first `header_len()` bytes of `data`.
    /// `offset` is only used for error reporting.
    pub fn parse_header(self, data: &[u8], offset: usize) -> Result<FrameHeader> {
        let id_bytes = &data[..self.id_len()];
        if !is_valid_frame_id(id_bytes) {
            return Err(Id3Error::malformed(
                &String::from_utf8_lossy(id_bytes),
                offset,
                "invalid frame id",
            ));
        }
        let id: String = id_bytes.iter().map(|&b| b as char).collect();

        let (size, flags) = match self {
            FrameLayout::V22 => (BigEndian::read_u24(&data[3..6]), FrameFlags::default()),
            FrameLayout::V23 => (
                BigEndian::read_u32(&data[4..8]),
                self.parse_flags(BigEndian::read_u16(&data[8..10])),
            ),
            FrameLayout::V24 => (
                Synchsafe::decode_slice(&data[4..8])?,
                self.parse_flags(BigEndian::read_u16(&data[8..10])),
            ),
        };

        Ok(FrameHeader { id, size, flags })
    }

    pub fn parse_flags(self, raw: u16) -> FrameFlags {
        match self {
            FrameLayout::V22 => FrameFlags::default(),
            FrameLayout::V23 => FrameFlags {
                raw,
                compressed: raw & 0x0080 != 0,
                encrypted: raw & 0x0040 != 0,
                grouping: raw & 0x0020 != 0,
                unsynchronised: false,
                data_length_indicator: false,
            },
            FrameLayout::V24 => FrameFlags {
                raw,
                grouping: raw & 0x0040 != 0,
                compressed: raw & 0x0008 != 0,
                encrypted: raw & 0x0004 != 0,
                unsynchronised: raw & 0x0002 != 0,
                data_length_indicator: raw & 0x0001 != 0,
            },
        }
    }

    /// Bytes that the frame flags add in front of the frame content.
    ///
    /// v2.3 puts the decompressed size, encryption method and group id there,
    /// in that order; v2.4 uses group id, encryption method and data length.
    pub fn flag_data_len(self, flags: &FrameFlags) -> usize {
        let mut len = 0;
        match self {
            FrameLayout::V22 => {}
            FrameLayout::V23 => {
                if flags.compressed {
                    len += 4;
                }
                if flags.encrypted {
                    len += 1;
                }
                if flags.grouping {
                    len += 1;
                }
            }
            FrameLayout::V24 => {
                if flags.grouping {
                    len += 1;
                }
                if flags.encrypted {
                    len += 1;
                }
                if flags.data_length_indicator {
                    len += 4;
                }
            }
        }
        len
    }
}

/// Frame format flags of a v2.3/v2.4 frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameFlags {
    pub raw: u16,
    pub grouping: bool,
    pub compressed: bool,
    pub encrypted: bool,
    pub unsynchronised: bool,
    pub data_length_indicator: bool,
}

/// A decoded frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub id: String,
    pub size: u32,
    pub flags: FrameFlags,
}

/// An all-zero id position marks the start of padding.
pub fn is_padding(id: &[u8]) -> bool {
    id.iter().all(|&b| b == 0)
}

pub fn is_valid_frame_id(id: &[u8]) -> bool {
    id.iter().all(|&b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
