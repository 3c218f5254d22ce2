use byteorder::{BigEndian, ByteOrder};

use crate::common::error::{Id3Error, Result};

/// Size of the fixed tag header, and of the optional v2.4 footer.
pub const HEADER_LEN: usize = 10;
pub const FOOTER_LEN: usize = 10;

const HEADER_MAGIC: &[u8; 3] = b"ID3";
const FOOTER_MAGIC: &[u8; 3] = b"3DI";

/// Synchsafe integer encoding used in ID3v2 size fields.
/// Each byte carries 7 bits; the MSB must be clear.
pub struct Synchsafe;

impl Synchsafe {
    pub const MAX: u32 = (1 << 28) - 1;

    /// Decode a 4-byte synchsafe integer, rejecting bytes with bit 7 set.
    pub fn decode(bytes: [u8; 4]) -> Result<u32> {
        if !Self::is_valid(&bytes) {
            return Err(Id3Error::InvalidSynchsafeInt(bytes));
        }
        Ok(bytes
            .iter()
            .fold(0u32, |acc, &b| (acc << 7) | u32::from(b)))
    }

    /// Decode from the first four bytes of `data`.
    pub fn decode_slice(data: &[u8]) -> Result<u32> {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&data[..4]);
        Self::decode(bytes)
    }

    /// Encode a value of at most 28 bits.
    pub fn encode(value: u32) -> Result<[u8; 4]> {
        if value > Self::MAX {
            return Err(Id3Error::InvalidSynchsafeInt(value.to_be_bytes()));
        }
        let mut out = [0u8; 4];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = ((value >> (7 * (3 - i))) & 0x7F) as u8;
        }
        Ok(out)
    }

    pub fn is_valid(data: &[u8]) -> bool {
        data.iter().all(|&b| b & 0x80 == 0)
    }
}

/// ID3v2 header flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderFlags {
    pub unsynchronisation: bool,
    pub extended: bool,
    pub experimental: bool,
    /// Only ever set for ID3v2.4.
    pub footer: bool,
}

impl HeaderFlags {
    pub fn from_byte(flags: u8, major: u8) -> Self {
        HeaderFlags {
            unsynchronisation: flags & 0x80 != 0,
            extended: flags & 0x40 != 0,
            experimental: flags & 0x20 != 0,
            footer: major == 4 && flags & 0x10 != 0,
        }
    }
}

/// Parsed ID3v2 header (10 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    pub major_version: u8,
    pub minor_version: u8,
    pub flags: HeaderFlags,
    /// Tag size excluding the header and footer.
    pub data_length: u32,
}

impl TagHeader {
    /// Parse an ID3v2 header from the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            let probe = data.len().min(HEADER_MAGIC.len());
            return if probe > 0 && data[..probe] == HEADER_MAGIC[..probe] {
                Err(Id3Error::TruncatedHeader { available: data.len() })
            } else {
                Err(Id3Error::NotATag)
            };
        }

        if &data[0..3] != HEADER_MAGIC {
            return Err(Id3Error::NotATag);
        }

        let major = data[3];
        let minor = data[4];
        if !(2..=4).contains(&major) {
            return Err(Id3Error::UnsupportedVersion { major, minor });
        }

        let flags = HeaderFlags::from_byte(data[5], major);

        // Size is always synchsafe in the header
        let data_length = Synchsafe::decode_slice(&data[6..10])?;

        Ok(TagHeader {
            major_version: major,
            minor_version: minor,
            flags,
            data_length,
        })
    }

    /// `"{major}.0"`, e.g. `"3.0"` for ID3v2.3.
    pub fn version(&self) -> String {
        format!("{}.0", self.major_version)
    }

    /// Full tag size including the header and the optional footer.
    pub fn length(&self) -> u32 {
        let mut len = HEADER_LEN as u32 + self.data_length;
        if self.flags.footer {
            len += FOOTER_LEN as u32;
        }
        len
    }

    /// Byte offset of the footer within the source, if the tag declares one.
    pub fn footer_offset(&self) -> Option<u64> {
        self.flags
            .footer
            .then(|| HEADER_LEN as u64 + u64::from(self.data_length))
    }
}

/// ID3v2.4 footer, a mirror of the header with the `3DI` magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagFooter {
    pub major_version: u8,
    pub minor_version: u8,
    pub data_length: u32,
}

impl TagFooter {
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < FOOTER_LEN || &data[0..3] != FOOTER_MAGIC {
            return Err(Id3Error::malformed("3DI", 0, "missing footer magic"));
        }
        Ok(TagFooter {
            major_version: data[3],
            minor_version: data[4],
            data_length: Synchsafe::decode_slice(&data[6..10])?,
        })
    }

    /// Whether this footer describes the same tag as `header`.
    pub fn matches(&self, header: &TagHeader) -> bool {
        self.major_version == header.major_version
            && self.minor_version == header.minor_version
            && self.data_length == header.data_length
    }
}

/// Number of bytes the extended header occupies, read from its size field.
///
/// v2.3 stores a plain size that excludes the size field itself; v2.4 stores a
/// synchsafe size covering the whole extended header. Callers check the result
/// against the tag data.
pub fn extended_header_len(size: [u8; 4], major: u8) -> Result<usize> {
    let len = match major {
        3 => BigEndian::read_u32(&size) as usize + 4,
        4 => Synchsafe::decode(size)? as usize,
        _ => 0,
    };
    Ok(len)
}
