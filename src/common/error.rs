use thiserror::Error;

/// Errors produced while extracting an ID3v2 tag.
#[derive(Error, Debug)]
pub enum Id3Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no ID3v2 tag found")]
    NotATag,

    #[error("unsupported ID3v2 version: 2.{major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("invalid synchsafe integer: {0:02x?}")]
    InvalidSynchsafeInt([u8; 4]),

    #[error("ID3v2 header truncated: {available} of 10 bytes available")]
    TruncatedHeader { available: usize },

    #[error("frame data truncated at tag offset {offset}: source ended before {needed} bytes could be read")]
    TruncatedFrame { offset: usize, needed: usize },

    #[error("malformed frame {id:?} at tag offset {offset}: {reason}")]
    MalformedFrame {
        id: String,
        offset: usize,
        reason: String,
    },

    #[error(transparent)]
    Content(#[from] ContentError),
}

impl Id3Error {
    /// True when the source simply carries no ID3v2 tag.
    pub fn is_not_a_tag(&self) -> bool {
        matches!(self, Id3Error::NotATag)
    }

    /// True for the frame-level kinds that the lenient policy recovers from.
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            Id3Error::TruncatedFrame { .. }
                | Id3Error::MalformedFrame { .. }
                | Id3Error::InvalidSynchsafeInt(_)
        )
    }

    pub(crate) fn malformed(id: &str, offset: usize, reason: impl Into<String>) -> Self {
        Id3Error::MalformedFrame {
            id: id.to_string(),
            offset,
            reason: reason.into(),
        }
    }
}

/// Errors raised while interpreting a single frame's payload.
///
/// These are kept inside the frame's memoised content, so unlike [`Id3Error`]
/// they are cheap to clone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("invalid text encoding byte {byte} for ID3v2.{major}")]
    InvalidEncoding { byte: u8, major: u8 },

    #[error("{id} frame too short: {len} bytes")]
    FrameTooShort { id: String, len: usize },

    #[error("bad compressed data in {0} frame")]
    BadCompressedData(String),

    #[error("{0} frame is encrypted")]
    EncryptedFrame(String),
}

pub type Result<T> = std::result::Result<T, Id3Error>;
