/// What to do when a frame header or size turns out to be corrupt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MalformedFramePolicy {
    /// Stop at the bad frame and keep everything parsed before it.
    ///
    /// The error is still available through
    /// [`Tag::truncation`](crate::id3::tags::Tag::truncation).
    #[default]
    Truncate,
    /// Fail the whole extraction.
    Abort,
}

/// Options to control how tags are extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtractOptions {
    pub(crate) malformed_frames: MalformedFramePolicy,
    pub(crate) unsynchronisation: bool,
    pub(crate) verify_footer: bool,
}

impl Default for ExtractOptions {
    /// The default implementation for `ExtractOptions`
    ///
    /// The defaults are as follows:
    ///
    /// ```rust,ignore
    /// ExtractOptions {
    ///     malformed_frames: MalformedFramePolicy::Truncate,
    ///     unsynchronisation: true,
    ///     verify_footer: true,
    /// }
    /// ```
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Default malformed frame policy
    pub const DEFAULT_MALFORMED_FRAMES: MalformedFramePolicy = MalformedFramePolicy::Truncate;

    /// Creates a new `ExtractOptions`, alias for `Default` implementation
    ///
    /// # Examples
    ///
    /// ```rust
    /// use id3v2::id3::options::ExtractOptions;
    ///
    /// let extract_options = ExtractOptions::new();
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            malformed_frames: Self::DEFAULT_MALFORMED_FRAMES,
            unsynchronisation: true,
            verify_footer: true,
        }
    }

    /// How to react to a corrupt frame
    ///
    /// # Examples
    ///
    /// ```rust
    /// use id3v2::id3::options::{ExtractOptions, MalformedFramePolicy};
    ///
    /// // Corrupt frames fail the extraction
    /// let extract_options = ExtractOptions::new().malformed_frames(MalformedFramePolicy::Abort);
    /// ```
    #[must_use]
    pub fn malformed_frames(mut self, policy: MalformedFramePolicy) -> Self {
        self.malformed_frames = policy;
        self
    }

    /// Whether to reverse tag-wide unsynchronisation in ID3v2.2 and ID3v2.3 tags
    #[must_use]
    pub fn unsynchronisation(mut self, enabled: bool) -> Self {
        self.unsynchronisation = enabled;
        self
    }

    /// Whether to read and compare the ID3v2.4 footer, when the header announces one
    ///
    /// A bad footer is only ever logged.
    #[must_use]
    pub fn verify_footer(mut self, enabled: bool) -> Self {
        self.verify_footer = enabled;
        self
    }

    pub fn malformed_frame_policy(&self) -> MalformedFramePolicy {
        self.malformed_frames
    }
}
