/// Named fields exposed as accessors on [`Tag`](crate::id3::tags::Tag).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Track,
    Artist,
    Title,
    Album,
    Year,
    Genre,
    Comment,
    Composer,
    OriginalArtist,
    Copyright,
    Url,
    Encoder,
    AlbumImage,
    Lyrics,
    AlbumArtist,
    Disc,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::Track,
        Field::Artist,
        Field::Title,
        Field::Album,
        Field::Year,
        Field::Genre,
        Field::Comment,
        Field::Composer,
        Field::OriginalArtist,
        Field::Copyright,
        Field::Url,
        Field::Encoder,
        Field::AlbumImage,
        Field::Lyrics,
        Field::AlbumArtist,
        Field::Disc,
    ];

    /// Frame ids carrying this field in a tag of the given major version,
    /// in order of preference.
    pub fn frame_ids(self, major: u8) -> &'static [&'static str] {
        if major == 2 {
            return match self {
                Field::Track => &["TRK"],
                Field::Artist => &["TP1"],
                Field::Title => &["TT2"],
                Field::Album => &["TAL"],
                Field::Year => &["TYE"],
                Field::Genre => &["TCO"],
                Field::Comment => &["COM"],
                Field::Composer => &["TCM"],
                Field::OriginalArtist => &["TOA"],
                Field::Copyright => &["TCR"],
                Field::Url => &["WXX"],
                Field::Encoder => &["TEN"],
                Field::AlbumImage => &["PIC"],
                Field::Lyrics => &["ULT"],
                Field::AlbumArtist => &["TP2"],
                Field::Disc => &["TPA"],
            };
        }

        match self {
            Field::Track => &["TRCK"],
            Field::Artist => &["TPE1"],
            Field::Title => &["TIT2"],
            Field::Album => &["TALB"],
            // TYER was folded into TDRC by v2.4, but plenty of v2.4 writers keep it
            Field::Year if major >= 4 => &["TDRC", "TYER"],
            Field::Year => &["TYER"],
            Field::Genre => &["TCON"],
            Field::Comment => &["COMM"],
            Field::Composer => &["TCOM"],
            Field::OriginalArtist => &["TOPE"],
            Field::Copyright => &["TCOP"],
            Field::Url => &["WXXX"],
            Field::Encoder => &["TENC"],
            Field::AlbumImage => &["APIC"],
            Field::Lyrics => &["USLT"],
            Field::AlbumArtist => &["TPE2"],
            Field::Disc => &["TPOS"],
        }
    }
}
