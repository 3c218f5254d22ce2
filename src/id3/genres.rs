//! The legacy ID3v1 genre list and `TCON` content-type parsing.

/// ID3v1 genre list (index → genre name).
pub const GENRES: &[&str] = &[
    "Blues", "Classic Rock", "Country", "Dance", "Disco", "Funk", "Grunge",
    "Hip-Hop", "Jazz", "Metal", "New Age", "Oldies", "Other", "Pop", "R&B",
    "Rap", "Reggae", "Rock", "Techno", "Industrial", "Alternative", "Ska",
    "Death Metal", "Pranks", "Soundtrack", "Euro-Techno", "Ambient",
    "Trip-Hop", "Vocal", "Jazz+Funk", "Fusion", "Trance", "Classical",
    "Instrumental", "Acid", "House", "Game", "Sound Clip", "Gospel", "Noise",
    "AlternRock", "Bass", "Soul", "Punk", "Space", "Meditative",
    "Instrumental Pop", "Instrumental Rock", "Ethnic", "Gothic", "Darkwave",
    "Techno-Industrial", "Electronic", "Pop-Folk", "Eurodance", "Dream",
    "Southern Rock", "Comedy", "Cult", "Gangsta", "Top 40", "Christian Rap",
    "Pop/Funk", "Jungle", "Native American", "Cabaret", "New Wave",
    "Psychedelic", "Rave", "Showtunes", "Trailer", "Lo-Fi", "Tribal",
    "Acid Punk", "Acid Jazz", "Polka", "Retro", "Musical", "Rock & Roll",
    "Hard Rock", "Folk", "Folk-Rock", "National Folk", "Swing", "Fast Fusion",
    "Bebop", "Latin", "Revival", "Celtic", "Bluegrass", "Avantgarde",
    "Gothic Rock", "Progressive Rock", "Psychedelic Rock", "Symphonic Rock",
    "Slow Rock", "Big Band", "Chorus", "Easy Listening", "Acoustic", "Humour",
    "Speech", "Chanson", "Opera", "Chamber Music", "Sonata", "Symphony",
    "Booty Bass", "Primus", "Porn Groove", "Satire", "Slow Jam", "Club",
    "Tango", "Samba", "Folklore", "Ballad", "Power Ballad", "Rhythmic Soul",
    "Freestyle", "Duet", "Punk Rock", "Drum Solo", "A capella", "Euro-House",
    "Dance Hall", "Goa", "Drum & Bass", "Club-House", "Hardcore Techno",
    "Terror", "Indie", "BritPop", "Negerpunk", "Polsk Punk", "Beat",
    "Christian Gangsta Rap", "Heavy Metal", "Black Metal", "Crossover",
    "Contemporary Christian", "Christian Rock", "Merengue", "Salsa",
    "Thrash Metal", "Anime", "Jpop", "Synthpop", "Abstract", "Art Rock",
    "Baroque", "Bhangra", "Big Beat", "Breakbeat", "Chillout", "Downtempo",
    "Dub", "EBM", "Eclectic", "Electro", "Electroclash", "Emo", "Experimental",
    "Garage", "Global", "IDM", "Illbient", "Industro-Goth", "Jam Band",
    "Krautrock", "Leftfield", "Lounge", "Math Rock", "New Romantic",
    "Nu-Breakz", "Post-Punk", "Post-Rock", "Psytrance", "Shoegaze",
    "Space Rock", "Trop Rock", "World Music", "Neoclassical", "Audiobook",
    "Audio Theatre", "Neue Deutsche Welle", "Podcast", "Indie Rock",
    "G-Funk", "Dubstep", "Garage Rock", "Psybient",
];

/// Look up a genre code in the table.
pub fn genre_name(code: u32) -> Option<&'static str> {
    GENRES.get(usize::try_from(code).ok()?).copied()
}

/// A `TCON` value split into its legacy numeric reference and free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentType<'a> {
    /// `N` from `"N"`, `"(N)"` or `"(N)Text"`.
    pub code: Option<u32>,
    /// Non-numeric reference such as `RX` in `"(RX)"`.
    pub reference: Option<&'a str>,
    /// Text following the reference, or the whole value when there is none.
    pub text: &'a str,
    raw: &'a str,
}

impl<'a> ContentType<'a> {
    /// Handles formats like: "Rock", "(17)", "(17)Rock", "17", "(RX)", "(CR)".
    pub fn parse(value: &'a str) -> Self {
        let raw = value.trim();

        if let Some(rest) = raw.strip_prefix('(') {
            // "((" escapes a literal parenthesis in free text
            if !rest.starts_with('(') {
                if let Some(close) = rest.find(')') {
                    let inner = &rest[..close];
                    let text = &rest[close + 1..];
                    let code = inner.parse::<u32>().ok();
                    let reference = if code.is_none() { Some(inner) } else { None };
                    return ContentType { code, reference, text, raw };
                }
            }
        }

        ContentType {
            code: raw.parse::<u32>().ok(),
            reference: None,
            text: raw,
            raw,
        }
    }

    /// Human-readable genre: the table name for an in-range code, otherwise
    /// the trailing text, otherwise the raw value.
    pub fn description(&self) -> &'a str {
        if let Some(name) = self.code.and_then(genre_name) {
            return name;
        }
        match self.reference {
            Some("RX") => "Remix",
            Some("CR") => "Cover",
            _ if self.text.is_empty() => self.raw,
            _ => self.text,
        }
    }
}
