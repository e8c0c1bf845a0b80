use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One track of an album, as scraped from the album table and its song page.
///
/// Created during album parsing with `name`, `link` and `length_seconds`
/// populated; `download_links` is filled in later by the link resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub name: String,
    /// Absolute URL of the song page. Empty when the row carried no link.
    pub link: String,
    pub length_seconds: u32,
    /// Format tag (uppercased file extension, e.g. "MP3") to download URL.
    #[serde(default)]
    pub download_links: BTreeMap<String, String>,
    /// Format tag to declared size in KB, as listed in the album table.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sizes: BTreeMap<String, u64>,
}

impl Song {
    pub fn new(name: impl Into<String>, link: impl Into<String>, length_seconds: u32) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            length_seconds,
            ..Self::default()
        }
    }

    /// Record a download URL for `format`. The first URL seen for a format
    /// is kept; later ones are ignored. Returns whether the link was stored.
    pub fn add_download_link(&mut self, format: impl Into<String>, url: impl Into<String>) -> bool {
        match self.download_links.entry(format.into()) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(url.into());
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }
}

/// An album page: metadata, artwork and the ordered track list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    pub link: String,
    /// Image hrefs in page order. Relative paths are kept as written.
    pub images: Vec<String>,
    /// Songs in table row order. Never contains a song with an empty name.
    pub songs: Vec<Song>,
}

impl Album {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            ..Self::default()
        }
    }

    /// Append a song, dropping it if its name is empty.
    pub fn push_song(&mut self, song: Song) -> bool {
        if song.name.is_empty() {
            return false;
        }
        self.songs.push(song);
        true
    }

    /// Total running time of all songs with a known duration.
    pub fn total_seconds(&self) -> u64 {
        self.songs.iter().map(|s| u64::from(s.length_seconds)).sum()
    }
}

/// Convert "MM:SS" into seconds.
///
/// Exactly two colon-separated unsigned numbers are required; anything else
/// yields 0.
pub fn parse_duration(text: &str) -> u32 {
    let mut parts = text.split(':');
    let (Some(minutes), Some(seconds), None) = (parts.next(), parts.next(), parts.next()) else {
        return 0;
    };
    match (minutes.parse::<u32>(), seconds.parse::<u32>()) {
        (Ok(m), Ok(s)) => m.saturating_mul(60).saturating_add(s),
        _ => 0,
    }
}

/// Format seconds back into "M:SS" for display.
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
