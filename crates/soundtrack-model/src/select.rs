use std::collections::BTreeMap;

/// How a download link was chosen for a requested format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The requested format was available.
    Exact,
    /// FLAC was requested but only MP3 exists.
    FlacFallback,
    /// The requested format was missing; the lexicographically first
    /// available format was taken instead.
    FirstAvailable,
}

/// The link picked by [`select_url`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedLink<'a> {
    pub format: &'a str,
    pub url: &'a str,
    pub selection: Selection,
}

impl SelectedLink<'_> {
    /// True when the chosen format differs from the one requested.
    pub fn is_degraded(&self) -> bool {
        self.selection != Selection::Exact
    }
}

/// Pick one download URL from a song's links.
///
/// Policy, in order: exact case-insensitive match; FLAC falls back to MP3;
/// any other miss takes the first format in key order; no links at all
/// yields `None`.
pub fn select_url<'a>(
    links: &'a BTreeMap<String, String>,
    requested: &str,
) -> Option<SelectedLink<'a>> {
    let pick = |(format, url): (&'a String, &'a String), selection| SelectedLink {
        format: format.as_str(),
        url: url.as_str(),
        selection,
    };

    if let Some(entry) = links
        .iter()
        .find(|(format, _)| format.eq_ignore_ascii_case(requested))
    {
        return Some(pick(entry, Selection::Exact));
    }

    if requested.eq_ignore_ascii_case("FLAC") {
        return links
            .get_key_value("MP3")
            .map(|entry| pick(entry, Selection::FlacFallback));
    }

    links
        .iter()
        .next()
        .map(|entry| pick(entry, Selection::FirstAvailable))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_exact_match_any_case() {
        let l = links(&[("MP3", "a"), ("FLAC", "b")]);

        let lower = select_url(&l, "flac").unwrap();
        assert_eq!(lower.url, "b");
        assert_eq!(lower.selection, Selection::Exact);
        assert!(!lower.is_degraded());

        assert_eq!(select_url(&l, "FLAC").unwrap().url, "b");
        assert_eq!(select_url(&l, "Mp3").unwrap().url, "a");
    }

    #[test]
    fn test_flac_falls_back_to_mp3() {
        let l = links(&[("MP3", "a")]);
        let chosen = select_url(&l, "flac").unwrap();
        assert_eq!(chosen.url, "a");
        assert_eq!(chosen.format, "MP3");
        assert_eq!(chosen.selection, Selection::FlacFallback);
        assert!(chosen.is_degraded());
    }

    #[test]
    fn test_flac_without_mp3_finds_nothing() {
        let l = links(&[("OGG", "c")]);
        assert_eq!(select_url(&l, "flac"), None);
    }

    #[test]
    fn test_other_miss_takes_first_key() {
        let l = links(&[("OGG", "c"), ("FLAC", "b"), ("M4A", "d")]);
        let chosen = select_url(&l, "wav").unwrap();
        assert_eq!(chosen.format, "FLAC");
        assert_eq!(chosen.selection, Selection::FirstAvailable);
    }

    #[test]
    fn test_no_links() {
        let l = BTreeMap::new();
        assert_eq!(select_url(&l, "flac"), None);
        assert_eq!(select_url(&l, "mp3"), None);
    }
}
