use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Longest file or directory name produced, in characters.
pub const MAX_FILENAME_CHARS: usize = 200;

static INVALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("valid regex"));

/// Make a string safe to use as a single path component.
///
/// Normalizes to NFC, strips `<>:"/\|?*` and truncates to
/// [`MAX_FILENAME_CHARS`] characters.
pub fn sanitize_filename(name: &str) -> String {
    let nfc: String = name.nfc().collect();
    let stripped = INVALID_CHARS.replace_all(&nfc, "");
    stripped.chars().take(MAX_FILENAME_CHARS).collect()
}

/// Directory name for an album; falls back to "untitled" when nothing
/// usable is left after sanitizing.
pub fn album_dir_name(album_name: &str) -> String {
    let name = sanitize_filename(album_name);
    let name = name.trim();
    if name.is_empty() {
        "untitled".to_string()
    } else {
        name.to_string()
    }
}

/// File extension of a URL's last path element, without the dot.
///
/// Anything after the final '.' counts, query string included.
pub fn url_extension(url: &str) -> Option<&str> {
    let last = url.rsplit('/').next()?;
    let (_, ext) = last.rsplit_once('.')?;
    (!ext.is_empty()).then_some(ext)
}

/// Percent-decoded, sanitized basename of a URL's path, if it has one.
pub fn url_basename(url: &Url) -> Option<String> {
    let segment = url.path().trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    let name = sanitize_filename(&decoded);
    (!name.trim().is_empty()).then_some(name)
}
