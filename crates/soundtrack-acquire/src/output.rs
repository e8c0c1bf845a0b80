use crate::error::AcquireError;
use serde::{Deserialize, Serialize};
use soundtrack_model::{format_duration, Album};
use std::fs;
use std::path::Path;

/// Provenance information about a download run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    pub url: String,
    pub site: String,
    pub fetched_at: String,
    /// Requested format tag, uppercased.
    pub format: String,
    pub songs_ok: usize,
    pub songs_failed: usize,
}

impl SourceInfo {
    pub fn source_md(&self, album: &Album) -> String {
        format!(
            "# Source\n\n\
             - **Album:** {}\n\
             - **Site:** {}\n\
             - **URL:** {}\n\
             - **Fetched:** {}\n\
             - **Format:** {}\n\
             - **Songs:** {} ({} downloaded, {} failed)\n\
             - **Length:** {}\n\
             - **Images:** {}\n",
            album.name,
            self.site,
            self.url,
            self.fetched_at,
            self.format,
            album.songs.len(),
            self.songs_ok,
            self.songs_failed,
            format_duration(u32::try_from(album.total_seconds()).unwrap_or(u32::MAX)),
            album.images.len(),
        )
    }
}

fn save_error(path: &Path) -> impl FnOnce(std::io::Error) -> AcquireError {
    let path = path.to_path_buf();
    move |source| AcquireError::Save { path, source }
}

/// Write `album.json` and `source.md` into the album directory.
pub fn write_manifest(album: &Album, source: &SourceInfo, dir: &Path) -> Result<(), AcquireError> {
    fs::create_dir_all(dir).map_err(save_error(dir))?;

    // Album JSON, including resolved download links
    let json_path = dir.join("album.json");
    let json = serde_json::to_string_pretty(album)
        .map_err(|e| save_error(&json_path)(e.into()))?;
    fs::write(&json_path, &json).map_err(save_error(&json_path))?;
    tracing::info!(path = %json_path.display(), songs = album.songs.len(), "Wrote album JSON");

    // Source provenance
    let md_path = dir.join("source.md");
    fs::write(&md_path, source.source_md(album)).map_err(save_error(&md_path))?;
    tracing::info!(path = %md_path.display(), "Wrote source provenance");

    Ok(())
}
