use crate::error::AcquireError;
use crate::fetch::{resolve_href, AssetSink, PageSource};
use crate::normalize::{album_dir_name, sanitize_filename, url_basename, url_extension};
use crate::output::{self, SourceInfo};
use crate::rate_limit::RateLimiter;
use crate::song_page::parse_download_links;
use reqwest::Url;
use soundtrack_model::{select_url, Album, Selection, Song};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What to download and where.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Requested format, matched case-insensitively against format tags.
    pub format: String,
    pub include_images: bool,
    /// Albums are written to `<output_root>/<album name>/`.
    pub output_root: PathBuf,
    /// Minimum spacing between consecutive download attempts.
    pub interval: Duration,
    /// Write `album.json` and `source.md` next to the songs.
    pub write_metadata: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            format: "flac".to_string(),
            include_images: true,
            output_root: PathBuf::from("downloads"),
            interval: Duration::from_millis(500),
            write_metadata: true,
        }
    }
}

/// Outcome of one album run.
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub album_dir: PathBuf,
    pub songs_ok: usize,
    pub songs_failed: usize,
    pub images_ok: usize,
    pub images_failed: usize,
    /// `(song name or image href, error message)` for every failure.
    pub failures: Vec<(String, String)>,
}

/// Drives an album through link resolution, format selection and saving.
///
/// Songs are processed strictly one after another; a failure is recorded
/// and the run moves on to the next song.
pub struct Downloader<'a, C> {
    client: &'a C,
    options: DownloadOptions,
    limiter: RateLimiter,
}

impl<'a, C: PageSource + AssetSink> Downloader<'a, C> {
    pub fn new(client: &'a C, options: DownloadOptions) -> Self {
        let limiter = RateLimiter::new(options.interval);
        Self::with_limiter(client, options, limiter)
    }

    pub fn with_limiter(client: &'a C, options: DownloadOptions, limiter: RateLimiter) -> Self {
        Self {
            client,
            options,
            limiter,
        }
    }

    pub fn album_dir(&self, album: &Album) -> PathBuf {
        self.options.output_root.join(album_dir_name(&album.name))
    }

    pub async fn download_album(&mut self, album: &mut Album) -> DownloadReport {
        let mut report = DownloadReport {
            album_dir: self.album_dir(album),
            ..DownloadReport::default()
        };
        let total = album.songs.len();

        tracing::info!(
            album = %album.name,
            songs = total,
            format = %self.options.format.to_uppercase(),
            dir = %report.album_dir.display(),
            delay_ms = self.limiter.interval().as_millis() as u64,
            "Downloading songs"
        );

        for (i, song) in album.songs.iter_mut().enumerate() {
            tracing::info!("[{}/{}] {}", i + 1, total, song.name);
            self.limiter.wait().await;

            match self.download_song(i + 1, song, &report.album_dir).await {
                Ok(file_name) => {
                    report.songs_ok += 1;
                    tracing::info!(file = %file_name, "Downloaded");
                }
                Err(e) => {
                    report.songs_failed += 1;
                    tracing::error!(song = %song.name, error = %e, "Song failed");
                    report.failures.push((song.name.clone(), e.to_string()));
                }
            }
            self.limiter.mark_done();
        }

        if self.options.include_images && !album.images.is_empty() {
            self.download_images(album, &mut report).await;
        }

        if self.options.write_metadata {
            let source = SourceInfo {
                url: album.link.clone(),
                site: site_name(&album.link),
                fetched_at: chrono::Utc::now().to_rfc3339(),
                format: self.options.format.to_uppercase(),
                songs_ok: report.songs_ok,
                songs_failed: report.songs_failed,
            };
            if let Err(e) = output::write_manifest(album, &source, &report.album_dir) {
                tracing::warn!(error = %e, "Could not write album metadata");
            }
        }

        report
    }

    /// Resolve, select and save one song. Returns the file name written.
    async fn download_song(
        &self,
        index: usize,
        song: &mut Song,
        dir: &Path,
    ) -> Result<String, AcquireError> {
        parse_download_links(self.client, song).await?;

        let chosen = select_url(&song.download_links, &self.options.format)
            .ok_or_else(|| AcquireError::NoLinkFound(song.name.clone()))?;
        if chosen.is_degraded() {
            let note = match chosen.selection {
                Selection::FlacFallback => "FLAC not available, using MP3",
                _ => "Requested format not available",
            };
            tracing::warn!(
                requested = %self.options.format.to_uppercase(),
                using = %chosen.format,
                "{note}"
            );
        }

        let parsed = Url::parse(chosen.url).map_err(|e| AcquireError::Parse {
            url: chosen.url.to_string(),
            reason: e.to_string(),
        })?;
        let file_name = url_basename(&parsed)
            .unwrap_or_else(|| fallback_song_filename(index, &song.name, chosen.url, chosen.format));

        self.client.save(chosen.url, &dir.join(&file_name)).await?;
        Ok(file_name)
    }

    async fn download_images(&mut self, album: &Album, report: &mut DownloadReport) {
        let art_dir = report.album_dir.join("Art");
        tracing::info!(images = album.images.len(), dir = %art_dir.display(), "Downloading album images");

        for (i, href) in album.images.iter().enumerate() {
            self.limiter.wait().await;

            match self.download_image(i, href, &art_dir).await {
                Ok(file_name) => {
                    report.images_ok += 1;
                    tracing::info!(file = %file_name, "Downloaded image");
                }
                Err(e) => {
                    report.images_failed += 1;
                    tracing::error!(image = %href, error = %e, "Image failed");
                    report.failures.push((href.clone(), e.to_string()));
                }
            }
            self.limiter.mark_done();
        }
    }

    async fn download_image(&self, index: usize, href: &str, dir: &Path) -> Result<String, AcquireError> {
        let url = resolve_href(href)?;
        let file_name = url_basename(&url).unwrap_or_else(|| format!("cover_{index}.jpg"));
        self.client.save(url.as_str(), &dir.join(&file_name)).await?;
        Ok(file_name)
    }
}

/// `"<3-digit index> - <song name>.<ext>"`, for URLs without a usable basename.
fn fallback_song_filename(index: usize, name: &str, url: &str, format: &str) -> String {
    // Drop any query string riding on the extension
    let ext = url_extension(url)
        .and_then(|ext| ext.split(['?', '&', '#']).next())
        .map(sanitize_filename)
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| format.to_lowercase());
    format!("{index:03} - {}.{ext}", sanitize_filename(name))
}

fn site_name(album_url: &str) -> String {
    Url::parse(album_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_default()
}
