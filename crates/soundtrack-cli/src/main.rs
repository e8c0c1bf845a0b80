use anyhow::Result;
use clap::Parser;
use soundtrack_acquire::{DownloadOptions, Downloader, HttpClient, HttpConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "soundtrack")]
#[command(about = "Download a soundtrack album: every track in the chosen format, plus its artwork")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Album page URL
    album_url: String,

    /// Download format, e.g. mp3 or flac (FLAC falls back to MP3 when missing)
    #[arg(long, default_value = "flac")]
    format: String,

    /// Skip downloading album images
    #[arg(long)]
    no_images: bool,

    /// Root directory; each album goes into its own subdirectory
    #[arg(short = 'O', long, default_value = "downloads")]
    output_dir: PathBuf,

    /// Minimum delay between consecutive downloads, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Don't write album.json and source.md
    #[arg(long)]
    no_metadata: bool,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long)]
    utc: bool,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Cli {
    fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            format: self.format.to_lowercase(),
            include_images: !self.no_images,
            output_root: self.output_dir.clone(),
            interval: Duration::from_millis(self.delay_ms),
            write_metadata: !self.no_metadata,
        }
    }
}

fn init_tracing(cli: &Cli) {
    // Map log level, suppressing noisy HTML-parsing crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn  => "warn",
        LogLevel::Info  => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let client = HttpClient::new(&HttpConfig::default())?;

    // A failed album page ends the run; per-song failures are only counted
    let mut album = match soundtrack_acquire::parse_album_page(&client, &cli.album_url).await {
        Ok(album) => album,
        Err(e) => {
            tracing::error!(url = %cli.album_url, error = %e, "Error parsing album");
            return Ok(());
        }
    };

    tracing::info!(
        album = %album.name,
        songs = album.songs.len(),
        images = album.images.len(),
        length = %soundtrack_model::format_duration(
            u32::try_from(album.total_seconds()).unwrap_or(u32::MAX)
        ),
        format = %cli.format.to_uppercase(),
        "Album"
    );

    let mut downloader = Downloader::new(&client, cli.download_options());
    let report = downloader.download_album(&mut album).await;

    tracing::info!(
        successful = report.songs_ok,
        failed = report.songs_failed,
        images = report.images_ok,
        images_failed = report.images_failed,
        "Download summary"
    );
    tracing::info!(path = %report.album_dir.display(), "Files saved");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["soundtrack", "https://example.com/album"]).unwrap();
        let options = cli.download_options();
        assert_eq!(options.format, "flac");
        assert!(options.include_images);
        assert!(options.write_metadata);
        assert_eq!(options.output_root, PathBuf::from("downloads"));
        assert_eq!(options.interval, Duration::from_millis(500));
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "soundtrack",
            "https://example.com/album",
            "--format",
            "MP3",
            "--no-images",
            "--delay-ms",
            "0",
            "-O",
            "music",
        ])
        .unwrap();
        let options = cli.download_options();
        assert_eq!(options.format, "mp3");
        assert!(!options.include_images);
        assert!(options.interval.is_zero());
        assert_eq!(options.output_root, PathBuf::from("music"));
    }

    #[test]
    fn test_album_url_required() {
        assert!(Cli::try_parse_from(["soundtrack"]).is_err());
    }
}
