pub mod album_page;
pub mod download;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod output;
pub mod rate_limit;
pub mod song_page;

pub use album_page::parse_album_page;
pub use download::{DownloadOptions, DownloadReport, Downloader};
pub use error::AcquireError;
pub use fetch::{AssetSink, HttpClient, HttpConfig, PageSource};
pub use rate_limit::RateLimiter;
pub use song_page::parse_download_links;

/// Origin of the soundtrack archive. Relative links on its pages resolve
/// against this.
pub const BASE_URL: &str = "https://downloads.khinsider.com";
