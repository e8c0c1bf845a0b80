use crate::error::AcquireError;
use crate::fetch::PageSource;
use crate::normalize::url_extension;
use scraper::{Html, Selector};
use soundtrack_model::Song;

/// Fetch a song's page and fill in its download links.
///
/// Links already present on the song are kept; for each format the first
/// link seen wins.
pub async fn parse_download_links<P: PageSource>(
    source: &P,
    song: &mut Song,
) -> Result<(), AcquireError> {
    if song.link.is_empty() {
        return Err(AcquireError::MissingLink(song.name.clone()));
    }

    let html = source.fetch_page(&song.link).await?;
    let links = extract_download_links(&html);
    tracing::debug!(song = %song.name, formats = links.len(), "Found download links");

    for (format, url) in links {
        if !song.add_download_link(format.as_str(), url.as_str()) {
            tracing::debug!(song = %song.name, format = %format, url = %url, "Ignoring duplicate format link");
        }
    }
    Ok(())
}

/// Pull `(format tag, url)` pairs out of a song page, in page order.
///
/// Only absolute `https://` anchors in the content paragraphs count, and
/// only when their last path element has an extension.
pub fn extract_download_links(html: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(html);
    let a_sel = Selector::parse("#pageContent p a").expect("valid selector");

    document
        .select(&a_sel)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.starts_with("https://"))
        .filter_map(|href| {
            let format = url_extension(href)?.to_uppercase();
            Some((format, href.to_string()))
        })
        .collect()
}
