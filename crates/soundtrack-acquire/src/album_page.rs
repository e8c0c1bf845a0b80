use crate::error::AcquireError;
use crate::fetch::{resolve_href, PageSource};
use scraper::{ElementRef, Html, Selector};
use soundtrack_model::{parse_duration, Album, Song};

/// Row id marker for the summary rows at the bottom of the track table.
const FOOTER_MARKER: &str = "songlist_footer";
const HEADER_ID: &str = "songlist_header";

/// Fetch an album page and parse it into an [`Album`].
///
/// A page without a track table yields an album with no songs.
pub async fn parse_album_page<P: PageSource>(
    source: &P,
    album_url: &str,
) -> Result<Album, AcquireError> {
    tracing::info!(url = %album_url, "Fetching album page");
    let html = source.fetch_page(album_url).await?;
    tracing::info!(bytes = html.len(), "Received HTML");

    let album = parse_album_html(&html, album_url);
    tracing::info!(
        name = %album.name,
        songs = album.songs.len(),
        images = album.images.len(),
        "Parsed album page"
    );
    Ok(album)
}

/// Parse album page HTML.
pub fn parse_album_html(html: &str, album_url: &str) -> Album {
    let document = Html::parse_document(html);
    let mut album = Album::new(album_url);

    let name_sel = Selector::parse("#pageContent h2").expect("valid selector");
    if let Some(h2) = document.select(&name_sel).next() {
        album.name = element_text(h2);
    }

    let image_sel = Selector::parse("div.albumImage a").expect("valid selector");
    album.images = document
        .select(&image_sel)
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect();

    let table_sel = Selector::parse("table#songlist").expect("valid selector");
    let Some(table) = document.select(&table_sel).next() else {
        tracing::warn!(url = %album_url, "No song list table on album page");
        return album;
    };

    let tr_sel = Selector::parse("tr").expect("valid selector");
    let size_columns = table
        .select(&tr_sel)
        .find(|tr| tr.value().id() == Some(HEADER_ID))
        .map(header_size_columns)
        .unwrap_or_default();

    for (index, tr) in table.select(&tr_sel).enumerate() {
        if tr.value().id().is_some_and(|id| id.contains(FOOTER_MARKER)) {
            continue;
        }

        let song = parse_song_row(tr, &size_columns);
        if song.name.is_empty() {
            tracing::debug!(row = index, "Skipping row without a song name");
            continue;
        }
        album.push_song(song);
    }

    album
}

fn parse_song_row(tr: ElementRef, size_columns: &[(usize, String)]) -> Song {
    let cell_sel = Selector::parse("td.clickable-row").expect("valid selector");
    let a_sel = Selector::parse("a").expect("valid selector");

    let mut song = Song::default();
    let mut cells = tr.select(&cell_sel);

    if let Some(a) = cells.next().and_then(|td| td.select(&a_sel).next()) {
        song.name = element_text(a);
        if let Some(href) = a.value().attr("href") {
            match resolve_href(href) {
                Ok(url) => song.link = url.to_string(),
                Err(e) => tracing::warn!(song = %song.name, error = %e, "Unusable song link"),
            }
        }
    }

    if let Some(td) = cells.next() {
        song.length_seconds = parse_duration(&element_text(td));
    }

    if !size_columns.is_empty() {
        let td_sel = Selector::parse("td").expect("valid selector");
        let tds: Vec<ElementRef> = tr.select(&td_sel).collect();
        for (column, format) in size_columns {
            if let Some(kb) = tds.get(*column).and_then(|td| parse_size_kb(&element_text(*td))) {
                song.sizes.insert(format.clone(), kb);
            }
        }
    }

    song
}

/// Header columns whose label names a format, e.g. "MP3" or "FLAC".
fn header_size_columns(header: ElementRef) -> Vec<(usize, String)> {
    let th_sel = Selector::parse("th").expect("valid selector");
    header
        .select(&th_sel)
        .enumerate()
        .filter_map(|(column, th)| {
            let label = element_text(th);
            is_format_label(&label).then_some((column, label))
        })
        .collect()
}

fn is_format_label(label: &str) -> bool {
    (2..=5).contains(&label.len())
        && label != "CD"
        && label.chars().any(|c| c.is_ascii_uppercase())
        && label.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Parse a listed file size ("4.12 MB", "812 KB") into KB.
fn parse_size_kb(text: &str) -> Option<u64> {
    let (number, unit) = text.trim().split_once(char::is_whitespace)?;
    let value: f64 = number.replace(',', "").parse().ok()?;
    let factor = match unit.trim().to_ascii_uppercase().as_str() {
        "KB" => 1.0,
        "MB" => 1024.0,
        "GB" => 1024.0 * 1024.0,
        _ => return None,
    };
    (value >= 0.0).then(|| (value * factor).round() as u64)
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
