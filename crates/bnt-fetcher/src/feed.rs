//! Syndication feed source.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::client::NewsClient;
use crate::error::FetchError;
use crate::types::{parse_published, FeedEntry};

/// Pull a feed and return its entries.
///
/// # Errors
///
/// Returns [`FetchError::Http`] on network failure,
/// [`FetchError::UnexpectedStatus`] on a non-2xx response, or
/// [`FetchError::Xml`] on malformed RSS.
pub async fn fetch_feed(client: &NewsClient, url: &str) -> Result<Vec<FeedEntry>, FetchError> {
    let response = client.client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = response.text().await?;
    parse_feed(&body)
}

/// Parse an RSS feed XML body into entries.
///
/// Entries without a link are dropped; descriptions have HTML stripped.
///
/// # Errors
///
/// Returns [`FetchError::Xml`] if the XML is malformed.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, FetchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current_title = String::new();
    let mut current_link = String::new();
    let mut current_description = String::new();
    let mut current_pub_date = String::new();
    let mut in_item = false;
    let mut current_tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                match name.as_str() {
                    "item" => {
                        in_item = true;
                        current_title.clear();
                        current_link.clear();
                        current_description.clear();
                        current_pub_date.clear();
                    }
                    _ => {
                        current_tag = name;
                    }
                }
            }
            Ok(Event::End(e)) => {
                let raw = e.name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                if name == "item" && in_item {
                    in_item = false;
                    if !current_link.is_empty() {
                        entries.push(FeedEntry {
                            title: current_title.clone(),
                            link: current_link.clone(),
                            summary: current_description.clone(),
                            published_at: parse_published(&current_pub_date),
                        });
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if in_item {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    assign_field(
                        &current_tag,
                        text,
                        &mut current_title,
                        &mut current_link,
                        &mut current_description,
                        &mut current_pub_date,
                    );
                }
            }
            Ok(Event::CData(e)) => {
                if in_item {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    assign_field(
                        &current_tag,
                        text,
                        &mut current_title,
                        &mut current_link,
                        &mut current_description,
                        &mut current_pub_date,
                    );
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FetchError::Xml(e)),
            _ => {}
        }
    }

    Ok(entries)
}

fn assign_field(
    tag: &str,
    text: String,
    title: &mut String,
    link: &mut String,
    description: &mut String,
    pub_date: &mut String,
) {
    match tag {
        "title" => *title = text,
        "link" => *link = text,
        "description" => *description = strip_html(&text),
        "pubDate" => *pub_date = text,
        _ => {}
    }
}

/// Strip HTML tags from a string, returning plain text.
fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.trim().to_string()
}
