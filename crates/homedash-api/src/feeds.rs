// RSS 2.0 / Atom 1.0 feed fetcher and parser (quick-xml).
//
// Format detection: a `feed` element means Atom (items are `entry`),
// a `channel` element means RSS (items are `item`). A well-formed XML
// document containing neither is rejected as a parse error.
//
// Field mapping:
//   title       <- title
//   link        <- link[href] (Atom) | link text (RSS)
//   description <- summary/content (Atom) | description (RSS)
//   date        <- updated/published (Atom, RFC 3339) | pubDate (RSS, RFC 2822)
//   author      <- author/name (Atom) | author | dc:creator (RSS)

use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const SERVICE: &str = "feeds";

// ── Parsed shapes ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFeed {
    /// Channel/feed title.
    pub title: Option<String>,
    pub items: Vec<RawFeedItem>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeedItem {
    /// guid (RSS) or id (Atom); falls back to the link when absent.
    pub id: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    /// Original description/summary markup.
    pub description: Option<String>,
    /// HTML-stripped plain text of the description, for previews.
    pub description_text: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Rss,
    Atom,
}

// ── Parser ───────────────────────────────────────────────────────────

/// Parse an RSS or Atom document.
///
/// Fails with [`Error::Parse`] when the XML is malformed or the document
/// contains neither a `channel` nor a `feed` element.
#[allow(clippy::too_many_lines)]
pub fn parse(xml: &str) -> Result<ParsedFeed, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut format: Option<Format> = None;
    let mut feed = ParsedFeed::default();
    let mut item: Option<RawFeedItem> = None;
    // Element name stack, kept as lowercase strings.
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut atom_link: Option<String> = None;

    loop {
        match reader.read_event() {
            Err(e) => {
                return Err(Error::Parse {
                    message: format!("{SERVICE}: malformed XML: {e}"),
                });
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(start)) => {
                let name = qname(&start);
                match name.as_str() {
                    "channel" => format = format.or(Some(Format::Rss)),
                    "feed" => format = format.or(Some(Format::Atom)),
                    "item" if format == Some(Format::Rss) => {
                        item = Some(RawFeedItem::default());
                    }
                    "entry" if format == Some(Format::Atom) => {
                        item = Some(RawFeedItem::default());
                    }
                    _ => {}
                }
                path.push(name);
                text.clear();
            }
            Ok(Event::Empty(start)) => {
                // Atom links are self-closing: <link href="..." rel="..."/>
                if qname(&start) == "link" && item.is_some() {
                    capture_atom_link(&start, &mut atom_link);
                }
            }
            Ok(Event::Text(t)) => {
                if let Ok(value) = t.unescape() {
                    text.push_str(&value);
                }
            }
            Ok(Event::CData(t)) => {
                text.push_str(&String::from_utf8_lossy(&t.into_inner()));
            }
            Ok(Event::End(_)) => {
                let Some(name) = path.pop() else { continue };
                let in_item = item.is_some();
                let value = text.trim().to_owned();
                text.clear();

                match (format, in_item, name.as_str()) {
                    (_, false, "title") if is_feed_level(&path) => {
                        if feed.title.is_none() && !value.is_empty() {
                            feed.title = Some(value);
                        }
                    }
                    (_, true, "item" | "entry") => {
                        if let Some(mut finished) = item.take() {
                            if finished.link.is_none() {
                                finished.link = atom_link.take();
                            }
                            if finished.id.is_none() {
                                finished.id = finished.link.clone();
                            }
                            atom_link = None;
                            feed.items.push(finished);
                        }
                    }
                    (_, true, "title") => set_if_empty(&mut item, |i| &mut i.title, value),
                    (Some(Format::Rss), true, "link") => {
                        set_if_empty(&mut item, |i| &mut i.link, value);
                    }
                    (Some(Format::Rss), true, "description")
                    | (Some(Format::Atom), true, "summary" | "content") => {
                        if let Some(ref mut i) = item {
                            if i.description.is_none() && !value.is_empty() {
                                i.description_text = Some(strip_html(&value));
                                i.description = Some(value);
                            }
                        }
                    }
                    (Some(Format::Rss), true, "pubDate") => {
                        if let Some(ref mut i) = item {
                            i.published = i.published.or_else(|| parse_rfc2822(&value));
                        }
                    }
                    (Some(Format::Atom), true, "updated" | "published") => {
                        if let Some(ref mut i) = item {
                            i.published = i.published.or_else(|| parse_rfc3339(&value));
                        }
                    }
                    (Some(Format::Rss), true, "author" | "dc:creator") => {
                        set_if_empty(&mut item, |i| &mut i.author, value);
                    }
                    (Some(Format::Atom), true, "name") if path.last().is_some_and(|p| p == "author") => {
                        set_if_empty(&mut item, |i| &mut i.author, value);
                    }
                    (Some(Format::Rss), true, "guid") | (Some(Format::Atom), true, "id") => {
                        set_if_empty(&mut item, |i| &mut i.id, value);
                    }
                    _ => {}
                }
            }
            Ok(_) => {}
        }
    }

    if format.is_none() {
        return Err(Error::Parse {
            message: format!("{SERVICE}: document contains neither <channel> nor <feed>"),
        });
    }

    Ok(feed)
}

fn qname(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

/// True when the current path points at the channel/feed header rather
/// than inside an item.
fn is_feed_level(path: &[String]) -> bool {
    path.last()
        .is_some_and(|p| p == "channel" || p == "feed")
}

fn set_if_empty(
    item: &mut Option<RawFeedItem>,
    field: impl FnOnce(&mut RawFeedItem) -> &mut Option<String>,
    value: String,
) {
    if value.is_empty() {
        return;
    }
    if let Some(i) = item {
        let slot = field(i);
        if slot.is_none() {
            *slot = Some(value);
        }
    }
}

/// Capture an Atom `<link href=.../>`, preferring rel="alternate" (or no
/// rel attribute) over enclosure/self links.
fn capture_atom_link(start: &BytesStart<'_>, slot: &mut Option<String>) {
    let mut href = None;
    let mut rel = None;
    for attr in start.attributes().flatten() {
        match attr.key.as_ref() {
            b"href" => href = attr.unescape_value().ok().map(|v| v.into_owned()),
            b"rel" => rel = attr.unescape_value().ok().map(|v| v.into_owned()),
            _ => {}
        }
    }
    let alternate = rel.as_deref().is_none_or(|r| r == "alternate");
    if let Some(href) = href {
        if alternate || slot.is_none() {
            *slot = Some(href);
        }
    }
}

fn parse_rfc2822(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Strip HTML tags and decode the common entities, collapsing runs of
/// whitespace, to produce a plain-text preview.
pub fn strip_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Fetcher ──────────────────────────────────────────────────────────

/// Fetches and parses RSS/Atom feeds.
pub struct FeedClient {
    http: reqwest::Client,
}

impl FeedClient {
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch one feed URL and parse it.
    pub async fn fetch(&self, url: &str) -> Result<ParsedFeed, Error> {
        let url = Url::parse(url)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let text = resp.text().await?;
        parse(&text)
    }
}
