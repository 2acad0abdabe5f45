//! Parser for paged XML search feeds.
//!
//! The feed exposes no download link, so each result's locator is rebuilt
//! as a magnet URI from the item's guid (the info hash behind the site's
//! base URL) and its title.

use super::{ParseError, RawResult};
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// Parse a search feed page from its raw XML text
pub(super) fn parse_results(body: &str, base_url: &str) -> Result<Vec<RawResult>, ParseError> {
    if !body.trim_start().starts_with("<?xml") {
        tracing::debug!("Response is not an XML document, ignoring it");
        return Ok(Vec::new());
    }

    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut results = Vec::new();
    let mut current_item: Option<FeedItemBuilder> = None;
    let mut current_element = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                if name == "item" {
                    current_item = Some(FeedItemBuilder::default());
                }
                current_element = name;
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    if let Some(builder) = current_item.take() {
                        match builder.build(base_url) {
                            Some(result) => results.push(result),
                            None => tracing::debug!("Skipping item without guid or title"),
                        }
                    }
                }
                current_element.clear();
            }
            Ok(Event::Text(e)) => {
                if let Some(ref mut item) = current_item {
                    let text = match e.unescape_with(resolve_entity) {
                        Ok(text) => text.into_owned(),
                        Err(err) => {
                            tracing::debug!(
                                element = %current_element,
                                "Keeping undecoded text: {}",
                                err
                            );
                            String::from_utf8_lossy(&e).into_owned()
                        }
                    };
                    item.append(&current_element, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(ref mut item) = current_item {
                    let text = String::from_utf8_lossy(&e);
                    item.append(&current_element, &text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ParseError::Xml(format!(
                    "{} at position {}",
                    e,
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    Ok(results)
}

/// Resolves the XML entities plus `&nbsp;`, which feeds use in titles
fn resolve_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some(" "),
        _ => resolve_xml_entity(entity),
    }
}

#[derive(Default)]
struct FeedItemBuilder {
    guid: Option<String>,
    title: Option<String>,
}

impl FeedItemBuilder {
    fn append(&mut self, element: &str, text: &str) {
        if text.is_empty() {
            return;
        }

        let field = match element {
            "guid" => &mut self.guid,
            "title" => &mut self.title,
            _ => return,
        };
        field.get_or_insert_with(String::new).push_str(text);
    }

    fn build(self, base_url: &str) -> Option<RawResult> {
        let guid = self.guid?;
        // Characters outside ASCII are dropped rather than failing the item
        let title: String = self.title?.chars().filter(char::is_ascii).collect();

        let locator = format!(
            "magnet:?xt=urn:btih:{}&dn={}.torrent",
            strip_base_url(&guid, base_url),
            title
        );

        RawResult::new(title, locator)
    }
}

/// Removes the site base URL, in both its https and http form, from a guid
fn strip_base_url(guid: &str, base_url: &str) -> String {
    let host_part = base_url
        .strip_prefix("https://")
        .or_else(|| base_url.strip_prefix("http://"));

    match host_part {
        Some(host_part) => ["https://", "http://"]
            .iter()
            .fold(guid.to_string(), |stripped, scheme| {
                stripped.replace(&format!("{scheme}{host_part}"), "")
            }),
        None if base_url.is_empty() => guid.to_string(),
        None => guid.replace(base_url, ""),
    }
}
