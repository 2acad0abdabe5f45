//! Feed document synthesis
//!
//! Assembles search results into the RSS document handed to the polling
//! cache. The envelope is fixed; only the items vary.

use crate::provider::RawResult;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use quick_xml::escape::{escape, partial_escape};

/// Characters left as-is when encoding an item link
///
/// Everything else outside ASCII alphanumerics is percent-encoded.
const LINK_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'/')
    .remove(b',')
    .remove(b':');

/// Builds a complete feed document for a provider's results
///
/// Items appear in the order given. An empty result list still produces a
/// well-formed document with an empty channel body.
///
/// # Examples
///
/// ```
/// use feed_scout::synthesize_feed;
///
/// let xml = synthesize_feed("Torrentz", "https://torrentz2.eu/", &[]);
/// assert!(xml.starts_with("<rss"));
/// assert!(!xml.contains("<item>"));
/// ```
pub fn synthesize_feed(name: &str, base_url: &str, results: &[RawResult]) -> String {
    let mut xml = String::new();

    xml.push_str(r#"<rss xmlns:atom="http://www.w3.org/2005/Atom" version="2.0">"#);
    xml.push_str("<channel>");
    xml.push_str(&format!("<title>{}</title>", partial_escape(name)));
    xml.push_str(&format!("<link>{}</link>", partial_escape(base_url)));
    xml.push_str("<description>torrent search</description>");
    xml.push_str("<language>en-us</language>");
    xml.push_str(&format!(
        r#"<atom:link href="{}" rel="self" type="application/rss+xml"/>"#,
        escape(base_url)
    ));

    for result in results {
        xml.push_str("<item>");
        xml.push_str(&format!("<title>{}</title>", partial_escape(&result.title)));
        xml.push_str(&format!("<link>{}</link>", encode_link(&result.locator)));
        xml.push_str("</item>");
    }

    xml.push_str("</channel></rss>");
    xml
}

/// Percent-encodes a locator, keeping `/`, `,` and `:` readable
fn encode_link(locator: &str) -> String {
    utf8_percent_encode(locator, LINK_SAFE).to_string()
}
