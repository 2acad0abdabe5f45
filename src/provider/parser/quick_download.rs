//! Pattern extraction for HTML result tables with quick-download links.

use super::RawResult;
use regex::Regex;
use std::sync::LazyLock;

/// A torrent title link followed by its quick-download cell
static QUICK_DOWNLOAD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?ms)<span class="title"><a href="/torrent/\d+">(?P<title>.*?)</a>.*?<td class="quickdownload">\s+<a href="(?P<url>.*?)">"#,
    )
    .unwrap()
});

/// Extracts (title, download URL) pairs in document order
///
/// Dots in titles become spaces. Titles outside ASCII are skipped.
pub(super) fn parse_results(body: &str) -> Vec<RawResult> {
    let mut results = Vec::new();

    for captures in QUICK_DOWNLOAD_PATTERN.captures_iter(body) {
        let title = &captures["title"];
        let url = &captures["url"];

        if !title.is_ascii() {
            tracing::debug!(
                title,
                "Skipping torrent, non standard character found in title"
            );
            continue;
        }

        match RawResult::new(title.replace('.', " "), url) {
            Some(result) => {
                tracing::debug!(title = %result.title, "Found torrent");
                results.push(result);
            }
            None => {
                tracing::debug!("Skipping torrent, unable to extract download information");
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULT_PAGE: &str = r#"
<table id="torrenttable">
  <tr>
    <td class="name">
      <span class="title"><a href="/torrent/1001">Show.A.S03E07.720p.HDTV.x264</a></span>
    </td>
    <td class="quickdownload">
      <a href="https://tracker.example/download/1001/Show.A.S03E07.torrent"><img src="/dl.png"></a>
    </td>
  </tr>
  <tr>
    <td class="name">
      <span class="title"><a href="/torrent/1002">Café.Show.S01E01</a></span>
    </td>
    <td class="quickdownload">
      <a href="https://tracker.example/download/1002/Cafe.torrent"><img src="/dl.png"></a>
    </td>
  </tr>
  <tr>
    <td class="name">
      <span class="title"><a href="/torrent/1003">Show.A.S03E08.1080p.WEB</a></span>
    </td>
    <td class="quickdownload">
      <a href="https://tracker.example/download/1003/Show.A.S03E08.torrent"><img src="/dl.png"></a>
    </td>
  </tr>
</table>
"#;

    #[test]
    fn test_extracts_results_in_order_and_skips_non_ascii() {
        let results = parse_results(RESULT_PAGE);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Show A S03E07 720p HDTV x264");
        assert_eq!(
            results[0].locator,
            "https://tracker.example/download/1001/Show.A.S03E07.torrent"
        );
        assert_eq!(results[1].title, "Show A S03E08 1080p WEB");
        assert_eq!(
            results[1].locator,
            "https://tracker.example/download/1003/Show.A.S03E08.torrent"
        );
    }

    #[test]
    fn test_empty_body_yields_nothing() {
        assert!(parse_results("").is_empty());
        assert!(parse_results("<html><body>No torrents</body></html>").is_empty());
    }

    #[test]
    fn test_empty_link_is_skipped() {
        let body = r#"<span class="title"><a href="/torrent/5">Title</a></span>
<td class="quickdownload">
  <a href="">"#;
        assert!(parse_results(body).is_empty());
    }
}
