/// Pagination information extracted from GitHub's Link header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPagination {
    /// The next page number (from rel="next" link)
    pub next_page: Option<u64>,
    /// The last page number (from rel="last" link)
    pub last_page: Option<u64>,
}

/// Parse the Link header to extract pagination info. Only `rel="next"` and
/// `rel="last"` are kept.
///
/// GitHub Link headers look like:
/// `<https://api.github.com/repositories/1/commits?per_page=1&page=2>; rel="next", <...&page=7>; rel="last"`
pub fn parse_link_header(link_header: &str) -> LinkPagination {
    let mut info = LinkPagination::default();

    for part in link_header.split(',') {
        let mut url = None;
        let mut rel = None;

        for segment in part.trim().split(';') {
            let segment = segment.trim();
            if let Some(inner) = segment
                .strip_prefix('<')
                .and_then(|s| s.strip_suffix('>'))
            {
                url = Some(inner);
            } else if let Some(rel_value) = segment.strip_prefix("rel=") {
                rel = Some(rel_value.trim_matches('"'));
            }
        }

        if let (Some(url), Some(rel_type)) = (url, rel) {
            match rel_type {
                "next" => info.next_page = extract_page_from_url(url),
                "last" => info.last_page = extract_page_from_url(url),
                _ => {}
            }
        }
    }

    info
}

fn extract_page_from_url(url: &str) -> Option<u64> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}
