//! Link extraction from fetched pages

use crate::css::CssSelector;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static LINKISH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[href], [src]").expect("static selector"));

/// Elements whose `src` attribute carries the link target
const SRC_ELEMENTS: &[&str] = &[
    "img", "embed", "iframe", "input", "script", "source", "track", "video",
];

/// Elements whose `href` attribute carries the link target
const HREF_ELEMENTS: &[&str] = &["a", "area", "link"];

/// An outgoing link discovered on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Absolute URL, resolved against the page URL
    pub url: String,
    /// Text content of the linking element
    pub text: String,
}

/// Extract every link under the content node(s)
///
/// Elements carrying `href` or `src` are considered; anchors and their kin
/// use `href`, embedded-media elements use `src`, and for anything else
/// `href` wins over `src`. Relative URLs are resolved against `page_url`;
/// unresolvable ones are dropped.
#[must_use]
pub fn extract_links(page_url: &Url, html: &Html, content: Option<&CssSelector>) -> Vec<Link> {
    let mut links = Vec::new();
    match content {
        Some(css) => {
            for root in html.select(css.selector()) {
                collect_links(page_url, root, &mut links);
            }
        }
        None => collect_links(page_url, html.root_element(), &mut links),
    }
    links
}

fn collect_links(page_url: &Url, root: ElementRef<'_>, links: &mut Vec<Link>) {
    for element in root.select(&LINKISH) {
        let value = element.value();
        let name = value.name();

        let raw = if HREF_ELEMENTS.contains(&name) && value.attr("href").is_some() {
            value.attr("href")
        } else if SRC_ELEMENTS.contains(&name) && value.attr("src").is_some() {
            value.attr("src")
        } else {
            value.attr("href").or_else(|| value.attr("src"))
        };

        let Some(raw) = raw else { continue };
        let Ok(resolved) = page_url.join(raw) else {
            continue;
        };

        links.push(Link {
            url: resolved.to_string(),
            text: element.text().collect::<String>().trim().to_string(),
        });
    }
}
