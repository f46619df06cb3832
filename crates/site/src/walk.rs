//! Page walk: structure tree x fetched page -> commands

use crate::css::CssSelector;
use crate::links::{extract_links, Link};
use crate::matcher::UrlMatch;
use crate::node::StructureNode;
use crate::path;
use mscrape_errors::{Error, SiteError};
use scraper::{ElementRef, Html};
use url::Url;

/// A fetched page: final URL plus body text
#[derive(Debug, Clone)]
pub struct Page {
    url: Url,
    body: String,
}

impl Page {
    /// Wrap a fetched response body
    ///
    /// # Errors
    ///
    /// Returns [`mscrape_errors::NetworkError::InvalidUrl`] when the URL
    /// does not parse.
    pub fn new(url: &str, body: impl Into<String>) -> Result<Self, Error> {
        let url = Url::parse(url)
            .map_err(|e| mscrape_errors::NetworkError::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self {
            url,
            body: body.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Request metadata carried from the page that discovered a URL to the
/// walk of its response
#[derive(Debug, Clone)]
pub struct PageUrlInfo {
    /// URL to request (after `as_url` rewriting)
    pub url: String,
    /// Accumulated save path relative to `save_dir`
    pub file_path: String,
    /// Child indexes addressing the matched structure node
    pub structure_path: Vec<usize>,
    /// Captures from the node's url matcher
    pub url_match: Option<UrlMatch>,
    /// Text of the linking element, for diagnostics
    pub link_text: String,
}

/// One action the crawl engine should take
#[derive(Debug, Clone)]
pub enum UrlCommand {
    /// Fetch the page and walk its response
    Request(PageUrlInfo),
    /// Stream the URL to a file
    Download { url: String, file_path: String },
    /// Write extracted content to a file
    SaveContent { file_path: String, content: Vec<u8> },
}

pub(crate) fn url_commands(
    root: &StructureNode,
    page: &Page,
    parent: Option<&PageUrlInfo>,
) -> Result<Vec<UrlCommand>, Error> {
    let html = Html::parse_document(page.body());
    let info;
    let parent = match parent {
        Some(parent) => parent,
        None => {
            info = PageUrlInfo {
                url: page.url().to_string(),
                file_path: String::new(),
                structure_path: Vec::new(),
                url_match: None,
                link_text: String::new(),
            };
            &info
        }
    };
    walk(root, page, &html, parent)
}

fn walk(
    root: &StructureNode,
    page: &Page,
    html: &Html,
    parent: &PageUrlInfo,
) -> Result<Vec<UrlCommand>, Error> {
    let node = root
        .node_by_path(&parent.structure_path)
        .ok_or_else(|| Error::internal("structure path points outside the tree"))?;

    assert_content(node, html, page)?;

    if node.is_leaf() && !node.is_root() {
        let content = match node.file_content() {
            Some(selector) => extract_content(html, node.content_selector(), selector)?,
            None => page.body().as_bytes().to_vec(),
        };
        return Ok(vec![UrlCommand::SaveContent {
            file_path: parent.file_path.clone(),
            content,
        }]);
    }

    let links: Vec<Link> = extract_links(page.url(), html, node.content_selector());
    let mut commands = Vec::new();

    // Search for the next listing page
    if node.paging() {
        for link in &links {
            let Some(url_match) = node.match_url(&link.url) else {
                continue;
            };
            let converted = node.convert_url(&link.url, Some(&url_match));
            let mut next_page_path = parent.file_path.clone();
            if let Some(component) = node.file_path_component(Some(&url_match)) {
                next_page_path = path::join(path::dirname(&parent.file_path), &component)?;
            }
            commands.push(UrlCommand::Request(PageUrlInfo {
                url: converted,
                file_path: next_page_path,
                structure_path: parent.structure_path.clone(),
                url_match: Some(url_match),
                link_text: link.text.clone(),
            }));
        }
    }

    let mut forwardable_found = false;

    for (index, child) in node.children().iter().enumerate() {
        if child.needs_no_request() || node.is_root() {
            let forwarded_match = if node.is_root() {
                match child.match_url(page.url().as_str()) {
                    Some(url_match) => Some(url_match),
                    None => continue,
                }
            } else {
                parent.url_match.clone()
            };
            forwardable_found = true;

            let mut file_path = parent.file_path.clone();
            if let Some(component) = child.file_path_component(forwarded_match.as_ref()) {
                file_path = path::join(&file_path, &component)?;
            }
            let converted = child.convert_url(page.url().as_str(), forwarded_match.as_ref());

            let mut structure_path = parent.structure_path.clone();
            structure_path.push(index);
            let forwarded = PageUrlInfo {
                url: converted,
                file_path,
                structure_path,
                url_match: forwarded_match,
                link_text: parent.link_text.clone(),
            };
            commands.extend(walk(root, page, html, &forwarded)?);
        } else {
            for link in &links {
                let Some(url_match) = child.match_url(&link.url) else {
                    continue;
                };

                let mut file_path = parent.file_path.clone();
                if let Some(component) = child.file_path_component(Some(&url_match)) {
                    file_path = path::join(&file_path, &component)?;
                }
                let converted = child.convert_url(&link.url, Some(&url_match));

                if child.is_leaf() && child.file_content().is_none() {
                    commands.push(UrlCommand::Download {
                        url: converted,
                        file_path,
                    });
                } else {
                    let mut structure_path = parent.structure_path.clone();
                    structure_path.push(index);
                    commands.push(UrlCommand::Request(PageUrlInfo {
                        url: converted,
                        file_path,
                        structure_path,
                        url_match: Some(url_match),
                        link_text: link.text.clone(),
                    }));
                }
            }
        }
    }

    if node.is_root() && !forwardable_found {
        let matchers = node
            .children()
            .iter()
            .enumerate()
            .map(|(index, child)| format!("{index}: {}", child.matcher_source()))
            .collect::<Vec<_>>()
            .join("\n");
        return Err(SiteError::StartUrlNotMatched {
            url: page.url().to_string(),
            matchers,
        }
        .into());
    }

    Ok(commands)
}

/// Evaluate a node's assertions against the page's content scope
fn assert_content(node: &StructureNode, html: &Html, page: &Page) -> Result<(), Error> {
    for assertion in node.assertions() {
        if !selector_matches(html, node.content_selector(), assertion) {
            return Err(SiteError::AssertionFailed {
                url: page.url().to_string(),
                selector: assertion.source().to_string(),
            }
            .into());
        }
    }
    Ok(())
}

fn selector_matches(html: &Html, content: Option<&CssSelector>, selector: &CssSelector) -> bool {
    match content {
        Some(content) => html
            .select(content.selector())
            .any(|root| root.select(selector.selector()).next().is_some()),
        None => html.select(selector.selector()).next().is_some(),
    }
}

/// Extract `file_content` matches as a JSON array of element texts
fn extract_content(
    html: &Html,
    content: Option<&CssSelector>,
    selector: &CssSelector,
) -> Result<Vec<u8>, Error> {
    let mut texts = Vec::new();
    match content {
        Some(content) => {
            for root in html.select(content.selector()) {
                collect_texts(root, selector, &mut texts);
            }
        }
        None => collect_texts(html.root_element(), selector, &mut texts),
    }
    Ok(serde_json::to_vec(&texts)?)
}

fn collect_texts(root: ElementRef<'_>, selector: &CssSelector, texts: &mut Vec<String>) {
    for element in root.select(selector.selector()) {
        texts.push(element.text().collect::<String>());
    }
}
