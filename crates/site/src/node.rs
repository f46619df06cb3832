//! Structure tree nodes

use crate::css::CssSelector;
use crate::definition::NodeDef;
use crate::matcher::{UrlMatch, UrlMatcher};
use crate::template::Template;
use mscrape_errors::SiteError;

/// One node of the structure tree
///
/// Nodes describe a family of URLs (matcher), how matched URLs are
/// rewritten and where their files land, and how links are extracted from
/// their pages. Leaf nodes denote files; inner nodes denote pages whose
/// links are followed.
#[derive(Debug)]
pub struct StructureNode {
    children: Vec<StructureNode>,
    url_matcher: Option<UrlMatcher>,
    url_converter: Option<Template>,
    content_selector: Option<CssSelector>,
    file_path: Option<Template>,
    file_content: Option<CssSelector>,
    assertions: Vec<CssSelector>,
    paging: bool,
    is_root: bool,
}

impl StructureNode {
    /// Create the root node
    #[must_use]
    pub(crate) fn root() -> Self {
        Self {
            children: Vec::new(),
            url_matcher: None,
            url_converter: None,
            content_selector: None,
            file_path: None,
            file_content: None,
            assertions: Vec::new(),
            paging: false,
            is_root: true,
        }
    }

    /// Compile a node from its definition table
    pub(crate) fn from_def(def: &NodeDef) -> Result<Self, SiteError> {
        let url_matcher = def.url.as_deref().map(UrlMatcher::compile).transpose()?;
        let url_converter = def.as_url.as_deref().map(Template::compile).transpose()?;
        let content_selector = def
            .content
            .as_deref()
            .map(CssSelector::compile)
            .transpose()?;
        let file_path = def
            .file_path
            .as_deref()
            .map(Template::compile)
            .transpose()?;
        let file_content = def
            .file_content
            .as_deref()
            .map(CssSelector::compile)
            .transpose()?;
        let assertions = match &def.assertions {
            Some(assert_def) => assert_def
                .selectors()
                .into_iter()
                .map(CssSelector::compile)
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            children: Vec::new(),
            url_matcher,
            url_converter,
            content_selector,
            file_path,
            file_content,
            assertions,
            paging: def.paging,
            is_root: false,
        })
    }

    pub(crate) fn add(&mut self, node: StructureNode) {
        debug_assert!(!node.is_root);
        self.children.push(node);
    }

    /// Detach the children, consuming an intermediate root
    pub(crate) fn into_children(self) -> Vec<StructureNode> {
        debug_assert!(self.is_root);
        self.children
    }

    /// Validate shape rules over the whole subtree
    pub(crate) fn check(&self) -> Result<(), SiteError> {
        if !self.is_leaf() && self.file_content.is_some() {
            return Err(SiteError::FileContentOnInnerNode);
        }
        for child in &self.children {
            child.check()?;
        }
        Ok(())
    }

    /// Whether the node is forwarded without its own request
    #[must_use]
    pub fn needs_no_request(&self) -> bool {
        self.url_matcher.is_none()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    #[must_use]
    pub fn children(&self) -> &[StructureNode] {
        &self.children
    }

    #[must_use]
    pub fn paging(&self) -> bool {
        self.paging
    }

    #[must_use]
    pub fn content_selector(&self) -> Option<&CssSelector> {
        self.content_selector.as_ref()
    }

    #[must_use]
    pub fn file_content(&self) -> Option<&CssSelector> {
        self.file_content.as_ref()
    }

    #[must_use]
    pub fn assertions(&self) -> &[CssSelector] {
        &self.assertions
    }

    #[must_use]
    pub fn file_path_template(&self) -> Option<&Template> {
        self.file_path.as_ref()
    }

    /// Match a URL against this node's matcher
    #[must_use]
    pub fn match_url(&self, url: &str) -> Option<UrlMatch> {
        self.url_matcher.as_ref()?.match_url(url)
    }

    /// Rewrite a matched URL through `as_url`, if configured
    #[must_use]
    pub fn convert_url(&self, url: &str, url_match: Option<&UrlMatch>) -> String {
        match &self.url_converter {
            Some(template) => template.expand(url_match),
            None => url.to_string(),
        }
    }

    /// The file path component this node contributes, if any
    #[must_use]
    pub fn file_path_component(&self, url_match: Option<&UrlMatch>) -> Option<String> {
        self.file_path
            .as_ref()
            .map(|template| template.expand(url_match))
    }

    /// Walk to a node by child indexes
    ///
    /// Structure paths recorded in queued requests address nodes this way.
    #[must_use]
    pub fn node_by_path(&self, path: &[usize]) -> Option<&StructureNode> {
        match path.split_first() {
            None => Some(self),
            Some((&index, rest)) => self.children.get(index)?.node_by_path(rest),
        }
    }

    /// Human-readable matcher source for error listings
    #[must_use]
    pub fn matcher_source(&self) -> &str {
        self.url_matcher
            .as_ref()
            .map_or("<no url matcher in definition>", UrlMatcher::source)
    }
}
