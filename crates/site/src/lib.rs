#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Site configuration and structure tree for mscrape
//!
//! A site config describes the link structure of a target website as a tree
//! of structure nodes. Each node declares how URLs at that level are matched
//! (regex full-match), optionally rewritten (capture-group template), which
//! part of the page links are extracted from (CSS selector), the file-system
//! path component the node contributes (template), assertions the fetched
//! page must satisfy, and whether the node pages through listing pages.
//!
//! The walk in [`SiteConfig::url_commands`] turns a fetched page plus the
//! structure tree into commands: follow a link, download a URL to a file,
//! or save extracted page content.

mod css;
mod definition;
mod links;
mod matcher;
mod node;
mod parse;
mod path;
mod simulate;
mod template;
mod walk;

pub use css::CssSelector;
pub use definition::{AssertDef, LoginDefinition, NodeDef, SiteDefinition, StructureDef};
pub use links::{extract_links, Link};
pub use matcher::{UrlMatch, UrlMatcher};
pub use node::StructureNode;
pub use simulate::SimulatedUrlInfo;
pub use template::Template;
pub use walk::{Page, PageUrlInfo, UrlCommand};

use mscrape_errors::{ConfigError, Error};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Login step configuration
#[derive(Debug, Clone)]
pub enum LoginConfig {
    /// GET the login url (session-cookie style logins)
    Url(String),
    /// POST a form to the login url
    Form {
        url: String,
        formdata: BTreeMap<String, String>,
    },
}

/// A validated site configuration
#[derive(Debug)]
pub struct SiteConfig {
    pub start_url: String,
    pub save_dir: PathBuf,
    pub login: Option<LoginConfig>,
    root: StructureNode,
}

impl SiteConfig {
    /// Build a site configuration from a parsed definition
    ///
    /// # Errors
    ///
    /// Returns an error if any regex, selector, or template fails to
    /// compile, or if the structure tree violates a shape rule.
    pub fn from_definition(def: SiteDefinition) -> Result<Self, Error> {
        let root = parse::parse_structure_list(&def.structure)?;

        let login = def.login.map(|login| match login {
            LoginDefinition::Url(url) => LoginConfig::Url(url),
            LoginDefinition::Form { url, formdata } => LoginConfig::Form { url, formdata },
        });

        Ok(Self {
            start_url: def.start_url,
            save_dir: def.save_dir,
            login,
            root,
        })
    }

    /// Load a site configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, is not valid TOML for the
    /// site schema, or fails structure validation.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;

        let def: SiteDefinition =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })?;

        Self::from_definition(def)
    }

    /// The root of the structure tree
    #[must_use]
    pub fn root(&self) -> &StructureNode {
        &self.root
    }

    /// Evaluate the structure tree against a fetched page
    ///
    /// `parent` is the url info that produced the request for this page;
    /// `None` means the page is the crawl's first response and is matched
    /// against the root nodes directly.
    ///
    /// # Errors
    ///
    /// Returns an error if the start url matches no root node, a page
    /// assertion fails, or a file path component is unsafe.
    pub fn url_commands(
        &self,
        page: &Page,
        parent: Option<&PageUrlInfo>,
    ) -> Result<Vec<UrlCommand>, Error> {
        walk::url_commands(&self.root, page, parent)
    }

    /// Dry-run a URL against the structure tree without fetching anything
    ///
    /// Returns every structure chain whose matcher accepts the URL, with
    /// the file path each chain would assign.
    ///
    /// # Errors
    ///
    /// Returns [`mscrape_errors::SiteError::UrlNotMatched`] when no node
    /// accepts the URL.
    pub fn simulate(&self, url: &str) -> Result<Vec<SimulatedUrlInfo>, Error> {
        simulate::simulate(&self.root, url)
    }
}
