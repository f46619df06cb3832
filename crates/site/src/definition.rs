//! Serde schema for site definition files

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Raw site definition as written in TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteDefinition {
    pub start_url: String,
    pub save_dir: PathBuf,
    #[serde(default)]
    pub login: Option<LoginDefinition>,
    #[serde(default)]
    pub structure: Vec<StructureDef>,
}

/// Login definition: a bare URL or a form post
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LoginDefinition {
    Url(String),
    Form {
        url: String,
        formdata: BTreeMap<String, String>,
    },
}

/// One entry of a structure list
///
/// A string is shorthand for `{ url = <regex> }`. An array of arrays is a
/// branch point; each inner array is an alternative child chain.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StructureDef {
    Matcher(String),
    Branch(Vec<Vec<StructureDef>>),
    Node(NodeDef),
}

/// A structure node definition table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDef {
    /// Regex the full URL must match
    #[serde(default)]
    pub url: Option<String>,

    /// Template rewriting the matched URL before it is requested
    #[serde(default)]
    pub as_url: Option<String>,

    /// CSS selector restricting link extraction to part of the page
    #[serde(default)]
    pub content: Option<String>,

    /// Template for the path component this node contributes
    #[serde(default)]
    pub file_path: Option<String>,

    /// CSS selector whose matched text is saved as a JSON array
    #[serde(default)]
    pub file_content: Option<String>,

    /// Selector(s) that must match on the fetched page
    #[serde(default, rename = "assert")]
    pub assertions: Option<AssertDef>,

    /// Whether links matching this same node continue the chain
    #[serde(default)]
    pub paging: bool,
}

/// One assertion selector or a list of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AssertDef {
    One(String),
    Many(Vec<String>),
}

impl AssertDef {
    /// Flatten into a list of selector strings
    #[must_use]
    pub fn selectors(&self) -> Vec<&str> {
        match self {
            Self::One(s) => vec![s.as_str()],
            Self::Many(list) => list.iter().map(String::as_str).collect(),
        }
    }
}
