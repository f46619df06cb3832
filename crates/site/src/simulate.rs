//! Dry-run URL matching against the structure tree
//!
//! Used by the `check-url` command: given a URL, find every structure
//! chain whose matcher accepts it and the save path each chain would
//! assign. Ancestor path components cannot be expanded for real (their
//! own pages were never fetched), so they contribute their literal
//! template text.

use crate::matcher::UrlMatch;
use crate::node::StructureNode;
use crate::path;
use mscrape_errors::{Error, SiteError};

/// A candidate placement of a URL in the structure tree
#[derive(Debug, Clone)]
pub struct SimulatedUrlInfo {
    pub url: String,
    pub file_path: String,
    pub structure_path: Vec<usize>,
    pub url_match: UrlMatch,
}

pub(crate) fn simulate(root: &StructureNode, url: &str) -> Result<Vec<SimulatedUrlInfo>, Error> {
    let mut results = Vec::new();
    visit(root, url, &[], "", &mut results)?;
    if results.is_empty() {
        return Err(SiteError::UrlNotMatched {
            url: url.to_string(),
        }
        .into());
    }
    Ok(results)
}

fn visit(
    node: &StructureNode,
    url: &str,
    structure_path: &[usize],
    ancestor_path: &str,
    results: &mut Vec<SimulatedUrlInfo>,
) -> Result<(), Error> {
    for (index, child) in node.children().iter().enumerate() {
        let mut child_path = structure_path.to_vec();
        child_path.push(index);

        if let Some(url_match) = child.match_url(url) {
            let mut file_path = ancestor_path.to_string();
            if let Some(component) = child.file_path_component(Some(&url_match)) {
                file_path = path::join(&file_path, &component)?;
            }
            results.push(SimulatedUrlInfo {
                url: url.to_string(),
                file_path,
                structure_path: child_path.clone(),
                url_match,
            });
        }

        // Descend with the literal component; the ancestor's own page was
        // never fetched, so its captures are unknown.
        let mut deeper_ancestor = ancestor_path.to_string();
        if let Some(component) = child.file_path_component(None) {
            deeper_ancestor = path::join(&deeper_ancestor, &component)?;
        }
        visit(child, url, &child_path, &deeper_ancestor, results)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::SiteDefinition;
    use crate::SiteConfig;

    fn site(toml: &str) -> SiteConfig {
        let def: SiteDefinition = toml::from_str(toml).unwrap();
        SiteConfig::from_definition(def).unwrap()
    }

    fn chained_site() -> SiteConfig {
        site(r#"
            start_url = "http://example.com/"
            save_dir = "/tmp/media"
            structure = [
                { url = 'http://example\.com/', file_path = "foo" },
                { url = 'http://example\.com/(\w+)', file_path = "$1" },
                { url = 'http://example\.com/aaa/(\w+)', file_path = "bar-$1" },
            ]
        "#)
    }

    #[test]
    fn matches_the_right_depth() {
        let config = chained_site();

        let infos = config.simulate("http://example.com/").unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].structure_path, [0]);
        assert_eq!(infos[0].file_path, "foo");
        assert_eq!(infos[0].url_match.full_match(), "http://example.com/");

        let infos = config.simulate("http://example.com/aaa").unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].structure_path, [0, 0]);
        assert_eq!(infos[0].file_path, "foo/aaa");
    }

    #[test]
    fn ancestor_components_stay_literal() {
        let config = chained_site();
        let infos = config.simulate("http://example.com/aaa/bbb").unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].structure_path, [0, 0, 0]);
        // The middle node's capture is unknown, so its template text stays
        assert_eq!(infos[0].file_path, "foo/$1/bar-bbb");
    }

    #[test]
    fn duplicated_matchers_yield_multiple_candidates() {
        let config = site(r#"
            start_url = "http://example.com/"
            save_dir = "/tmp/media"
            structure = [
                'http://example\.com/',
                'http://example\.com/aaa/(\w+)',
                'http://example\.com/aaa/(\w+)',
            ]
        "#);
        let infos = config.simulate("http://example.com/aaa/bbb").unwrap();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].structure_path, [0, 0]);
        assert_eq!(infos[1].structure_path, [0, 0, 0]);
    }

    #[test]
    fn unmatched_url_errors() {
        let config = chained_site();
        let err = config.simulate("http://other.example.com/").unwrap_err();
        assert!(matches!(
            err,
            Error::Site(SiteError::UrlNotMatched { .. })
        ));
    }
}
