//! Structure list parsing
//!
//! A flat structure list is a chain: each entry becomes the single child of
//! the previous one. A branch entry (array of arrays) fans the chain out
//! into alternative subtrees and must be the last entry of its list.

use crate::definition::{NodeDef, StructureDef};
use crate::node::StructureNode;
use mscrape_errors::SiteError;

/// Build the structure tree from a definition list
pub(crate) fn parse_structure_list(defs: &[StructureDef]) -> Result<StructureNode, SiteError> {
    let mut root = parse_list_under_root(defs)?;
    debug_assert!(root.is_root());
    root.check()?;
    Ok(root)
}

fn parse_list_under_root(defs: &[StructureDef]) -> Result<StructureNode, SiteError> {
    let mut root = StructureNode::root();
    let mut chain: Vec<StructureNode> = Vec::new();
    let mut branched = false;

    for def in defs {
        if branched {
            return Err(SiteError::MergeAfterBranch);
        }

        match def {
            StructureDef::Matcher(pattern) => {
                let def = NodeDef {
                    url: Some(pattern.clone()),
                    ..NodeDef::default()
                };
                chain.push(StructureNode::from_def(&def)?);
            }
            StructureDef::Node(node_def) => {
                chain.push(StructureNode::from_def(node_def)?);
            }
            StructureDef::Branch(alternatives) => {
                if alternatives.is_empty() {
                    return Err(SiteError::InvalidStructure {
                        message: "branch entry has no alternatives".to_string(),
                    });
                }
                let mut tails = Vec::new();
                for alternative in alternatives {
                    if alternative.is_empty() {
                        return Err(SiteError::InvalidStructure {
                            message: "branch alternative is empty".to_string(),
                        });
                    }
                    let sub_root = parse_list_under_root(alternative)?;
                    tails.extend(sub_root.into_children());
                }
                attach_chain(&mut root, chain, tails);
                chain = Vec::new();
                branched = true;
            }
        }
    }

    if !branched {
        attach_chain(&mut root, chain, Vec::new());
    }
    Ok(root)
}

/// Nest `chain` under `root`, hanging `tails` off the deepest node
fn attach_chain(root: &mut StructureNode, chain: Vec<StructureNode>, tails: Vec<StructureNode>) {
    let mut current = tails;
    for mut node in chain.into_iter().rev() {
        for tail in current {
            node.add(tail);
        }
        current = vec![node];
    }
    for node in current {
        root.add(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs(toml_list: &str) -> Vec<StructureDef> {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            structure: Vec<StructureDef>,
        }
        let wrapper: Wrapper = toml::from_str(toml_list).unwrap();
        wrapper.structure
    }

    #[test]
    fn flat_list_becomes_chain() {
        let tree = parse_structure_list(&defs(
            r#"structure = ['http://e\.com/', 'http://e\.com/(\w+)', 'http://e\.com/f/(\w+)']"#,
        ))
        .unwrap();

        assert_eq!(tree.children().len(), 1);
        let first = &tree.children()[0];
        assert_eq!(first.children().len(), 1);
        let second = &first.children()[0];
        assert_eq!(second.children().len(), 1);
        assert!(second.children()[0].is_leaf());
    }

    #[test]
    fn branch_fans_out() {
        let tree = parse_structure_list(&defs(
            r#"structure = [
                'http://e\.com/',
                [
                    [{ url = 'http://e\.com/a' }, { url = 'http://e\.com/a/(\w+)' }],
                    [{ url = 'http://e\.com/b' }],
                ],
            ]"#,
        ))
        .unwrap();

        let first = &tree.children()[0];
        assert_eq!(first.children().len(), 2);
        assert_eq!(first.children()[0].children().len(), 1);
        assert!(first.children()[1].is_leaf());
    }

    #[test]
    fn node_after_branch_rejected() {
        let err = parse_structure_list(&defs(
            r#"structure = [
                'http://e\.com/',
                [
                    [{ url = 'http://e\.com/a' }],
                    [{ url = 'http://e\.com/b' }],
                ],
                'http://e\.com/c',
            ]"#,
        ))
        .unwrap_err();
        assert!(matches!(err, SiteError::MergeAfterBranch));
    }

    #[test]
    fn invalid_regex_in_list_rejected() {
        let err = parse_structure_list(&defs(r#"structure = ['http://e\.com/foo(']"#)).unwrap_err();
        assert!(matches!(err, SiteError::InvalidRegex { .. }));
    }

    #[test]
    fn empty_branch_alternative_rejected() {
        let err = parse_structure_list(&defs(
            r#"structure = [
                'http://e\.com/',
                [[{ url = 'http://e\.com/a' }], []],
            ]"#,
        ))
        .unwrap_err();
        assert!(matches!(err, SiteError::InvalidStructure { .. }));
    }

    #[test]
    fn empty_list_is_bare_root() {
        let tree = parse_structure_list(&[]).unwrap();
        assert!(tree.is_root());
        assert!(tree.is_leaf());
    }
}
