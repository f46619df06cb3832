//! Relative save-path assembly
//!
//! File paths accumulated during the walk are `/`-separated strings
//! relative to `save_dir`. Components come from user templates, so they
//! are checked before being joined: absolute components and `..` segments
//! are rejected.

use mscrape_errors::SiteError;

/// Join a path component onto an accumulated relative path
///
/// # Errors
///
/// Returns [`SiteError::UnsafePathComponent`] for absolute components or
/// components containing a `..` segment.
pub fn join(parent: &str, component: &str) -> Result<String, SiteError> {
    check_component(component)?;
    if parent.is_empty() {
        Ok(component.to_string())
    } else {
        Ok(format!("{parent}/{component}"))
    }
}

/// The parent of a relative path (`""` when there is none)
#[must_use]
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[..index],
        None => "",
    }
}

fn check_component(component: &str) -> Result<(), SiteError> {
    let unsafe_component = component.starts_with('/')
        || component.split('/').any(|segment| segment == "..");
    if unsafe_component {
        return Err(SiteError::UnsafePathComponent {
            component: component.to_string(),
        });
    }
    Ok(())
}
