use crate::error::{Error, Result};

/// Reject blank namespace names
pub fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.trim().is_empty() {
        return Err(Error::invalid_argument("Cache name can not be empty"));
    }
    Ok(())
}

/// Reject an empty namespace list or any blank entry in it
pub fn validate_namespaces<S: AsRef<str>>(namespaces: &[S]) -> Result<()> {
    if namespaces.is_empty() {
        return Err(Error::invalid_argument(
            "Cache names list can not be empty",
        ));
    }
    namespaces
        .iter()
        .try_for_each(|ns| validate_namespace(ns.as_ref()))
}
