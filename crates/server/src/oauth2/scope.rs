//! Scope negotiation for the client-credentials grant.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("scope `{0}` was not granted to this client")]
    NotGranted(String),
}

/// Decide which scopes a token carries.
///
/// The client's granted set is authoritative. Without a request (or with an
/// empty one) the whole granted set is used. Otherwise the request is split on
/// single spaces and every entry must be granted; one stray scope fails the
/// whole request. The caller's order is preserved.
pub fn negotiate(granted: &[String], requested: Option<&str>) -> Result<Vec<String>, ScopeError> {
    let requested = match requested {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(granted.to_vec()),
    };

    requested
        .split(' ')
        .map(|scope| {
            if granted.iter().any(|g| g == scope) {
                Ok(scope.to_string())
            } else {
                Err(ScopeError::NotGranted(scope.to_string()))
            }
        })
        .collect()
}
