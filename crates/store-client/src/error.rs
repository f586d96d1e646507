//! Object store client errors

use thiserror::Error;

/// Errors that can occur when talking to the object store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Object with the same identity already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Write was based on a stale resourceVersion
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store is temporarily unable to serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Store returned a different kind than was asked for
    #[error("Unexpected kind: expected {expected}, got {actual}")]
    UnexpectedKind {
        expected: &'static str,
        actual: &'static str,
    },

    /// Object is missing identity fields
    #[error("Invalid object: {0}")]
    InvalidObject(String),

    /// Any other Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),
}

impl StoreError {
    /// Whether this error means the object is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Folds an API server error into a store error for the given object.
    pub(crate) fn from_kube(err: kube::Error, what: &str) -> Self {
        match err {
            kube::Error::Api(ref ae) if ae.code == 404 => StoreError::NotFound(what.to_string()),
            kube::Error::Api(ref ae) if ae.code == 409 && ae.reason == "AlreadyExists" => {
                StoreError::AlreadyExists(what.to_string())
            }
            kube::Error::Api(ref ae) if ae.code == 409 => {
                StoreError::Conflict(format!("{}: {}", what, ae.message))
            }
            kube::Error::Api(ref ae) if ae.code >= 500 => {
                StoreError::Unavailable(format!("{}: {}", what, ae.message))
            }
            other => StoreError::Kube(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{} happened", reason),
            reason: reason.to_string(),
            code,
        })
    }

    #[test]
    fn test_status_codes_map_to_variants() {
        let err = StoreError::from_kube(api_error(404, "NotFound"), "Pod ns/foo-pod");
        assert!(err.is_not_found());

        let err = StoreError::from_kube(api_error(409, "AlreadyExists"), "Pod ns/foo-pod");
        assert!(matches!(err, StoreError::AlreadyExists(_)));

        let err = StoreError::from_kube(api_error(409, "Conflict"), "ConfigMap ns/foo-config");
        assert!(matches!(err, StoreError::Conflict(_)));

        let err = StoreError::from_kube(api_error(503, "ServiceUnavailable"), "Pod ns/foo-pod");
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = StoreError::from_kube(api_error(422, "Invalid"), "Pod ns/foo-pod");
        assert!(matches!(err, StoreError::Kube(_)));
        assert!(!err.is_not_found());
    }
}
