use std::fmt;

pub type Result<T> = std::result::Result<T, ToggleError>;

/// A single failed attempt against one horizon URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointFailure {
    pub url: String,
    pub message: String,
}

impl fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ToggleError {
    /// A public API key was assigned without the `public_` prefix.
    #[error("Public API key must start with 'public_'")]
    InvalidKeyFormat,

    #[error("No horizon URLs configured. Set horizonUrls or provide a valid publicApiKey.")]
    NoEndpointsConfigured,

    /// Every horizon URL was tried once and none answered successfully.
    #[error("All horizon URLs failed. Last errors: {}", join_failures(.0))]
    AllEndpointsFailed(Vec<EndpointFailure>),

    #[error("public API key is required")]
    MissingCredential,

    /// The configured public API key cannot be sent as an HTTP header value.
    #[error("public API key is not a valid header value")]
    InvalidCredential,

    #[error("application ID is required")]
    MissingApplication,

    #[error("toggle {0} not found in evaluation response")]
    ToggleNotFound(String),

    #[error("failed to serialize request payload")]
    InvalidPayload(#[source] serde_json::Error),

    /// A horizon URL answered with JSON that does not have the expected shape.
    #[error("unexpected response shape: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    /// The server returned a value that does not fit the requested type.
    #[error("toggle {key} has a value of an unexpected type")]
    InvalidValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

fn join_failures(failures: &[EndpointFailure]) -> String {
    failures
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_all_endpoints_failed_keeps_attempt_order() {
        let err = ToggleError::AllEndpointsFailed(vec![
            EndpointFailure {
                url: "https://a.example".to_string(),
                message: "HTTP 500: Internal Server Error".to_string(),
            },
            EndpointFailure {
                url: "https://b.example".to_string(),
                message: "HTTP 404: Not Found".to_string(),
            },
        ]);

        assert_eq!(
            err.to_string(),
            "All horizon URLs failed. Last errors: HTTP 500: Internal Server Error, HTTP 404: Not Found"
        );
    }
}
