/// Convenience result type used across imprint.
pub type ImprintResult<T> = Result<T, ImprintError>;

/// Top-level error taxonomy used by template loading and rendering.
#[derive(thiserror::Error, Debug)]
pub enum ImprintError {
    /// Invalid template data detected while loading or initializing components.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure while rendering with a concrete parameter map.
    #[error("render error: {0}")]
    Render(String),

    /// Remote image could not be fetched, decoded or persisted.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// A component failed; `index` is its position in declaration order.
    #[error("component {index}: {source}")]
    Component {
        /// Declaration index of the failing component.
        index: usize,
        /// Underlying failure.
        #[source]
        source: Box<ImprintError>,
    },

    /// Errors when deserializing template JSON.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImprintError {
    /// Build an [`ImprintError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`ImprintError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build an [`ImprintError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Annotate this error with the declaration index of the component that raised it.
    pub fn in_component(self, index: usize) -> Self {
        Self::Component {
            index,
            source: Box::new(self),
        }
    }
}

/// Failures of the remote image cache.
///
/// Cloneable so a single in-flight fetch can hand the same outcome to every waiter.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, TLS or body read failure.
    #[error("request to '{url}' failed: {reason}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Transport error text.
        reason: String,
    },

    /// Non-2xx HTTP status.
    #[error("unexpected HTTP status {status} for '{url}'")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// Payload is not a decodable image.
    #[error("cannot decode image from '{url}': {reason}")]
    Decode {
        /// Requested URL.
        url: String,
        /// Decoder error text.
        reason: String,
    },

    /// Writing the local copy failed.
    #[error("cannot persist '{url}' locally: {reason}")]
    Persist {
        /// Requested URL.
        url: String,
        /// IO error text.
        reason: String,
    },

    /// The fetch leader went away without publishing a result.
    #[error("in-flight fetch for '{url}' was abandoned")]
    Abandoned {
        /// Requested URL.
        url: String,
    },
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
