use oci_distribution::Reference;
use thiserror::Error;

/// Errors raised while merging manifests.
///
/// Every variant is fatal: the run unwinds immediately and no output document
/// is printed or published.
#[derive(Debug, Error)]
pub enum MergeError {
    /// A reference string the registry cannot parse.
    #[error("invalid image reference {name:?}")]
    Reference {
        name: String,
        #[source]
        source: oci_distribution::ParseError,
    },

    /// A failed registry round trip: network, auth, or a missing object.
    #[error("registry request for {reference} failed: {message}")]
    Transport { reference: String, message: String },

    /// A manifest or config media type outside the recognized kinds.
    #[error("unsupported media type {media_type:?} for {reference}")]
    UnsupportedFormat {
        reference: String,
        media_type: String,
    },

    /// A body that does not decode as the expected JSON document.
    #[error("malformed {what} for {reference}")]
    Decode {
        reference: String,
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The merged index does not serialize.
    #[error("failed to encode merged manifest list")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

impl MergeError {
    /// Wrap a transport failure, keeping the reference that was being served.
    ///
    /// The transport's own error type stays behind the registry seam; only its
    /// rendered message crosses it.
    pub fn transport(reference: &Reference, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            reference: reference.to_string(),
            message: err.to_string(),
        }
    }
}
