/// Convenience result type used across pngstack.
pub type StackResult<T> = Result<T, StackError>;

/// Error taxonomy shared by canvases, the compositor and encoders.
#[derive(thiserror::Error, Debug)]
pub enum StackError {
    /// A pixel buffer could not be obtained.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// Negative coordinate or dimension, unknown format, or a malformed buffer.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A push onto a fixed canvas exceeds its declared dimensions.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    /// A dynamic canvas has no sub-images, so it has no bounding box.
    #[error("empty canvas: {0}")]
    EmptyCanvas(String),

    /// The encoder failed; the reason is passed through verbatim.
    #[error("encode error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StackError {
    /// Build a [`StackError::Allocation`] value.
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    /// Build a [`StackError::InvalidArgument`] value.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build a [`StackError::OutOfBounds`] value.
    pub fn out_of_bounds(msg: impl Into<String>) -> Self {
        Self::OutOfBounds(msg.into())
    }

    /// Build a [`StackError::EmptyCanvas`] value.
    pub fn empty_canvas(msg: impl Into<String>) -> Self {
        Self::EmptyCanvas(msg.into())
    }

    /// Build a [`StackError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
