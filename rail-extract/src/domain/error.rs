//! Domain error types.
//!
//! These errors represent validation failures in the domain layer.
//! They are distinct from network and filesystem errors.

/// Domain-level errors for validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A bound is NaN or infinite
    #[error("bounding box has a non-finite bound")]
    NonFiniteBound,

    /// South edge is not strictly below the north edge
    #[error("invalid bounding box: south {south} must be below north {north}")]
    LatitudeOrder { south: f64, north: f64 },

    /// West edge is not strictly left of the east edge
    #[error("invalid bounding box: west {west} must be left of east {east}")]
    LongitudeOrder { west: f64, east: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::NonFiniteBound;
        assert_eq!(err.to_string(), "bounding box has a non-finite bound");

        let err = DomainError::LatitudeOrder {
            south: 10.0,
            north: 5.0,
        };
        assert_eq!(
            err.to_string(),
            "invalid bounding box: south 10 must be below north 5"
        );

        let err = DomainError::LongitudeOrder {
            west: 3.5,
            east: 3.5,
        };
        assert_eq!(
            err.to_string(),
            "invalid bounding box: west 3.5 must be left of east 3.5"
        );
    }
}
