use thiserror::Error;

/// Error that might occur while configuring or driving the engine.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error<T> {
    /// `epsilon` must be strictly positive.
    #[error("epsilon must be greater than zero, but got {0:?}")]
    InvalidEpsilon(T),

    /// `min_points` must be at least 1; with `min_points == 1` every point
    /// is its own core, which is a degenerate but legal configuration.
    #[error("min_points must be greater than zero, but got {0}")]
    InvalidMinPoints(usize),

    /// The `Minkowski` metric requires `p >= 1`.
    #[error("minkowski p must be greater than or equal to 1, but got {0:?}")]
    InvalidMinkowskiP(T),

    /// A coordinate was NaN or infinite.
    #[error("coordinate must be finite, but got {0:?}")]
    NonFiniteCoordinate(T),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::InvalidEpsilon(0.0_f64), "epsilon must be greater than zero, but got 0.0")]
    #[case(Error::InvalidMinPoints(0), "min_points must be greater than zero, but got 0")]
    #[case(
        Error::InvalidMinkowskiP(0.5_f64),
        "minkowski p must be greater than or equal to 1, but got 0.5"
    )]
    #[case(
        Error::NonFiniteCoordinate(f64::NAN),
        "coordinate must be finite, but got NaN"
    )]
    fn displays_expected_message(#[case] error: Error<f64>, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }
}
