use num_traits::Float;

/// Coordinate scalar used throughout the engine.
///
/// Built on top of [`num_traits::Float`] rather than reinventing zero/one/sqrt/abs,
/// with the few extras the engine needs: conversion from `usize` (cluster-size
/// bookkeeping) and a lossless-enough view as `f64` for content-addressing points.
pub trait FloatNumber: Float + std::fmt::Debug + Send + Sync + 'static {
    fn from_usize(n: usize) -> Self;

    /// Canonical `f64` bit pattern used to content-address a point's coordinates.
    fn to_bits_f64(self) -> u64;
}

macro_rules! impl_float_number {
    ($ty:ty) => {
        impl FloatNumber for $ty {
            fn from_usize(n: usize) -> Self {
                n as $ty
            }

            fn to_bits_f64(self) -> u64 {
                (self as f64).to_bits()
            }
        }
    };
}

impl_float_number!(f32);
impl_float_number!(f64);
