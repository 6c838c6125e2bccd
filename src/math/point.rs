/// Point in an N-dimensional space.
///
/// This type alias represents a point as a fixed-size array of floating-point values.
///
/// # Type Parameters
/// * `T` - The floating point type (typically `f32` or `f64`).
/// * `N` - The number of dimensions.
pub type Point<T, const N: usize> = [T; N];
