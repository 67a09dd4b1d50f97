//! Element trait for numeric grid cells

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for numeric types that can be stored in a grid cell.
///
/// Responses and intensities are `f64`; label and seed maps are `u32`.
/// Binary masks use `Grid<bool>`, which only needs the untyped
/// constructors and accessors of [`Grid`](super::Grid).
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Whether this value should be skipped by statistics (NaN for floats)
    fn is_missing(&self) -> bool;

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

macro_rules! impl_raster_element_int {
    ($t:ty) => {
        impl RasterElement for $t {
            fn is_missing(&self) -> bool {
                false
            }
        }
    };
}

macro_rules! impl_raster_element_float {
    ($t:ty) => {
        impl RasterElement for $t {
            fn is_missing(&self) -> bool {
                self.is_nan()
            }
        }
    };
}

impl_raster_element_int!(u8);
impl_raster_element_int!(u16);
impl_raster_element_int!(u32);
impl_raster_element_int!(i32);
impl_raster_element_float!(f32);
impl_raster_element_float!(f64);
