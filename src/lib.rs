#![doc = include_str!("../README.md")]

mod bbox;
mod error;
pub mod kdtree;
pub mod quadtree;
mod r#type;

pub use bbox::{BoundingBox, SINGLE_POINT_BUFFER};
pub use error::{KdQuadError, Result};
#[cfg(feature = "use-geo_0_31")]
pub use r#type::HaversineMath;
pub use r#type::{Coord, DoubleMath, FloatMath, GeographicMath, KeyNum, TypeMath};
