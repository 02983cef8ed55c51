mod bounds;
mod geometry;
mod store;

pub use bounds::*;
pub use geometry::*;
pub use store::*;
