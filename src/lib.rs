pub mod error;
pub mod math;
pub mod simplify;
pub mod topology;

pub use error::{Result, SimplifyError};
pub use simplify::{Simplifier, SimplifyConfig};
pub use topology::Polygon;
