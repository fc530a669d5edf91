pub mod models;
pub mod shape;
pub mod special;
pub mod table;

pub use shape::Shape;
pub use table::{ParameterInfo, ParameterKind};
