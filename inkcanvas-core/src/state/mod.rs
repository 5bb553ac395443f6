pub mod stroke_collection;
pub mod transform;
