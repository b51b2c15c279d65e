pub mod design_tree;
pub mod geometry;
pub mod ingest;
pub mod types;
