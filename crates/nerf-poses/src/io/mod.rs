/// COLMAP sparse model reader module.
pub mod colmap;
