pub mod mesh;
pub mod shadow;
