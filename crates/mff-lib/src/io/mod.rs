pub mod mat;
pub mod report;
pub mod text;
