pub mod csv;
pub mod json;
pub mod silent;
pub mod table;
pub mod text;
mod types;
