pub mod base;
pub mod extract;
pub mod westmetall;
