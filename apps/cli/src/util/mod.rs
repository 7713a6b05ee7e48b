pub mod macros;
pub mod output;
