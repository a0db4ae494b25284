pub mod accumulator;
pub mod fade;
pub mod segment;
pub mod splitter;
pub mod stream;
