pub mod int;
pub mod string;
pub mod varint;
