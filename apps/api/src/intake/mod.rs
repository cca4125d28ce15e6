pub mod assembler;
pub mod handlers;
