pub mod errors;
pub mod file;
pub mod runtime;
pub mod storage;
