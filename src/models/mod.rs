pub mod file_entry;
pub mod operation;
pub mod upload;
pub mod wire;
