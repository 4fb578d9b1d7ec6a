pub mod diagnostics;
pub mod memory;
pub mod storage;
pub mod undo;
