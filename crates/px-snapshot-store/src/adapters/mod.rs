//! Backend adapters.

mod memory;

pub use memory::MemStore;
