//! # Asset Key Naming

mod allocator;
mod name;

pub use allocator::{AllocationError, AllocationResult, NameAllocator};
pub use name::{split_file_name, KeyTemplate};
