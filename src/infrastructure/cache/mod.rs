mod disk_tier;
mod memory_tier;

pub use disk_tier::DiskTier;
pub use memory_tier::MemoryTier;
