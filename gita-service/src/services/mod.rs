pub mod fallback;
pub mod metrics;
pub mod persona;
pub mod providers;

pub use fallback::FallbackPool;
