pub mod hash;
pub mod serve;

pub use hash::HashCommand;
pub use serve::ServeCommand;
