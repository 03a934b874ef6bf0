mod core;
mod group;
mod parameter;

pub use self::core::*;
pub use group::*;
pub use parameter::*;
