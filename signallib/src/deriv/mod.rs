pub mod objects;
pub use objects::*;

pub mod helpers;

pub mod tick_source;
pub use tick_source::*;

pub mod errors;
pub use errors::CollectError;
