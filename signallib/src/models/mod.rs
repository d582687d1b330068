pub mod cache;
pub mod digits;
pub mod pattern;
pub mod selector;
pub mod trading_signal;

pub use cache::*;
pub use digits::*;
pub use pattern::*;
pub use selector::*;
pub use trading_signal::*;
