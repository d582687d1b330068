pub mod announcer;
pub mod deriv;
pub mod logging;
pub mod models;
pub mod telegram;
pub mod util;
