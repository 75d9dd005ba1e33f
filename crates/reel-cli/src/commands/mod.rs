pub mod cancel;
pub mod dispatch;
pub mod history;
pub mod open;
pub mod render;
pub mod shared;
pub mod watch;
