pub mod config;
pub mod event;
pub mod handler;
pub mod host;
pub mod store;

pub use config::*;
pub use event::*;
pub use handler::*;
pub use host::*;
pub use store::*;
