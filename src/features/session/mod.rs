pub mod models;
pub mod services;

pub use models::{Identity, Session};
pub use services::SessionStore;
