mod identity;
mod session;

pub use identity::Identity;
pub use session::Session;
