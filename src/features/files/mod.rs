pub mod clients;
pub mod dtos;
pub mod models;
pub mod services;
pub mod workers;

pub use clients::HttpFileStore;
pub use services::{FeedScreen, FeedTab, FeedView, FileFeedClient};
pub use workers::FeedPoller;
