mod feed_view;
mod file_feed_service;
pub mod transfer_codec;

pub use feed_view::{FeedScreen, FeedTab, FeedView};
pub use file_feed_service::FileFeedClient;
