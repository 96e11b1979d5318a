mod feed_poller;

pub use feed_poller::{FeedPoller, PollerHandle};
