/// Seconds between two sync cycles of a mounted feed view
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// Default location of the persisted session file
pub const DEFAULT_SESSION_FILE: &str = ".filedrop-session.json";

/// Key under which the identity is persisted
pub const IDENTITY_KEY: &str = "username";

// =============================================================================
// PLACEHOLDER DOWNLOAD
// =============================================================================

/// File name used when nothing was picked for download
pub const PLACEHOLDER_FILENAME: &str = "filedrop-welcome.txt";

/// Content generated locally for the placeholder download
pub const PLACEHOLDER_CONTENT: &str = "Welcome to filedrop!\n\n\
This is a sample file that demonstrates the download feature.\n\n\
Thanks for using it!\n";
