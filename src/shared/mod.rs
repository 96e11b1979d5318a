pub mod constants;
pub mod format;
pub mod notifications;

#[cfg(test)]
pub mod test_helpers;
