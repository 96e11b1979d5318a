mod file_record;
mod local_file;

pub use file_record::FileRecord;
pub use local_file::LocalFile;
