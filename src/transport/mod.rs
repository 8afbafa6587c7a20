/// CSV readers and writers for raw logs and persisted artifacts.
pub mod fs;
