pub mod wporg;

pub use wporg::DirectoryRepository;
