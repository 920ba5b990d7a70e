pub mod dynamics;
pub mod error;
pub mod export;
pub mod import;
pub mod project;
pub mod report;
pub mod status;
pub mod timeline;

pub use error::OsadkaError;
