pub mod blog;
pub mod key;
pub mod resume;
pub mod social;
pub mod user;

pub use key::{parse_id, RecordKey};
