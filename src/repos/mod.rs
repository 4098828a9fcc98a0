pub mod error;
#[cfg(test)]
pub(crate) mod memory;
pub mod user_repo;

pub use user_repo::{PgUserStore, UserRecord, UserStore};
