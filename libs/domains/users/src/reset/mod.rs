//! Password reset by emailed six digit code

pub mod service;
pub mod store;

pub use service::{ResetService, generate_code};
pub use store::{
    CODE_TTL_MINUTES, InMemoryResetCodeStore, ResetCodeStore, ResetEntry, spawn_purge_task,
};
