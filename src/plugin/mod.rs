pub mod error;
pub mod extension;
pub mod installer;
pub mod manager;
pub mod manifest;
pub mod record;
pub mod runtime;
pub mod sticky_notes;

pub use manager::AddonManager;
