pub mod backend;
pub mod config;
pub mod contact;
pub mod core;
pub mod effects;
pub mod member;
pub mod password;
pub mod submission;
pub mod validation;

pub use crate::core::Portal;
