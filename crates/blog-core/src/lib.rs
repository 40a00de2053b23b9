//! # Blog Core
//!
//! The domain layer of the blog.
//! This crate holds the post schema, the admin registration and the
//! repository ports, with zero infrastructure dependencies.

pub mod admin;
pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, RepoError};
