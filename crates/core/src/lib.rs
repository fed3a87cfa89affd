//! RateStore Core - Shared types library.
//!
//! This crate provides common types used across all RateStore components:
//! - `api` - REST API server for customers, store owners and administrators
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure validation - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles and star ratings
//! - [`paging`] - Page requests, pagination metadata and sort direction
//! - [`validation`] - Field rules shared by registration, user creation and store creation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod paging;
pub mod types;
pub mod validation;

pub use paging::{PageRequest, Pagination, SortOrder};
pub use types::*;
pub use validation::{FieldError, ValidationErrors};
