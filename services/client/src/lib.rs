//! services/client/src/lib.rs
//!
//! The storybook reader client: REST repositories, local adapters and the
//! per-screen view models that walk a reading session.

pub mod adapters;
pub mod config;
pub mod error;
pub mod repository;
pub mod viewmodel;
