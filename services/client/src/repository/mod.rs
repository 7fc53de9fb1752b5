//! services/client/src/repository/mod.rs
//!
//! One repository per backend resource. All of them share a `RestClient` and go
//! through its single call-and-wrap helper.

pub mod pages;
pub mod process;
pub mod protocol;
pub mod rest;
pub mod sessions;
pub mod users;

pub use pages::HttpPageRepository;
pub use process::HttpProcessRepository;
pub use rest::RestClient;
pub use sessions::HttpSessionRepository;
pub use users::HttpUserRepository;
