//! Photo albums on top of a single S3 bucket
//!
//! Albums are key prefixes (`urlEscape(name) + "/"`) and photos are objects
//! stored under them. Browsing, creating and uploading go straight to the
//! object store; nothing is cached locally.

pub mod app;
pub mod error;
pub mod keys;
pub mod models;
pub mod photo;
pub mod storage;

pub use error::{Error, Result};
