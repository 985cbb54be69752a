//! Authentication module for the blog server
//!
//! This module handles password hashing, session token signing and
//! verification, the cookie gate for protected routes, and the admin
//! account endpoints.

pub mod handlers;
pub mod password;
pub mod session;
mod service;
mod token;

pub use service::AuthService;
pub use session::SESSION_COOKIE;
pub use token::{SessionIdentity, TokenCodec};
