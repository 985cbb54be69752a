//! Blog post endpoints. Reads are public; writes go through the session gate.

pub mod handlers;
