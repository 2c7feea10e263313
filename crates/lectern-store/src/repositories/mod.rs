//! Stateless repositories — every method takes `&Connection`.

pub mod entry;
pub mod search;
pub mod session;
