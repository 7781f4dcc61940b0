//! Feature modules for offline-link.
//!
//! - `simulate`: run scripted offline/online sessions through a real link

pub mod simulate;
