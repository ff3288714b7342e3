//! Server-rendered HTML pages

pub mod filters;
pub mod post;
pub mod urls;
