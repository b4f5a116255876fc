//! Data models for the studio site and admin panel.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless interoperability.

mod content;
mod member;
mod project;
mod taxonomy;

pub use content::*;
pub use member::*;
pub use project::*;
pub use taxonomy::*;
