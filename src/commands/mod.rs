//! # Command Handlers
//!
//! This module contains organized command handlers for the questctl CLI
//! application. Each resource is implemented in a dedicated submodule.
//!
//! ## Structure
//!
//! - `party` - Party commands (create, list, get, dashboard)
//! - `encounter` - Encounter commands (create, list, update)
//! - `combat` - Combat encounter and checkin commands
//! - `issue` - Issue commands (create, list, update)
//! - `feedback` - Feedback commands (create, list, update)
//! - `shared` - Shared dispatch and validation utilities

pub mod combat;
pub mod encounter;
pub mod feedback;
pub mod issue;
pub mod party;
pub mod shared;

pub use combat::handle_combat_command;
pub use encounter::handle_encounter_command;
pub use feedback::handle_feedback_command;
pub use issue::handle_issue_command;
pub use party::handle_party_command;
