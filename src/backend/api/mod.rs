//! API Handlers Module
//!
//! Thin HTTP handlers over the store for users, groups and submissions.
//!
//! # Module Structure
//!
//! ```text
//! api/
//! ├── mod.rs          - Module exports and documentation
//! ├── access.rs       - Membership checks and parameter parsing
//! ├── users.rs        - GET/POST /user
//! ├── groups.rs       - Group creation, membership, deletion
//! └── submissions.rs  - GET/POST /user/submission
//! ```
//!
//! Every handler here runs behind the auth middleware.

/// Membership checks and parameter parsing
pub mod access;

/// User handlers
pub mod users;

/// Group handlers
pub mod groups;

/// Submission handlers
pub mod submissions;

pub use access::{require_group_member, require_session_member};
pub use groups::{add_user_to_group, create_group, delete_group, get_user_groups};
pub use submissions::{get_submission, upsert_submission};
pub use users::{create_user, get_user};
