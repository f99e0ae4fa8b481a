//! # Lockbox Scopes
//!
//! Access policies for the scopes users grant to clients.
//!
//! A [`Scope`] carries two independent policies, one deciding which users may
//! grant it and one deciding which clients may request it. Each policy is one
//! of four [`Policy`] values with a flat list of exceptions.
//!
//! ## Example
//!
//! ```rust
//! use lockbox_scopes::{Change, Policy, Scope};
//!
//! let scope = Scope::new("https://scopes.lockbox.dev/email")
//!     .with_user_policy(Policy::AllowAll, Vec::<String>::new())
//!     .with_client_policy(Policy::DefaultDeny, ["mail-client"]);
//!
//! assert!(scope.client_can_use("mail-client"));
//! assert!(!scope.client_can_use("other-client"));
//!
//! let change = Change {
//!     client_policy: Some(Policy::AllowAll),
//!     ..Default::default()
//! };
//! assert!(change.apply_to(&scope).client_can_use("other-client"));
//! ```

pub mod change;
pub mod error;
pub mod policy;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use change::{apply, Change};
pub use error::{Result, ScopeError};
pub use policy::{actor_can_use, filter_by_client_id, filter_by_user_id};
pub use store::{InMemoryScopeStore, ScopeStore};
pub use types::{sort_by_id, Policy, Scope, ScopeId};
