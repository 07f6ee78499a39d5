//! # Core
//!
//! The user-directory data flow. Nothing here knows about HTTP or terminals;
//! the gateway is reached through the [`UserApi`](crate::gateway::UserApi) trait.
//!
//! ```text
//!   gateway::UserApi ──▶ repository ──▶ caller ──▶ reconciler ──▶ list
//!   (remote calls)       (Result<T>)               (pure diff)    (owns state)
//! ```
//!
//! ## Modules
//!
//! - [`user`]: The `User` value and its derived display fields
//! - [`repository`]: Classifies gateway outcomes into `Result<T, RepositoryError>`
//! - [`reconciler`]: `diff(old, new)` → ordered `Edit`s, plus `apply`
//! - [`list`]: Presentation-side list that applies edits and fires callbacks
//! - [`config`]: Layered settings

pub mod config;
pub mod list;
pub mod reconciler;
pub mod repository;
pub mod user;
