//! # User List
//!
//! Presentation-side model of the user list. It owns the current list, and
//! it is the only mutable piece in the data flow: new data goes through
//! [`diff`](crate::core::reconciler::diff), the resulting edits are applied
//! here and handed back so a renderer can animate exactly those rows.
//!
//! ```text
//! repository ──Vec<User>──▶ UserList::submit ──Vec<Edit>──▶ renderer
//!                                │
//!                         row(i) │ click(i) / long_click(i)
//!                                ▼
//!                     UserRow, callbacks, ProfileArgs
//! ```

use log::debug;

use crate::core::reconciler::{self, ApplyError, Edit};
use crate::core::user::User;

/// Callback invoked with the user a row represents.
pub type UserCallback = Box<dyn Fn(&User) + Send + Sync>;

/// What a renderer shows for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub display_name: String,
    pub email: String,
    pub formatted_phone: String,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            display_name: user.display_name().to_string(),
            email: user.email.clone(),
            formatted_phone: user.formatted_phone(),
        }
    }
}

/// Plain text handed to the profile/detail view. No `User` crosses this boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileArgs {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl ProfileArgs {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    pub fn name_line(&self) -> String {
        format!("Name: {}", self.name.as_deref().unwrap_or("Unknown"))
    }

    pub fn email_line(&self) -> String {
        format!("Email: {}", self.email.as_deref().unwrap_or("No email"))
    }
}

impl From<&User> for ProfileArgs {
    fn from(user: &User) -> Self {
        Self::new(user.name.clone(), user.email.clone())
    }
}

#[derive(Default)]
pub struct UserList {
    users: Vec<User>,
    on_click: Option<UserCallback>,
    on_long_click: Option<UserCallback>,
}

impl UserList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the primary-interaction callback.
    pub fn on_click(mut self, callback: impl Fn(&User) + Send + Sync + 'static) -> Self {
        self.on_click = Some(Box::new(callback));
        self
    }

    /// Registers the secondary (long-press) callback.
    pub fn on_long_click(mut self, callback: impl Fn(&User) + Send + Sync + 'static) -> Self {
        self.on_long_click = Some(Box::new(callback));
        self
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Replaces the current list with `new` and returns the edits applied.
    pub fn submit(&mut self, new: Vec<User>) -> Result<Vec<Edit>, ApplyError> {
        let edits = reconciler::diff(&self.users, &new);
        reconciler::apply(&mut self.users, &edits)?;
        debug!("User list updated: {} edits, {} users", edits.len(), self.users.len());
        Ok(edits)
    }

    pub fn row(&self, index: usize) -> Option<UserRow> {
        self.users.get(index).map(UserRow::from)
    }

    pub fn rows(&self) -> Vec<UserRow> {
        self.users.iter().map(UserRow::from).collect()
    }

    /// Fires the click callback for the row at `index`. Returns false if there is no such row.
    pub fn click(&self, index: usize) -> bool {
        Self::fire(self.users.get(index), self.on_click.as_ref())
    }

    /// Fires the long-click callback for the row at `index`.
    pub fn long_click(&self, index: usize) -> bool {
        Self::fire(self.users.get(index), self.on_long_click.as_ref())
    }

    fn fire(user: Option<&User>, callback: Option<&UserCallback>) -> bool {
        match (user, callback) {
            (Some(user), Some(callback)) => {
                callback(user);
                true
            }
            _ => false,
        }
    }

    pub fn profile_args(&self, index: usize) -> Option<ProfileArgs> {
        self.users.get(index).map(ProfileArgs::from)
    }
}
