use std::cell::{Cell, Ref, RefCell};

use crate::api::{LoadError, UserSource};
use crate::user::User;

/// Something that shows a list of users, one row each.
pub trait RowTarget {
    /// Replaces every row currently shown with one row per user, in order.
    fn replace_rows(&mut self, users: Vec<User>) -> Result<(), LoadError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The table now shows this many rows.
    Rendered(usize),
    /// A later load started while this one was waiting; nothing was written.
    Superseded,
}

/// Fetches the user collection and renders it into a target.
///
/// Each call to [`UserTableLoader::load`] takes a ticket before it suspends
/// on the network. Only the holder of the latest ticket may write, so
/// overlapping loads never interleave their rows.
pub struct UserTableLoader<S, T> {
    source: S,
    target: RefCell<T>,
    generation: Cell<u64>,
}

impl<S: UserSource, T: RowTarget> UserTableLoader<S, T> {
    pub fn new(source: S, target: T) -> Self {
        Self {
            source,
            target: RefCell::new(target),
            generation: Cell::new(0),
        }
    }

    pub async fn load(&self) -> Result<LoadOutcome, LoadError> {
        let ticket = self.generation.get() + 1;
        self.generation.set(ticket);

        let users = self.source.fetch_users().await?;

        if self.generation.get() != ticket {
            return Ok(LoadOutcome::Superseded);
        }

        let count = users.len();
        self.target.borrow_mut().replace_rows(users)?;

        Ok(LoadOutcome::Rendered(count))
    }

    pub fn target(&self) -> Ref<'_, T> {
        self.target.borrow()
    }
}
