//! Paginated user listing state.

use crate::client::decode_envelope;
use crate::endpoints::Query;
use crate::error::ApiError;
use crate::store::ApiStore;
use crate::transport::Transport;
use crate::types::{User, UserPage, UserQuery};

/// Page cursor plus email filter for the users table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPager {
    query: UserQuery,
    total: Option<u64>,
}

impl UserPager {
    pub fn new(limit: u32) -> Self {
        Self {
            query: UserQuery {
                limit: limit.max(1),
                ..UserQuery::default()
            },
            total: None,
        }
    }

    pub fn query(&self) -> Query {
        Query::AllUsers(self.query.clone())
    }

    pub fn page(&self) -> u32 {
        self.query.page
    }

    /// Changing the filter starts again from the first page.
    pub fn filter_email(&mut self, email: &str) {
        self.query.email = email.trim().to_string();
        self.query.page = 1;
        self.total = None;
    }

    pub fn has_next(&self) -> bool {
        match self.total {
            Some(total) => u64::from(self.query.page) * u64::from(self.query.limit) < total,
            None => false,
        }
    }

    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.query.page += 1;
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.query.page <= 1 {
            return false;
        }
        self.query.page -= 1;
        true
    }

    /// Fetch the current page and remember the total for paging.
    pub async fn load<T: Transport>(&mut self, store: &ApiStore<T>) -> Result<UserPage, ApiError> {
        let value = store.query(&self.query()).await?;
        let envelope = decode_envelope::<Vec<User>>(&value)?;
        self.total = envelope.meta.map(|meta| meta.total);
        Ok(UserPage {
            users: envelope.data,
            meta: envelope.meta,
        })
    }
}

impl Default for UserPager {
    fn default() -> Self {
        Self::new(UserQuery::default().limit)
    }
}
