use anyhow::Result;
use async_trait::async_trait;
use shared::domain::TicketNumber;
use tracing::debug;

use crate::page::SelectOption;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn assignable_users(&self, ticket_number: &TicketNumber) -> Result<Vec<SelectOption>>;
}

pub struct MissingUserDirectory;

#[async_trait]
impl UserDirectory for MissingUserDirectory {
    async fn assignable_users(&self, ticket_number: &TicketNumber) -> Result<Vec<SelectOption>> {
        debug!(ticket = %ticket_number, "no user directory configured; keeping rendered options");
        Ok(Vec::new())
    }
}

pub struct StaticUserDirectory {
    users: Vec<SelectOption>,
}

impl StaticUserDirectory {
    pub fn new(users: Vec<SelectOption>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn assignable_users(&self, _ticket_number: &TicketNumber) -> Result<Vec<SelectOption>> {
        Ok(self.users.clone())
    }
}
