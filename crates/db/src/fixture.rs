//! JSON group fixtures for seeding the in-memory store.

use std::path::Path;

use serde::{Deserialize, Serialize};
use splitledger_core::ledger::{Expense, GroupMember, LedgerStore, Settlement, StoreError};
use splitledger_shared::types::GroupId;
use thiserror::Error;

use crate::memory::InMemoryLedgerStore;

/// Errors that can occur while reading, writing or importing fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The fixture file could not be read or written.
    #[error("fixture I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The fixture file is not valid JSON for a fixture.
    #[error("fixture format error: {0}")]
    Json(#[from] serde_json::Error),

    /// A fixture record was refused by the store.
    #[error("fixture import error: {0}")]
    Store(#[from] StoreError),
}

/// Every record of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFixture {
    /// The group.
    pub group_id: GroupId,
    /// Members in display order.
    pub members: Vec<GroupMember>,
    /// Expenses with their splits.
    #[serde(default)]
    pub expenses: Vec<Expense>,
    /// Settlements in any status.
    #[serde(default)]
    pub settlements: Vec<Settlement>,
}

/// A fixture file: any number of groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureFile {
    /// The groups in the file.
    pub groups: Vec<GroupFixture>,
}

impl FixtureFile {
    /// Reads a fixture file.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Io` or `FixtureError::Json`.
    pub async fn read(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Writes the fixture file as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Io` or `FixtureError::Json`.
    pub async fn write(&self, path: impl AsRef<Path>) -> Result<(), FixtureError> {
        let raw = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, raw).await?;
        Ok(())
    }
}

impl InMemoryLedgerStore {
    /// Imports one group fixture: members first, then expenses, then settlements.
    ///
    /// Nothing is stored if a record names a group other than the fixture's.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidRecord` for a record of another group, or
    /// the first `StoreError` raised by a record.
    pub async fn import(&self, fixture: &GroupFixture) -> Result<(), StoreError> {
        check_group(fixture)?;
        for member in &fixture.members {
            self.add_member(member.clone()).await?;
        }
        for expense in &fixture.expenses {
            self.add_expense(expense.clone()).await?;
        }
        for settlement in &fixture.settlements {
            self.add_settlement(settlement.clone()).await?;
        }
        tracing::debug!(
            group_id = %fixture.group_id,
            members = fixture.members.len(),
            expenses = fixture.expenses.len(),
            settlements = fixture.settlements.len(),
            "Imported group fixture"
        );
        Ok(())
    }

    /// Builds a store from every group of a fixture file.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Store` if a record is refused.
    pub async fn from_fixtures(file: &FixtureFile) -> Result<Self, FixtureError> {
        let store = Self::new();
        for group in &file.groups {
            store.import(group).await?;
        }
        Ok(store)
    }

}

fn check_group(fixture: &GroupFixture) -> Result<(), StoreError> {
    let expected = fixture.group_id;
    let mismatch = |kind: &str, id: String, found: GroupId| {
        StoreError::InvalidRecord(format!(
            "{kind} {id} belongs to group {found}, not fixture group {expected}"
        ))
    };
    for member in &fixture.members {
        if member.group_id != expected {
            return Err(mismatch("member", member.user_id.to_string(), member.group_id));
        }
    }
    for expense in &fixture.expenses {
        if expense.group_id != expected {
            return Err(mismatch("expense", expense.id.to_string(), expense.group_id));
        }
    }
    for settlement in &fixture.settlements {
        if settlement.group_id != expected {
            return Err(mismatch(
                "settlement",
                settlement.id.to_string(),
                settlement.group_id,
            ));
        }
    }
    Ok(())
}
