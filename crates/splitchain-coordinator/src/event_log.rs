//! The external event-log collaborator.
//!
//! The authoritative ledger contract/indexer owns the ordered, append-only
//! event stream. The coordinator reads it to confirm balances and writes
//! exactly one record per completed settlement. The trait keeps that
//! service injectable; [`MemoryEventLog`] backs tests and local runs.

use std::sync::Mutex;

use async_trait::async_trait;
use splitchain_types::{GroupId, LedgerEvent, Result, SplitchainError};

/// Read/write access to the ordered domain event stream.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// All events relevant to a group, in the log's total order.
    ///
    /// Group-agnostic events (expense voids) are included so a group
    /// projection sees its expenses' full lifecycle.
    async fn group_events(&self, group: GroupId) -> Result<Vec<LedgerEvent>>;

    /// Append one event to the log.
    async fn append(&self, event: LedgerEvent) -> Result<()>;
}

/// In-memory event log for tests and local runs.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    events: Mutex<Vec<LedgerEvent>>,
}

impl MemoryEventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the log with an existing history.
    #[must_use]
    pub fn with_events(events: Vec<LedgerEvent>) -> Self {
        Self {
            events: Mutex::new(events),
        }
    }

    /// Snapshot of the full stream, for assertions.
    #[must_use]
    pub fn all_events(&self) -> Vec<LedgerEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl EventLog for MemoryEventLog {
    async fn group_events(&self, group: GroupId) -> Result<Vec<LedgerEvent>> {
        let events = self
            .events
            .lock()
            .map_err(|_| SplitchainError::Internal("event log lock poisoned".into()))?;
        Ok(events
            .iter()
            .filter(|e| e.group_id().is_none_or(|g| g == group))
            .cloned()
            .collect())
    }

    async fn append(&self, event: LedgerEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| SplitchainError::Internal("event log lock poisoned".into()))?
            .push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use splitchain_types::{Address, ExpenseId};

    use super::*;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    #[tokio::test]
    async fn filters_by_group_but_keeps_voids() {
        let log = MemoryEventLog::new();
        log.append(LedgerEvent::GroupCreated {
            group_id: GroupId(1),
            name: "a".into(),
            members: vec![addr(1), addr(2)],
            created_at: Utc::now(),
        })
        .await
        .unwrap();
        log.append(LedgerEvent::GroupCreated {
            group_id: GroupId(2),
            name: "b".into(),
            members: vec![addr(3), addr(4)],
            created_at: Utc::now(),
        })
        .await
        .unwrap();
        log.append(LedgerEvent::ExpenseVoided {
            expense_id: ExpenseId(9),
        })
        .await
        .unwrap();

        let events = log.group_events(GroupId(1)).await.unwrap();
        assert_eq!(events.len(), 2, "group 1 creation + the group-agnostic void");

        let events = log.group_events(GroupId(2)).await.unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn append_preserves_order() {
        let log = MemoryEventLog::new();
        for id in 0..3 {
            log.append(LedgerEvent::ExpenseVoided {
                expense_id: ExpenseId(id),
            })
            .await
            .unwrap();
        }
        let events = log.all_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            LedgerEvent::ExpenseVoided {
                expense_id: ExpenseId(0)
            }
        ));
    }
}
