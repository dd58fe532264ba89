//! The BalanceEngine: event history in, debt edges out.
//!
//! Application rules:
//!
//! - `ExpenseAdded` splits the amount evenly across all non-payer members
//!   using integer floor division; the fractional remainder is dropped,
//!   not redistributed. This matches the on-chain accounting exactly and
//!   must be preserved bit-for-bit.
//! - `ExpenseVoided` marks the expense voided and does **not** reverse
//!   already-applied edge deltas.
//! - `SettlementFinalized` decrements the matching edge exactly once per
//!   receipt hash, clamping at zero. Over-settlement is recorded as a
//!   recoverable inconsistency. A finalize event with no matching edge is
//!   tolerated as a no-op.
//!
//! Replaying the full history from empty state always reproduces the same
//! edge set; a single bad event never halts processing.

use std::collections::HashMap;

use tracing::{debug, warn};

use splitchain_types::{
    Address, DebtEdge, EdgeKey, Expense, ExpenseId, Group, GroupId, IntentHash, LedgerEvent,
    ReceiptHash, Result, SettlementIntent, SplitchainError, constants,
};

use crate::edge_root::compute_edge_root;
use crate::receipt_guard::ReceiptGuard;

/// A settlement that attempted to extinguish more debt than the edge held.
///
/// The edge was clamped at zero; the excess is preserved here so operators
/// can reconcile it instead of the ledger silently going negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverSettlement {
    pub key: EdgeKey,
    pub receipt_hash: ReceiptHash,
    /// What the edge held when the settlement arrived.
    pub outstanding: u128,
    /// What the settlement tried to extinguish.
    pub attempted: u128,
}

/// Deterministic projection from event history to the current debt-edge set.
pub struct BalanceEngine {
    groups: HashMap<GroupId, Group>,
    expenses: HashMap<ExpenseId, Expense>,
    intents: HashMap<IntentHash, SettlementIntent>,
    /// Exactly one canonical edge per (group, debtor, creditor, token).
    edges: HashMap<EdgeKey, DebtEdge>,
    /// Idempotency over settlement receipts.
    receipts: ReceiptGuard,
    /// Clamped over-settlements awaiting manual reconciliation.
    over_settlements: Vec<OverSettlement>,
}

impl BalanceEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
            expenses: HashMap::new(),
            intents: HashMap::new(),
            edges: HashMap::new(),
            receipts: ReceiptGuard::new(constants::RECEIPT_IDEMPOTENCY_CACHE_SIZE),
            over_settlements: Vec::new(),
        }
    }

    /// Build an engine by replaying an event history from empty state.
    #[must_use]
    pub fn project<'a>(events: impl IntoIterator<Item = &'a LedgerEvent>) -> Self {
        let mut engine = Self::new();
        engine.replay(events);
        engine
    }

    /// Apply every event in order, logging and skipping the ones that fail
    /// validation. Returns the number of events that were skipped.
    pub fn replay<'a>(&mut self, events: impl IntoIterator<Item = &'a LedgerEvent>) -> usize {
        let mut skipped = 0;
        for event in events {
            if let Err(err) = self.apply(event) {
                warn!(event = event.name(), %err, "skipping bad event");
                skipped += 1;
            }
        }
        skipped
    }

    /// Apply a single event.
    ///
    /// # Errors
    /// Returns the validation error for a malformed event. The engine state
    /// is unchanged on error, so callers may skip and continue.
    pub fn apply(&mut self, event: &LedgerEvent) -> Result<()> {
        match event {
            LedgerEvent::GroupCreated {
                group_id,
                name,
                members,
                created_at,
            } => self.apply_group_created(*group_id, name, members, *created_at),
            LedgerEvent::ExpenseAdded {
                group_id,
                expense_id,
                payer,
                token,
                amount,
                content_cid,
                memo,
                created_at,
            } => self.apply_expense_added(Expense {
                id: *expense_id,
                group_id: *group_id,
                payer: *payer,
                token: token.clone(),
                amount: *amount,
                content_cid: content_cid.clone(),
                memo: memo.clone(),
                created_at: *created_at,
                voided: false,
            }),
            LedgerEvent::ExpenseVoided { expense_id } => self.apply_expense_voided(*expense_id),
            LedgerEvent::SettlementIntentCreated {
                intent_hash,
                group_id,
                debtor,
                creditor,
                route,
                created_at,
            } => self.apply_intent_created(SettlementIntent {
                intent_hash: *intent_hash,
                group_id: *group_id,
                debtor: *debtor,
                creditor: *creditor,
                route: route.clone(),
                created_at: *created_at,
            }),
            LedgerEvent::SettlementFinalized {
                receipt_hash,
                group_id,
                debtor,
                creditor,
                token,
                amount,
                ..
            } => self.apply_settlement_finalized(
                *receipt_hash,
                EdgeKey::new(*group_id, *debtor, *creditor, token.clone())?,
                *amount,
            ),
        }
    }

    fn apply_group_created(
        &mut self,
        group_id: GroupId,
        name: &str,
        members: &[Address],
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        if self.groups.contains_key(&group_id) {
            return Err(SplitchainError::DuplicateGroup(group_id));
        }
        if members.is_empty() {
            return Err(SplitchainError::InvalidEvent {
                reason: format!("{group_id} created with zero members"),
            });
        }
        let mut seen = std::collections::HashSet::new();
        if !members.iter().all(|m| seen.insert(*m)) {
            return Err(SplitchainError::InvalidEvent {
                reason: format!("{group_id} created with duplicate members"),
            });
        }

        self.groups.insert(
            group_id,
            Group {
                id: group_id,
                name: name.to_string(),
                members: members.to_vec(),
                created_at,
            },
        );
        Ok(())
    }

    fn apply_expense_added(&mut self, expense: Expense) -> Result<()> {
        if expense.amount == 0 {
            return Err(SplitchainError::InvalidEvent {
                reason: format!("{} has zero amount", expense.id),
            });
        }
        if self.expenses.contains_key(&expense.id) {
            return Err(SplitchainError::InvalidEvent {
                reason: format!("{} already logged", expense.id),
            });
        }
        let group = self
            .groups
            .get(&expense.group_id)
            .ok_or(SplitchainError::UnknownGroup(expense.group_id))?;
        if !group.is_member(&expense.payer) {
            return Err(SplitchainError::InvalidEvent {
                reason: format!("payer {} is not a member of {}", expense.payer, group.id),
            });
        }

        // Equal split across non-payer members, floor division. The
        // remainder is dropped — see DESIGN.md.
        let debtors: Vec<_> = group
            .members
            .iter()
            .copied()
            .filter(|m| *m != expense.payer)
            .collect();

        if debtors.is_empty() {
            // A group of one produces no edges — policy, not an error.
            debug!(expense = %expense.id, "single-member group, no edges");
            self.expenses.insert(expense.id, expense);
            return Ok(());
        }

        let share = expense.amount / debtors.len() as u128;
        for debtor in debtors {
            // Self-edges are impossible here (debtor != payer by filter),
            // so key construction cannot fail.
            let key = EdgeKey::new(expense.group_id, debtor, expense.payer, expense.token.clone())?;
            let edge = self.edges.entry(key).or_default();
            edge.amount += share;
        }

        self.expenses.insert(expense.id, expense);
        Ok(())
    }

    fn apply_expense_voided(&mut self, expense_id: ExpenseId) -> Result<()> {
        let expense = self
            .expenses
            .get_mut(&expense_id)
            .ok_or(SplitchainError::UnknownExpense(expense_id))?;

        // Voiding is a flag flip only; edge deltas stay applied.
        expense.voided = true;
        Ok(())
    }

    fn apply_intent_created(&mut self, intent: SettlementIntent) -> Result<()> {
        if !self.groups.contains_key(&intent.group_id) {
            return Err(SplitchainError::UnknownGroup(intent.group_id));
        }
        if self.intents.contains_key(&intent.intent_hash) {
            return Err(SplitchainError::InvalidEvent {
                reason: format!("{} already recorded", intent.intent_hash),
            });
        }
        self.intents.insert(intent.intent_hash, intent);
        Ok(())
    }

    fn apply_settlement_finalized(
        &mut self,
        receipt_hash: ReceiptHash,
        key: EdgeKey,
        amount: u128,
    ) -> Result<()> {
        if !self.receipts.observe(receipt_hash) {
            debug!(%receipt_hash, %key, "settlement replayed, no-op");
            return Ok(());
        }

        let Some(edge) = self.edges.get_mut(&key) else {
            // Tolerated: a finalize event with no matching edge.
            warn!(%receipt_hash, %key, "settlement for unknown edge, no-op");
            return Ok(());
        };

        if amount > edge.amount {
            warn!(
                %receipt_hash, %key,
                outstanding = edge.amount,
                attempted = amount,
                "over-settlement clamped at zero"
            );
            self.over_settlements.push(OverSettlement {
                key,
                receipt_hash,
                outstanding: edge.amount,
                attempted: amount,
            });
            edge.amount = 0;
        } else {
            edge.amount -= amount;
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    #[must_use]
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    #[must_use]
    pub fn expense(&self, id: &ExpenseId) -> Option<&Expense> {
        self.expenses.get(id)
    }

    #[must_use]
    pub fn intent(&self, hash: &IntentHash) -> Option<&SettlementIntent> {
        self.intents.get(hash)
    }

    #[must_use]
    pub fn edge(&self, key: &EdgeKey) -> Option<&DebtEdge> {
        self.edges.get(key)
    }

    /// Outstanding amount on an edge; zero for edges that never existed.
    #[must_use]
    pub fn outstanding(&self, key: &EdgeKey) -> u128 {
        self.edges.get(key).map_or(0, |e| e.amount)
    }

    /// All edges, including closed ones kept for history.
    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &DebtEdge)> {
        self.edges.iter()
    }

    /// Edges with outstanding debt.
    pub fn open_edges(&self) -> impl Iterator<Item = (&EdgeKey, &DebtEdge)> {
        self.edges.iter().filter(|(_, e)| e.open())
    }

    /// Clamped over-settlements recorded so far, oldest first.
    #[must_use]
    pub fn over_settlements(&self) -> &[OverSettlement] {
        &self.over_settlements
    }

    /// Deterministic digest of the current edge set, for replay comparison.
    #[must_use]
    pub fn edge_root(&self) -> [u8; 32] {
        compute_edge_root(self.edges.iter())
    }
}

impl Default for BalanceEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use splitchain_types::{Address, ChainId, ExpenseId, GroupId, TokenId, TxHash};

    use super::*;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    fn usdc() -> TokenId {
        TokenId::new("USDC")
    }

    fn group_created(id: u64, members: &[Address]) -> LedgerEvent {
        LedgerEvent::GroupCreated {
            group_id: GroupId(id),
            name: format!("group-{id}"),
            members: members.to_vec(),
            created_at: Utc::now(),
        }
    }

    fn expense(group: u64, id: u64, payer: Address, amount: u128) -> LedgerEvent {
        LedgerEvent::ExpenseAdded {
            group_id: GroupId(group),
            expense_id: ExpenseId(id),
            payer,
            token: usdc(),
            amount,
            content_cid: String::new(),
            memo: String::new(),
            created_at: Utc::now(),
        }
    }

    fn finalized(
        group: u64,
        debtor: Address,
        creditor: Address,
        amount: u128,
        receipt: u8,
    ) -> LedgerEvent {
        LedgerEvent::SettlementFinalized {
            receipt_hash: ReceiptHash::from_bytes([receipt; 32]),
            group_id: GroupId(group),
            debtor,
            creditor,
            token: usdc(),
            amount,
            dst_chain: ChainId(42161),
            dst_tx_hash: TxHash([receipt; 32]),
            finalized_at: Utc::now(),
        }
    }

    fn edge_key(group: u64, debtor: Address, creditor: Address) -> EdgeKey {
        EdgeKey::new(GroupId(group), debtor, creditor, usdc()).unwrap()
    }

    #[test]
    fn three_member_split_is_even() {
        let mut engine = BalanceEngine::new();
        let (p, a, b) = (addr(1), addr(2), addr(3));
        engine.apply(&group_created(1, &[p, a, b])).unwrap();
        engine.apply(&expense(1, 1, p, 100)).unwrap();

        // 100 / 2 = 50 each
        assert_eq!(engine.outstanding(&edge_key(1, a, p)), 50);
        assert_eq!(engine.outstanding(&edge_key(1, b, p)), 50);
    }

    #[test]
    fn four_member_split_drops_remainder() {
        let mut engine = BalanceEngine::new();
        let (p, a, b, c) = (addr(1), addr(2), addr(3), addr(4));
        engine.apply(&group_created(1, &[p, a, b, c])).unwrap();
        engine.apply(&expense(1, 1, p, 100)).unwrap();

        // floor(100 / 3) = 33; 99 distributed, remainder 1 dropped.
        for debtor in [a, b, c] {
            assert_eq!(engine.outstanding(&edge_key(1, debtor, p)), 33);
        }
        let total: u128 = engine.edges().map(|(_, e)| e.amount).sum();
        assert_eq!(total, 99);
    }

    #[test]
    fn expenses_accumulate_on_the_same_edge() {
        let mut engine = BalanceEngine::new();
        let (p, a) = (addr(1), addr(2));
        engine.apply(&group_created(1, &[p, a])).unwrap();
        engine.apply(&expense(1, 1, p, 100)).unwrap();
        engine.apply(&expense(1, 2, p, 40)).unwrap();

        assert_eq!(engine.outstanding(&edge_key(1, a, p)), 140);
        assert_eq!(engine.edges().count(), 1, "one canonical edge per key");
    }

    #[test]
    fn single_member_group_produces_no_edges() {
        let mut engine = BalanceEngine::new();
        let p = addr(1);
        engine.apply(&group_created(1, &[p])).unwrap();
        engine.apply(&expense(1, 1, p, 100)).unwrap();

        assert_eq!(engine.edges().count(), 0);
        assert!(engine.expense(&ExpenseId(1)).is_some());
    }

    #[test]
    fn no_self_edges_ever() {
        let mut engine = BalanceEngine::new();
        let (p, a, b) = (addr(1), addr(2), addr(3));
        engine.apply(&group_created(1, &[p, a, b])).unwrap();
        engine.apply(&expense(1, 1, p, 90)).unwrap();
        engine.apply(&expense(1, 2, a, 90)).unwrap();

        for (key, _) in engine.edges() {
            assert_ne!(key.debtor, key.creditor);
        }
    }

    #[test]
    fn zero_amount_expense_rejected() {
        let mut engine = BalanceEngine::new();
        let (p, a) = (addr(1), addr(2));
        engine.apply(&group_created(1, &[p, a])).unwrap();

        let err = engine.apply(&expense(1, 1, p, 0)).unwrap_err();
        assert!(matches!(err, SplitchainError::InvalidEvent { .. }));
    }

    #[test]
    fn unknown_group_expense_rejected() {
        let mut engine = BalanceEngine::new();
        let err = engine.apply(&expense(7, 1, addr(1), 100)).unwrap_err();
        assert!(matches!(err, SplitchainError::UnknownGroup(GroupId(7))));
    }

    #[test]
    fn non_member_payer_rejected() {
        let mut engine = BalanceEngine::new();
        engine.apply(&group_created(1, &[addr(1), addr(2)])).unwrap();
        let err = engine.apply(&expense(1, 1, addr(9), 100)).unwrap_err();
        assert!(matches!(err, SplitchainError::InvalidEvent { .. }));
    }

    #[test]
    fn void_does_not_reverse_edges() {
        let mut engine = BalanceEngine::new();
        let (p, a) = (addr(1), addr(2));
        engine.apply(&group_created(1, &[p, a])).unwrap();
        engine.apply(&expense(1, 1, p, 100)).unwrap();
        engine
            .apply(&LedgerEvent::ExpenseVoided {
                expense_id: ExpenseId(1),
            })
            .unwrap();

        assert!(engine.expense(&ExpenseId(1)).unwrap().voided);
        assert_eq!(engine.outstanding(&edge_key(1, a, p)), 100);
    }

    #[test]
    fn settlement_decrements_and_closes_edge() {
        let mut engine = BalanceEngine::new();
        let (p, a) = (addr(1), addr(2));
        engine.apply(&group_created(1, &[p, a])).unwrap();
        engine.apply(&expense(1, 1, p, 100)).unwrap();

        engine.apply(&finalized(1, a, p, 60, 0xA1)).unwrap();
        let key = edge_key(1, a, p);
        assert_eq!(engine.outstanding(&key), 40);
        assert!(engine.edge(&key).unwrap().open());

        engine.apply(&finalized(1, a, p, 40, 0xA2)).unwrap();
        assert_eq!(engine.outstanding(&key), 0);
        assert!(!engine.edge(&key).unwrap().open());
        // The record persists for history.
        assert!(engine.edge(&key).is_some());
    }

    #[test]
    fn settlement_is_idempotent_per_receipt() {
        let mut engine = BalanceEngine::new();
        let (p, a) = (addr(1), addr(2));
        engine.apply(&group_created(1, &[p, a])).unwrap();
        engine.apply(&expense(1, 1, p, 100)).unwrap();

        let event = finalized(1, a, p, 30, 0xB1);
        engine.apply(&event).unwrap();
        engine.apply(&event).unwrap();

        assert_eq!(engine.outstanding(&edge_key(1, a, p)), 70);
    }

    #[test]
    fn over_settlement_clamps_and_flags() {
        let mut engine = BalanceEngine::new();
        let (p, a) = (addr(1), addr(2));
        engine.apply(&group_created(1, &[p, a])).unwrap();
        engine.apply(&expense(1, 1, p, 100)).unwrap();

        engine.apply(&finalized(1, a, p, 250, 0xC1)).unwrap();

        let key = edge_key(1, a, p);
        assert_eq!(engine.outstanding(&key), 0, "clamped, never negative");
        assert_eq!(engine.over_settlements().len(), 1);
        let flag = &engine.over_settlements()[0];
        assert_eq!(flag.outstanding, 100);
        assert_eq!(flag.attempted, 250);
        assert_eq!(flag.key, key);
    }

    #[test]
    fn settlement_for_unknown_edge_is_noop() {
        let mut engine = BalanceEngine::new();
        let (p, a) = (addr(1), addr(2));
        engine.apply(&group_created(1, &[p, a])).unwrap();

        // No expense ever created this edge.
        engine.apply(&finalized(1, a, p, 50, 0xD1)).unwrap();
        assert_eq!(engine.edges().count(), 0);
        assert!(engine.over_settlements().is_empty());
    }

    #[test]
    fn replay_skips_bad_events_and_continues() {
        let (p, a) = (addr(1), addr(2));
        let events = vec![
            group_created(1, &[p, a]),
            expense(99, 1, p, 100), // unknown group — skipped
            expense(1, 2, p, 0),    // zero amount — skipped
            expense(1, 3, p, 80),   // fine
        ];
        let mut engine = BalanceEngine::new();
        let skipped = engine.replay(&events);

        assert_eq!(skipped, 2);
        assert_eq!(engine.outstanding(&edge_key(1, a, p)), 80);
    }

    #[test]
    fn duplicate_group_rejected() {
        let mut engine = BalanceEngine::new();
        engine.apply(&group_created(1, &[addr(1), addr(2)])).unwrap();
        let err = engine
            .apply(&group_created(1, &[addr(3), addr(4)]))
            .unwrap_err();
        assert!(matches!(err, SplitchainError::DuplicateGroup(GroupId(1))));
    }

    #[test]
    fn duplicate_members_rejected() {
        let mut engine = BalanceEngine::new();
        let err = engine
            .apply(&group_created(1, &[addr(1), addr(1)]))
            .unwrap_err();
        assert!(matches!(err, SplitchainError::InvalidEvent { .. }));
    }
}
