use crate::domain::identity::{Identity, Mint, TokenAccountAddress};
use crate::domain::payment::{TokenAccount, ValidatedIntent};
use crate::domain::ports::{ProcessorStore, TokenLedger};
use crate::domain::processor::PaymentProcessor;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for processor records.
///
/// Uses `Arc<RwLock<HashMap<String, PaymentProcessor>>>`; clones share the same map, which
/// lets several engines race against one deployment.
#[derive(Default, Clone)]
pub struct InMemoryProcessorStore {
    processors: Arc<RwLock<HashMap<String, PaymentProcessor>>>,
}

impl InMemoryProcessorStore {
    /// Creates a new, empty in-memory processor store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessorStore for InMemoryProcessorStore {
    async fn insert_if_absent(&self, deployment: &str, processor: PaymentProcessor) -> Result<bool> {
        let mut processors = self.processors.write().await;
        match processors.entry(deployment.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(processor);
                Ok(true)
            }
        }
    }

    async fn store(&self, deployment: &str, processor: PaymentProcessor) -> Result<()> {
        let mut processors = self.processors.write().await;
        processors.insert(deployment.to_string(), processor);
        Ok(())
    }

    async fn get(&self, deployment: &str) -> Result<Option<PaymentProcessor>> {
        let processors = self.processors.read().await;
        Ok(processors.get(deployment).cloned())
    }
}

/// A thread-safe in-memory token ledger.
///
/// A transfer holds the write lock for its whole check-then-move sequence, which makes it
/// atomic with respect to every other ledger call.
#[derive(Default, Clone)]
pub struct InMemoryTokenLedger {
    accounts: Arc<RwLock<HashMap<TokenAccountAddress, TokenAccount>>>,
}

impl InMemoryTokenLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Computes the post-transfer balances of both sides without touching them.
pub(crate) fn plan_transfer(
    source: Option<&TokenAccount>,
    destination: Option<&TokenAccount>,
    intent: &ValidatedIntent,
) -> Result<(u64, u64)> {
    let source = source
        .ok_or_else(|| PaymentError::TransferFailed(format!("source account {} not found", intent.from)))?;
    let destination = destination.ok_or_else(|| {
        PaymentError::TransferFailed(format!("destination account {} not found", intent.to))
    })?;

    if source.owner != intent.authority {
        return Err(PaymentError::TransferFailed(
            "owner does not match the transfer authority".to_string(),
        ));
    }
    if source.mint != intent.mint || destination.mint != intent.mint {
        return Err(PaymentError::TransferFailed("account mint mismatch".to_string()));
    }
    if source.frozen || destination.frozen {
        return Err(PaymentError::TransferFailed("account is frozen".to_string()));
    }
    if source.amount < intent.amount {
        return Err(PaymentError::TransferFailed("insufficient funds".to_string()));
    }
    if intent.from == intent.to {
        return Ok((source.amount, destination.amount));
    }

    let debited = source.amount - intent.amount;
    let credited = destination
        .amount
        .checked_add(intent.amount)
        .ok_or_else(|| PaymentError::TransferFailed("amount overflow".to_string()))?;
    Ok((debited, credited))
}

#[async_trait]
impl TokenLedger for InMemoryTokenLedger {
    async fn account(&self, address: &TokenAccountAddress) -> Result<Option<TokenAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(address).cloned())
    }

    async fn mint_to(&self, owner: Identity, mint: Mint, amount: u64) -> Result<TokenAccount> {
        let mut accounts = self.accounts.write().await;
        let address = TokenAccountAddress::associated(&owner, &mint);
        let account = accounts
            .entry(address)
            .or_insert_with(|| TokenAccount::new(owner, mint));
        account.amount = account
            .amount
            .checked_add(amount)
            .ok_or_else(|| PaymentError::TransferFailed("amount overflow".to_string()))?;
        Ok(account.clone())
    }

    async fn transfer(&self, intent: &ValidatedIntent) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let (debited, credited) =
            plan_transfer(accounts.get(&intent.from), accounts.get(&intent.to), intent)?;

        if let Some(source) = accounts.get_mut(&intent.from) {
            source.amount = debited;
        }
        if let Some(destination) = accounts.get_mut(&intent.to) {
            destination.amount = credited;
        }
        Ok(())
    }

    async fn set_frozen(&self, address: &TokenAccountAddress, frozen: bool) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(address)
            .ok_or_else(|| PaymentError::AccountNotFound(address.to_string()))?;
        account.frozen = frozen;
        Ok(())
    }

    async fn all_accounts(&self) -> Result<Vec<TokenAccount>> {
        let accounts = self.accounts.read().await;
        let mut all: Vec<TokenAccount> = accounts.values().cloned().collect();
        all.sort_by(|a, b| a.owner.cmp(&b.owner).then(a.mint.cmp(&b.mint)));
        Ok(all)
    }
}
