use super::identity::{Identity, Mint, TokenAccountAddress};
use super::payment::{TokenAccount, ValidatedIntent};
use super::processor::PaymentProcessor;
use crate::error::Result;
use async_trait::async_trait;

/// Persists one [`PaymentProcessor`] per deployment identifier.
#[async_trait]
pub trait ProcessorStore: Send + Sync {
    /// Stores `processor` only if `deployment` has no record yet. Returns whether it was inserted.
    ///
    /// Implementations must make the check and the write a single step, so that concurrent
    /// callers see exactly one `true`.
    async fn insert_if_absent(&self, deployment: &str, processor: PaymentProcessor) -> Result<bool>;
    async fn store(&self, deployment: &str, processor: PaymentProcessor) -> Result<()>;
    async fn get(&self, deployment: &str) -> Result<Option<PaymentProcessor>>;
}

/// The host ledger's token accounts and its transfer primitive.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    async fn account(&self, address: &TokenAccountAddress) -> Result<Option<TokenAccount>>;
    /// Credits the associated account of `owner` for `mint`, opening it when missing.
    async fn mint_to(&self, owner: Identity, mint: Mint, amount: u64) -> Result<TokenAccount>;
    /// Moves `intent.amount` from `intent.from` to `intent.to`.
    ///
    /// All or nothing: on error neither account has changed.
    async fn transfer(&self, intent: &ValidatedIntent) -> Result<()>;
    async fn set_frozen(&self, address: &TokenAccountAddress, frozen: bool) -> Result<()>;
    async fn all_accounts(&self) -> Result<Vec<TokenAccount>>;
}

pub type ProcessorStoreBox = Box<dyn ProcessorStore>;
pub type TokenLedgerBox = Box<dyn TokenLedger>;
