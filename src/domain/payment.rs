use super::identity::{Identity, Mint, TokenAccountAddress};
use super::processor::PaymentProcessor;
use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};

/// A token account as held by the host ledger.
///
/// Amounts are expressed in the smallest denomination of the mint.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct TokenAccount {
    pub address: TokenAccountAddress,
    pub owner: Identity,
    pub mint: Mint,
    pub amount: u64,
    /// Frozen accounts can neither send nor receive.
    #[serde(default)]
    pub frozen: bool,
}

impl TokenAccount {
    /// An empty, unfrozen associated account.
    pub fn new(owner: Identity, mint: Mint) -> Self {
        Self {
            address: TokenAccountAddress::associated(&owner, &mint),
            owner,
            mint,
            amount: 0,
            frozen: false,
        }
    }
}

/// What a payer asks for, before the referenced accounts are resolved.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PaymentOrder {
    pub payer: Identity,
    pub source: TokenAccountAddress,
    pub destination: TokenAccountAddress,
    pub amount: u64,
    /// Carried into the emitted event for correlation. Reuse is allowed.
    pub payment_id: u64,
}

/// A payment with its token accounts resolved from the ledger.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PaymentRequest {
    pub payer: Identity,
    pub source: TokenAccount,
    pub destination: TokenAccount,
    pub amount: u64,
    pub payment_id: u64,
}

/// A transfer cleared for execution by the ledger.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct ValidatedIntent {
    pub from: TokenAccountAddress,
    pub to: TokenAccountAddress,
    /// Signer of the debit, always the payer.
    pub authority: Identity,
    pub mint: Mint,
    pub amount: u64,
}

/// Decides whether `request` may move funds under the current `processor` configuration.
///
/// Checks run in a fixed order so the reported error is reproducible: source mint,
/// destination mint, paused, destination owner, source owner, amount. A wrong mint is
/// reported as such whether or not the processor is paused. Pure; safe to call
/// speculatively.
pub fn validate(request: &PaymentRequest, processor: &PaymentProcessor) -> Result<ValidatedIntent> {
    if request.source.mint != *processor.mint() {
        return Err(PaymentError::MintMismatch);
    }
    if request.destination.mint != *processor.mint() {
        return Err(PaymentError::ReceiverMintMismatch);
    }
    if processor.is_paused() {
        return Err(PaymentError::Paused);
    }
    if request.destination.owner != *processor.receiver() {
        return Err(PaymentError::InvalidReceiver);
    }
    // Signature checks belong to the transaction boundary; ownership of the debited
    // account is still ours to enforce.
    if request.source.owner != request.payer {
        return Err(PaymentError::Unauthorized);
    }
    if request.amount == 0 {
        return Err(PaymentError::InvalidAmount);
    }

    Ok(ValidatedIntent {
        from: request.source.address,
        to: request.destination.address,
        authority: request.payer,
        mint: *processor.mint(),
        amount: request.amount,
    })
}
