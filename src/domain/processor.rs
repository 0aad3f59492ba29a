use super::identity::{Identity, Mint};
use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};

/// Succeeds iff `caller` owns `processor`. Gates every administrative mutation.
pub fn authorize(caller: &Identity, processor: &PaymentProcessor) -> Result<()> {
    if *caller == processor.owner {
        Ok(())
    } else {
        Err(PaymentError::Unauthorized)
    }
}

/// The configuration record of a deployment.
///
/// `owner` and `mint` are fixed at creation. `receiver` and `paused` can only be changed
/// through the owner-gated mutators below, so the fields stay private.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PaymentProcessor {
    owner: Identity,
    /// Identity whose token account receives payments.
    receiver: Identity,
    /// The only token type accepted for payments.
    mint: Mint,
    /// While set, nobody can pay through the processor.
    paused: bool,
}

/// Read-only projection of a [`PaymentProcessor`] handed to observers.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct ProcessorState {
    pub owner: Identity,
    pub receiver: Identity,
    pub mint: Mint,
    pub paused: bool,
}

impl PaymentProcessor {
    /// Builds a fresh, unpaused record owned by `caller`.
    pub fn create(caller: Identity, receiver: Identity, mint: Mint) -> Self {
        Self {
            owner: caller,
            receiver,
            mint,
            paused: false,
        }
    }

    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    pub fn receiver(&self) -> &Identity {
        &self.receiver
    }

    pub fn mint(&self) -> &Mint {
        &self.mint
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Replaces the receiver. Assigning the current receiver again is allowed.
    pub fn set_receiver(&mut self, caller: &Identity, new_receiver: Identity) -> Result<()> {
        authorize(caller, self)?;
        self.receiver = new_receiver;
        Ok(())
    }

    /// Pausing an already paused processor is a no-op.
    pub fn pause(&mut self, caller: &Identity) -> Result<()> {
        authorize(caller, self)?;
        self.paused = true;
        Ok(())
    }

    /// Unpausing a running processor is a no-op.
    pub fn unpause(&mut self, caller: &Identity) -> Result<()> {
        authorize(caller, self)?;
        self.paused = false;
        Ok(())
    }

    pub fn snapshot(&self) -> ProcessorState {
        ProcessorState {
            owner: self.owner,
            receiver: self.receiver,
            mint: self.mint,
            paused: self.paused,
        }
    }
}
