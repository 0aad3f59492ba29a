#![allow(dead_code)]

use payrelay::application::engine::RelayEngine;
use payrelay::domain::identity::{Identity, Mint, TokenAccountAddress};
use payrelay::infrastructure::in_memory::{InMemoryProcessorStore, InMemoryTokenLedger};
use std::io::Write;
use tempfile::NamedTempFile;

pub const DEPLOYMENT: &str = "payment_processor";
pub const SCRIPT_HEADER: &str = "op, caller, target, mint, amount, payment_id";

pub fn random_identity() -> Identity {
    Identity::new(rand::random())
}

pub fn random_mint() -> Mint {
    Mint::new(rand::random())
}

pub fn in_memory_engine() -> RelayEngine {
    RelayEngine::new(
        DEPLOYMENT,
        Box::new(InMemoryProcessorStore::new()),
        Box::new(InMemoryTokenLedger::new()),
    )
}

/// Parties of a deployment with funded token accounts.
pub struct Setup {
    pub engine: RelayEngine,
    pub owner: Identity,
    pub receiver: Identity,
    pub payer: Identity,
    pub mint: Mint,
}

impl Setup {
    /// Creates the processor, funds the payer with 1_000_000_000 and opens the receiver's account.
    pub async fn new() -> Self {
        let setup = Self {
            engine: in_memory_engine(),
            owner: random_identity(),
            receiver: random_identity(),
            payer: random_identity(),
            mint: random_mint(),
        };
        setup
            .engine
            .create(setup.owner, setup.receiver, setup.mint)
            .await
            .unwrap();
        setup
            .engine
            .mint_to(setup.payer, setup.mint, 1_000_000_000)
            .await
            .unwrap();
        setup.engine.mint_to(setup.receiver, setup.mint, 0).await.unwrap();
        setup
    }

    pub fn payer_account(&self) -> TokenAccountAddress {
        TokenAccountAddress::associated(&self.payer, &self.mint)
    }

    pub fn receiver_account(&self) -> TokenAccountAddress {
        TokenAccountAddress::associated(&self.receiver, &self.mint)
    }

    pub async fn balance(&self, address: &TokenAccountAddress) -> u64 {
        self.engine
            .token_account(address)
            .await
            .unwrap()
            .map(|account| account.amount)
            .unwrap_or_default()
    }
}

pub fn write_script(rows: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", SCRIPT_HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}
