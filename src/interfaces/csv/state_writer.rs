use crate::domain::identity::{Identity, Mint, TokenAccountAddress};
use crate::domain::payment::TokenAccount;
use crate::domain::processor::ProcessorState;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct BalanceRow {
    account: TokenAccountAddress,
    owner: Identity,
    mint: Mint,
    amount: u64,
}

/// Writes the processor state and ledger balances as CSV sections.
///
/// Each section carries its own header row:
/// `owner,receiver,mint,paused` then `account,owner,mint,amount`.
pub struct StateWriter<W: Write> {
    output: W,
}

impl<W: Write> StateWriter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn write_state(&mut self, state: &ProcessorState) -> Result<()> {
        let mut writer = csv::Writer::from_writer(&mut self.output);
        writer.serialize(state)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_balances(&mut self, accounts: Vec<TokenAccount>) -> Result<()> {
        let mut writer = csv::Writer::from_writer(&mut self.output);
        for account in accounts {
            writer.serialize(BalanceRow {
                account: account.address,
                owner: account.owner,
                mint: account.mint,
                amount: account.amount,
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}
