use crate::application::engine::Instruction;
use crate::domain::identity::{Identity, Mint};
use crate::error::{PaymentError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Init,
    SetReceiver,
    Pause,
    Unpause,
    MintTo,
    Pay,
}

/// One row of an instruction script: `op, caller, target, mint, amount, payment_id`.
///
/// `target` is the receiver for `init`/`set_receiver`, the funded owner for `mint_to`, and an
/// optional destination owner for `pay`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct InstructionRecord {
    pub op: Operation,
    pub caller: Identity,
    pub target: Option<Identity>,
    pub mint: Option<Mint>,
    pub amount: Option<u64>,
    pub payment_id: Option<u64>,
}

fn required<T>(value: Option<T>, op: Operation, column: &str) -> Result<T> {
    value.ok_or_else(|| PaymentError::InvalidInstruction(format!("{:?} requires `{}`", op, column)))
}

impl TryFrom<InstructionRecord> for Instruction {
    type Error = PaymentError;

    fn try_from(record: InstructionRecord) -> Result<Self> {
        let op = record.op;
        let caller = record.caller;
        Ok(match op {
            Operation::Init => Instruction::Initialize {
                caller,
                receiver: required(record.target, op, "target")?,
                mint: required(record.mint, op, "mint")?,
            },
            Operation::SetReceiver => Instruction::SetReceiver {
                caller,
                receiver: required(record.target, op, "target")?,
            },
            Operation::Pause => Instruction::Pause { caller },
            Operation::Unpause => Instruction::Unpause { caller },
            Operation::MintTo => Instruction::MintTo {
                owner: required(record.target, op, "target")?,
                mint: required(record.mint, op, "mint")?,
                amount: required(record.amount, op, "amount")?,
            },
            Operation::Pay => Instruction::Pay {
                payer: caller,
                mint: required(record.mint, op, "mint")?,
                receiver: record.target,
                amount: required(record.amount, op, "amount")?,
                payment_id: record.payment_id.unwrap_or_default(),
            },
        })
    }
}

/// Reads instructions from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Instruction>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct InstructionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> InstructionReader<R> {
    /// Creates a new `InstructionReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads, deserializes and checks instructions.
    pub fn instructions(self) -> impl Iterator<Item = Result<Instruction>> {
        self.reader
            .into_deserialize::<InstructionRecord>()
            .map(|result| result.map_err(PaymentError::from).and_then(Instruction::try_from))
    }
}
