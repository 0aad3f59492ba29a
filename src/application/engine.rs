use crate::domain::events::PaymentDone;
use crate::domain::identity::{Identity, Mint, TokenAccountAddress};
use crate::domain::payment::{self, PaymentOrder, PaymentRequest, TokenAccount};
use crate::domain::ports::{ProcessorStoreBox, TokenLedgerBox};
use crate::domain::processor::{PaymentProcessor, ProcessorState};
use crate::error::{PaymentError, Result};
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// A single request against the relay, as read from a script or built by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Initialize {
        caller: Identity,
        receiver: Identity,
        mint: Mint,
    },
    SetReceiver {
        caller: Identity,
        receiver: Identity,
    },
    Pause {
        caller: Identity,
    },
    Unpause {
        caller: Identity,
    },
    /// Ledger funding, outside the processor's rules.
    MintTo {
        owner: Identity,
        mint: Mint,
        amount: u64,
    },
    /// Pays from the payer's associated account for `mint`. The destination defaults to the
    /// associated account of the current receiver.
    Pay {
        payer: Identity,
        mint: Mint,
        receiver: Option<Identity>,
        amount: u64,
        payment_id: u64,
    },
}

/// What a successfully executed [`Instruction`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    State(ProcessorState),
    Funded(TokenAccount),
    Paid(PaymentDone),
}

/// The relay for one deployment.
///
/// Every mutation and every payment runs its read-validate-commit sequence under the
/// `commit` gate, so operations against the deployment are linearized. Creation is
/// additionally protected by the store's `insert_if_absent`.
pub struct RelayEngine {
    deployment: String,
    processor_store: ProcessorStoreBox,
    ledger: TokenLedgerBox,
    commit: Mutex<()>,
}

impl RelayEngine {
    /// Creates a new `RelayEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `deployment` - Key of the processor record in `processor_store`.
    /// * `processor_store` - Where the processor record lives.
    /// * `ledger` - The token ledger payments are settled on.
    pub fn new(
        deployment: impl Into<String>,
        processor_store: ProcessorStoreBox,
        ledger: TokenLedgerBox,
    ) -> Self {
        Self {
            deployment: deployment.into(),
            processor_store,
            ledger,
            commit: Mutex::new(()),
        }
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    async fn load(&self) -> Result<PaymentProcessor> {
        self.processor_store
            .get(&self.deployment)
            .await?
            .ok_or(PaymentError::NotInitialized)
    }

    /// Claims the deployment: `caller` becomes the owner. Fails if it was already claimed.
    pub async fn create(&self, caller: Identity, receiver: Identity, mint: Mint) -> Result<ProcessorState> {
        let _commit = self.commit.lock().await;
        let processor = PaymentProcessor::create(caller, receiver, mint);
        let state = processor.snapshot();

        if !self
            .processor_store
            .insert_if_absent(&self.deployment, processor)
            .await?
        {
            return Err(PaymentError::AlreadyInitialized);
        }

        info!(
            deployment = %self.deployment,
            owner = %caller,
            receiver = %receiver,
            mint = %mint,
            "PaymentProcessor initialized"
        );
        Ok(state)
    }

    /// Loads the record, applies an owner-gated mutation and persists the result.
    async fn mutate<F>(&self, mutation: F) -> Result<ProcessorState>
    where
        F: FnOnce(&mut PaymentProcessor) -> Result<()>,
    {
        let _commit = self.commit.lock().await;
        let mut processor = self.load().await?;
        mutation(&mut processor)?;
        let state = processor.snapshot();
        self.processor_store.store(&self.deployment, processor).await?;
        Ok(state)
    }

    pub async fn set_receiver(&self, caller: Identity, new_receiver: Identity) -> Result<ProcessorState> {
        let state = self
            .mutate(|processor| processor.set_receiver(&caller, new_receiver))
            .await?;
        info!(deployment = %self.deployment, "Receiver updated to {}", new_receiver);
        Ok(state)
    }

    pub async fn pause(&self, caller: Identity) -> Result<ProcessorState> {
        let state = self.mutate(|processor| processor.pause(&caller)).await?;
        info!(deployment = %self.deployment, "PaymentProcessor paused");
        Ok(state)
    }

    pub async fn unpause(&self, caller: Identity) -> Result<ProcessorState> {
        let state = self.mutate(|processor| processor.unpause(&caller)).await?;
        info!(deployment = %self.deployment, "PaymentProcessor unpaused");
        Ok(state)
    }

    /// Validates `order` against the current configuration and settles it on the ledger.
    ///
    /// Both token accounts are resolved from the ledger before validation, so a missing
    /// account fails with `AccountNotFound` even while the processor is paused. Nothing
    /// changes unless validation and transfer both succeed.
    pub async fn pay(&self, order: PaymentOrder) -> Result<PaymentDone> {
        let _commit = self.commit.lock().await;
        let processor = self.load().await?;
        self.settle(&processor, order).await
    }

    /// Caller must hold the commit gate; `processor` is the configuration loaded under it.
    async fn settle(&self, processor: &PaymentProcessor, order: PaymentOrder) -> Result<PaymentDone> {
        let source = self.resolve_account(&order.source).await?;
        let destination = self.resolve_account(&order.destination).await?;
        let request = PaymentRequest {
            payer: order.payer,
            source,
            destination,
            amount: order.amount,
            payment_id: order.payment_id,
        };

        let intent = payment::validate(&request, processor)?;
        self.ledger.transfer(&intent).await?;

        let event = PaymentDone::new(&intent, order.payment_id, Utc::now());
        info!(
            deployment = %self.deployment,
            payer = %event.payer,
            amount = event.amount,
            payment_id = event.payment_id,
            timestamp = event.timestamp,
            "PaymentDone"
        );
        Ok(event)
    }

    async fn resolve_account(&self, address: &TokenAccountAddress) -> Result<TokenAccount> {
        self.ledger
            .account(address)
            .await?
            .ok_or_else(|| PaymentError::AccountNotFound(address.to_string()))
    }

    /// Current configuration. Needs no authorization.
    pub async fn state(&self) -> Result<ProcessorState> {
        Ok(self.load().await?.snapshot())
    }

    pub async fn mint_to(&self, owner: Identity, mint: Mint, amount: u64) -> Result<TokenAccount> {
        let account = self.ledger.mint_to(owner, mint, amount).await?;
        debug!(account = %account.address, owner = %owner, amount, "Minted tokens");
        Ok(account)
    }

    pub async fn token_account(&self, address: &TokenAccountAddress) -> Result<Option<TokenAccount>> {
        self.ledger.account(address).await
    }

    pub async fn token_accounts(&self) -> Result<Vec<TokenAccount>> {
        self.ledger.all_accounts().await
    }

    /// Freezes or thaws a ledger account.
    pub async fn set_frozen(&self, address: &TokenAccountAddress, frozen: bool) -> Result<()> {
        self.ledger.set_frozen(address, frozen).await
    }

    /// Dispatches one [`Instruction`].
    pub async fn execute(&self, instruction: Instruction) -> Result<Outcome> {
        match instruction {
            Instruction::Initialize {
                caller,
                receiver,
                mint,
            } => self.create(caller, receiver, mint).await.map(Outcome::State),
            Instruction::SetReceiver { caller, receiver } => {
                self.set_receiver(caller, receiver).await.map(Outcome::State)
            }
            Instruction::Pause { caller } => self.pause(caller).await.map(Outcome::State),
            Instruction::Unpause { caller } => self.unpause(caller).await.map(Outcome::State),
            Instruction::MintTo {
                owner,
                mint,
                amount,
            } => self.mint_to(owner, mint, amount).await.map(Outcome::Funded),
            Instruction::Pay {
                payer,
                mint,
                receiver,
                amount,
                payment_id,
            } => {
                // The default destination must come from the same snapshot that validates it
                let _commit = self.commit.lock().await;
                let processor = self.load().await?;
                let receiver = receiver.unwrap_or(*processor.receiver());
                let order = PaymentOrder {
                    payer,
                    source: TokenAccountAddress::associated(&payer, &mint),
                    destination: TokenAccountAddress::associated(&receiver, processor.mint()),
                    amount,
                    payment_id,
                };
                self.settle(&processor, order).await.map(Outcome::Paid)
            }
        }
    }
}
