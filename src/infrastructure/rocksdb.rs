use super::in_memory::plan_transfer;
use crate::domain::identity::{Identity, Mint, TokenAccountAddress};
use crate::domain::payment::{TokenAccount, ValidatedIntent};
use crate::domain::ports::{ProcessorStore, TokenLedger};
use crate::domain::processor::PaymentProcessor;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing processor records, keyed by deployment identifier.
pub const CF_PROCESSORS: &str = "processors";
/// Column Family for storing token accounts, keyed by account address.
pub const CF_TOKEN_ACCOUNTS: &str = "token_accounts";

/// A persistent store implementation using RocksDB.
///
/// Serves both as [`ProcessorStore`] and [`TokenLedger`], each in its own Column Family.
/// Read-modify-write sequences are serialized through `write_gate`, and a transfer's
/// debit and credit land in one `WriteBatch`.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_gate: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("processors" and "token_accounts") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_processors = ColumnFamilyDescriptor::new(CF_PROCESSORS, Options::default());
        let cf_accounts = ColumnFamilyDescriptor::new(CF_TOKEN_ACCOUNTS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_processors, cf_accounts])?;

        Ok(Self {
            db: Arc::new(db),
            write_gate: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PaymentError::StorageError(format!("{} column family not found", name)))
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_pinned_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key, bytes)?;
        Ok(())
    }
}

#[async_trait]
impl ProcessorStore for RocksDBStore {
    async fn insert_if_absent(&self, deployment: &str, processor: PaymentProcessor) -> Result<bool> {
        let _guard = self.write_gate.lock().await;
        let key = deployment.as_bytes();
        if self.db.get_pinned_cf(self.cf(CF_PROCESSORS)?, key)?.is_some() {
            return Ok(false);
        }
        self.write(CF_PROCESSORS, key, &processor)?;
        Ok(true)
    }

    async fn store(&self, deployment: &str, processor: PaymentProcessor) -> Result<()> {
        let _guard = self.write_gate.lock().await;
        self.write(CF_PROCESSORS, deployment.as_bytes(), &processor)
    }

    async fn get(&self, deployment: &str) -> Result<Option<PaymentProcessor>> {
        self.read(CF_PROCESSORS, deployment.as_bytes())
    }
}

#[async_trait]
impl TokenLedger for RocksDBStore {
    async fn account(&self, address: &TokenAccountAddress) -> Result<Option<TokenAccount>> {
        self.read(CF_TOKEN_ACCOUNTS, address.as_bytes())
    }

    async fn mint_to(&self, owner: Identity, mint: Mint, amount: u64) -> Result<TokenAccount> {
        let _guard = self.write_gate.lock().await;
        let address = TokenAccountAddress::associated(&owner, &mint);
        let mut account = self
            .read::<TokenAccount>(CF_TOKEN_ACCOUNTS, address.as_bytes())?
            .unwrap_or_else(|| TokenAccount::new(owner, mint));
        account.amount = account
            .amount
            .checked_add(amount)
            .ok_or_else(|| PaymentError::TransferFailed("amount overflow".to_string()))?;
        self.write(CF_TOKEN_ACCOUNTS, address.as_bytes(), &account)?;
        Ok(account)
    }

    async fn transfer(&self, intent: &ValidatedIntent) -> Result<()> {
        let _guard = self.write_gate.lock().await;
        let source: Option<TokenAccount> = self.read(CF_TOKEN_ACCOUNTS, intent.from.as_bytes())?;
        let destination: Option<TokenAccount> =
            self.read(CF_TOKEN_ACCOUNTS, intent.to.as_bytes())?;
        let (debited, credited) = plan_transfer(source.as_ref(), destination.as_ref(), intent)?;

        let (Some(mut source), Some(mut destination)) = (source, destination) else {
            return Ok(());
        };
        source.amount = debited;
        destination.amount = credited;

        let cf = self.cf(CF_TOKEN_ACCOUNTS)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(cf, intent.from.as_bytes(), serde_json::to_vec(&source)?);
        if intent.from != intent.to {
            batch.put_cf(cf, intent.to.as_bytes(), serde_json::to_vec(&destination)?);
        }
        self.db.write(batch)?;
        Ok(())
    }

    async fn set_frozen(&self, address: &TokenAccountAddress, frozen: bool) -> Result<()> {
        let _guard = self.write_gate.lock().await;
        let mut account: TokenAccount = self
            .read(CF_TOKEN_ACCOUNTS, address.as_bytes())?
            .ok_or_else(|| PaymentError::AccountNotFound(address.to_string()))?;
        account.frozen = frozen;
        self.write(CF_TOKEN_ACCOUNTS, address.as_bytes(), &account)
    }

    async fn all_accounts(&self) -> Result<Vec<TokenAccount>> {
        let cf = self.cf(CF_TOKEN_ACCOUNTS)?;
        let mut accounts = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            accounts.push(serde_json::from_slice::<TokenAccount>(&value)?);
        }
        accounts.sort_by(|a, b| a.owner.cmp(&b.owner).then(a.mint.cmp(&b.mint)));
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::KEY_LENGTH;
    use tempfile::tempdir;

    const OWNER: Identity = Identity::new([1; KEY_LENGTH]);
    const RECEIVER: Identity = Identity::new([2; KEY_LENGTH]);
    const PAYER: Identity = Identity::new([3; KEY_LENGTH]);
    const MINT: Mint = Mint::new([10; KEY_LENGTH]);

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_PROCESSORS).is_some());
        assert!(store.db.cf_handle(CF_TOKEN_ACCOUNTS).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_processor_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let processor = PaymentProcessor::create(OWNER, RECEIVER, MINT);

        assert!(store.insert_if_absent("pp", processor.clone()).await.unwrap());
        assert!(
            !store
                .insert_if_absent("pp", PaymentProcessor::create(PAYER, PAYER, MINT))
                .await
                .unwrap()
        );

        let retrieved = ProcessorStore::get(&store, "pp").await.unwrap().unwrap();
        assert_eq!(retrieved, processor);
        assert!(ProcessorStore::get(&store, "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_ledger_transfer() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        store.mint_to(PAYER, MINT, 1_000).await.unwrap();
        store.mint_to(RECEIVER, MINT, 0).await.unwrap();

        let intent = ValidatedIntent {
            from: TokenAccountAddress::associated(&PAYER, &MINT),
            to: TokenAccountAddress::associated(&RECEIVER, &MINT),
            authority: PAYER,
            mint: MINT,
            amount: 400,
        };
        store.transfer(&intent).await.unwrap();
        assert!(store.transfer(&ValidatedIntent { amount: 601, ..intent }).await.is_err());

        let payer = store.account(&intent.from).await.unwrap().unwrap();
        let receiver = store.account(&intent.to).await.unwrap().unwrap();
        assert_eq!(payer.amount, 600);
        assert_eq!(receiver.amount, 400);
        assert_eq!(store.all_accounts().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rocksdb_reopen_keeps_state() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            store
                .store("pp", PaymentProcessor::create(OWNER, RECEIVER, MINT))
                .await
                .unwrap();
        }
        let store = RocksDBStore::open(dir.path()).unwrap();
        assert!(ProcessorStore::get(&store, "pp").await.unwrap().is_some());
    }
}
