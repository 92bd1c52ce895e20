use crate::config::LedgerConfig;
use crate::domain::application::MortgageApplication;
use crate::domain::lifecycle;
use crate::domain::mortgage::{MortgageNumber, MortgageRecord, mortgage_key};
use crate::domain::patch::MortgagePatch;
use crate::domain::portfolio::{PORTFOLIO_KEY, PortfolioEntry, PortfolioIndex};
use crate::domain::ports::{LedgerStoreBox, WriteBatch};
use crate::error::{MortgageError, Result};
use crate::infrastructure::codec;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of a reconciliation pass over the portfolio index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    /// Index rows dropped because their record no longer exists.
    pub removed: Vec<MortgageNumber>,
    /// Index rows whose summary columns were refreshed from their record.
    pub refreshed: Vec<MortgageNumber>,
    /// Records found past the last indexed identifier and added to the index.
    pub adopted: Vec<MortgageNumber>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.removed.is_empty() && self.refreshed.is_empty() && self.adopted.is_empty()
    }
}

/// Tracks mortgage applications on a key-value ledger.
///
/// Every write commits the touched record and the portfolio index as one
/// batch, guarded on the index bytes and the record bytes read when the
/// invocation started (intake guards on the record key being absent). A
/// concurrent writer therefore makes the whole invocation fail with a
/// conflict, and it is re-run from a fresh read up to
/// `LedgerConfig::max_commit_retries` times.
pub struct MortgageLedger {
    store: LedgerStoreBox,
    config: LedgerConfig,
}

impl MortgageLedger {
    /// Creates a new `MortgageLedger` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - The ledger holding the records and the portfolio index.
    /// * `config` - Service settings.
    pub fn new(store: LedgerStoreBox, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Creates an empty portfolio index if none exists yet.
    ///
    /// An existing index is left untouched: resetting it would orphan the
    /// records it lists and hand their identifiers out again.
    pub async fn init(&self) -> Result<()> {
        let batch = WriteBatch::new()
            .expect(PORTFOLIO_KEY, None)
            .put(PORTFOLIO_KEY, codec::encode(&PortfolioIndex::new())?);

        match self.store.commit(batch).await {
            Ok(()) => {
                info!("portfolio index initialized");
                Ok(())
            }
            Err(MortgageError::Conflict { .. }) => {
                debug!("portfolio index already initialized");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Registers a new application and returns its identifier.
    pub async fn create_application(
        &self,
        application: MortgageApplication,
    ) -> Result<MortgageNumber> {
        application.validate()?;
        self.with_retries("createApplication", || self.try_create(&application))
            .await
    }

    /// An index that cannot be decoded is reported as a storage failure
    /// here, since intake cannot assign an identifier without it. Queries
    /// report the same condition as a serialization failure.
    async fn try_create(&self, application: &MortgageApplication) -> Result<MortgageNumber> {
        let (mut portfolio, snapshot) = self.load_portfolio().await.map_err(|e| match e {
            MortgageError::Serialization(message) => MortgageError::Storage(message),
            other => other,
        })?;
        let number = portfolio.next_mortgage_number();
        let record = application.clone().into_record(number);
        portfolio.append(number, PortfolioEntry::from(&record))?;

        self.commit(snapshot, None, &record, &portfolio).await?;
        info!(
            mortgage_number = number,
            customer = %record.customer_name,
            "mortgage application created"
        );
        Ok(number)
    }

    /// Applies an amendment and returns the updated record.
    pub async fn amend_mortgage(&self, patch: MortgagePatch) -> Result<MortgageRecord> {
        patch.validate()?;
        self.with_retries("amendMortgage", || self.try_amend(&patch))
            .await
    }

    async fn try_amend(&self, patch: &MortgagePatch) -> Result<MortgageRecord> {
        let number = patch.mortgage_number;
        let (mut portfolio, snapshot) = self.load_portfolio().await?;
        if !portfolio.contains(number) {
            return Err(MortgageError::NotFound(format!(
                "Mortgage {} has no portfolio index entry",
                number
            )));
        }
        let (stored, stored_bytes) = self.load_mortgage_bytes(number).await?;

        let transition = lifecycle::apply(&stored, patch)?;
        portfolio.update(number, transition.entry)?;

        self.commit(snapshot, Some(stored_bytes), &transition.record, &portfolio)
            .await?;
        info!(
            mortgage_number = number,
            stage = %transition.record.stage,
            ownership = %transition.record.ownership,
            remaining = transition.record.remaining_mortgage_amount,
            "mortgage amended"
        );
        Ok(transition.record)
    }

    pub async fn get_mortgage(&self, number: MortgageNumber) -> Result<MortgageRecord> {
        self.load_mortgage(number).await
    }

    pub async fn get_portfolio(&self) -> Result<PortfolioIndex> {
        Ok(self.load_portfolio().await?.0)
    }

    /// Every record in index order. Fails as a whole if any record is
    /// missing or unreadable.
    pub async fn get_all_mortgages(&self) -> Result<Vec<MortgageRecord>> {
        let (portfolio, _) = self.load_portfolio().await?;
        let mut records = Vec::with_capacity(portfolio.len());
        for number in portfolio.numbers() {
            records.push(self.load_mortgage(number).await?);
        }
        Ok(records)
    }

    /// Raw bytes stored under `key`.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>> {
        self.store
            .get(key)
            .await?
            .ok_or_else(|| MortgageError::NotFound(format!("No ledger entry for key '{}'", key)))
    }

    /// Repairs divergence between the index and the records on the ledger.
    ///
    /// Drops rows whose record is gone, refreshes stale summary columns and
    /// adopts records stored under the identifiers following the last one
    /// issued, which intake would otherwise refuse to reuse.
    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        self.with_retries("reconcile", || self.try_reconcile())
            .await
    }

    async fn try_reconcile(&self) -> Result<ReconcileReport> {
        let (mut portfolio, snapshot) = self.load_portfolio().await?;
        let mut report = ReconcileReport::default();

        let numbers: Vec<MortgageNumber> = portfolio.numbers().collect();
        for number in numbers {
            let key = mortgage_key(number);
            match self.store.get(&key).await? {
                None => {
                    portfolio.remove(number);
                    report.removed.push(number);
                }
                Some(bytes) => {
                    let record: MortgageRecord = codec::decode_stored(&key, &bytes)?;
                    let entry = PortfolioEntry::from(&record);
                    if portfolio.get(number) != Some(&entry) {
                        portfolio.update(number, entry)?;
                        report.refreshed.push(number);
                    }
                }
            }
        }

        loop {
            let number = portfolio.next_mortgage_number();
            let key = mortgage_key(number);
            let Some(bytes) = self.store.get(&key).await? else {
                break;
            };
            let record: MortgageRecord = codec::decode_stored(&key, &bytes)?;
            if record.mortgage_number != number {
                return Err(MortgageError::Serialization(format!(
                    "Record stored under key '{}' carries mortgage number {}",
                    key, record.mortgage_number
                )));
            }
            portfolio.append(number, PortfolioEntry::from(&record))?;
            report.adopted.push(number);
        }

        if report.is_clean() {
            debug!("portfolio index consistent with records");
            return Ok(report);
        }

        let batch = WriteBatch::new()
            .expect(PORTFOLIO_KEY, Some(snapshot))
            .put(PORTFOLIO_KEY, codec::encode(&portfolio)?);
        self.store.commit(batch).await?;
        warn!(
            removed = ?report.removed,
            refreshed = ?report.refreshed,
            adopted = ?report.adopted,
            "portfolio index repaired"
        );
        Ok(report)
    }

    /// Decoded index plus the exact bytes it was read from.
    async fn load_portfolio(&self) -> Result<(PortfolioIndex, Vec<u8>)> {
        let bytes = self.store.get(PORTFOLIO_KEY).await?.ok_or_else(|| {
            MortgageError::Storage("Portfolio index not initialized; run init first".to_string())
        })?;
        let portfolio = codec::decode_stored(PORTFOLIO_KEY, &bytes)?;
        Ok((portfolio, bytes))
    }

    async fn load_mortgage(&self, number: MortgageNumber) -> Result<MortgageRecord> {
        Ok(self.load_mortgage_bytes(number).await?.0)
    }

    /// Decoded record plus the exact bytes it was read from.
    async fn load_mortgage_bytes(&self, number: MortgageNumber) -> Result<(MortgageRecord, Vec<u8>)> {
        let key = mortgage_key(number);
        debug!(mortgage_number = number, "reading mortgage");
        let bytes = self
            .store
            .get(&key)
            .await?
            .ok_or_else(|| MortgageError::NotFound(format!("Mortgage {} does not exist", number)))?;
        let record = codec::decode_stored(&key, &bytes)?;
        Ok((record, bytes))
    }

    /// Writes `record` and `portfolio` together. `stored` is the record's
    /// previous bytes, or `None` when its key must still be unused.
    async fn commit(
        &self,
        snapshot: Vec<u8>,
        stored: Option<Vec<u8>>,
        record: &MortgageRecord,
        portfolio: &PortfolioIndex,
    ) -> Result<()> {
        let key = mortgage_key(record.mortgage_number);
        let batch = WriteBatch::new()
            .expect(PORTFOLIO_KEY, Some(snapshot))
            .expect(key.clone(), stored)
            .put(key, codec::encode(record)?)
            .put(PORTFOLIO_KEY, codec::encode(portfolio)?);
        self.store.commit(batch).await
    }

    async fn with_retries<T, F, Fut>(&self, operation: &'static str, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retries = 0;
        loop {
            match attempt().await {
                Err(MortgageError::Conflict { key }) if retries < self.config.max_commit_retries => {
                    retries += 1;
                    warn!(operation, %key, retries, "write conflict, retrying");
                }
                other => return other,
            }
        }
    }
}
