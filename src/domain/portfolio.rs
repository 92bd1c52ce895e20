use super::mortgage::{MortgageNumber, MortgageRecord, Ownership, Stage};
use crate::error::{MortgageError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ledger key of the singleton portfolio index.
pub const PORTFOLIO_KEY: &str = "mortgages";

/// Identifier handed to the first application on an empty portfolio.
pub const FIRST_MORTGAGE_NUMBER: MortgageNumber = 1_000_001;

/// Placeholder row older deployments seeded the index with.
const LEGACY_SENTINEL: MortgageNumber = 1_000_000;

/// Summary columns denormalized from a record into the index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortfolioEntry {
    pub customer_name: String,
    pub stage: Stage,
    pub conformed: bool,
    pub ownership: Ownership,
}

impl From<&MortgageRecord> for PortfolioEntry {
    fn from(record: &MortgageRecord) -> Self {
        Self {
            customer_name: record.customer_name.clone(),
            stage: record.stage,
            conformed: record.conformed,
            ownership: record.ownership,
        }
    }
}

/// Enumerates every mortgage on the ledger with its summary columns.
///
/// Identifiers only ever grow, so key order is also insertion order. The
/// highest identifier ever issued is kept separately: removing a row never
/// makes its identifier available again.
/// On the ledger it is stored as one document of parallel sequences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "PortfolioDocument", into = "PortfolioDocument")]
pub struct PortfolioIndex {
    entries: BTreeMap<MortgageNumber, PortfolioEntry>,
    last_issued: Option<MortgageNumber>,
}

impl PortfolioIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, number: MortgageNumber) -> bool {
        self.entries.contains_key(&number)
    }

    pub fn get(&self, number: MortgageNumber) -> Option<&PortfolioEntry> {
        self.entries.get(&number)
    }

    /// Identifiers in index order.
    pub fn numbers(&self) -> impl Iterator<Item = MortgageNumber> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MortgageNumber, &PortfolioEntry)> {
        self.entries.iter().map(|(number, entry)| (*number, entry))
    }

    /// One above the highest identifier ever issued, or
    /// [`FIRST_MORTGAGE_NUMBER`] for a fresh index.
    pub fn next_mortgage_number(&self) -> MortgageNumber {
        let highest = self.entries.last_key_value().map(|(number, _)| *number);
        highest
            .max(self.last_issued)
            .map(|number| number + 1)
            .unwrap_or(FIRST_MORTGAGE_NUMBER)
    }

    /// Appends a new row. Identifiers must be strictly increasing.
    pub fn append(&mut self, number: MortgageNumber, entry: PortfolioEntry) -> Result<()> {
        if number < self.next_mortgage_number() {
            return Err(MortgageError::Validation(format!(
                "Mortgage number {} is not above every indexed number",
                number
            )));
        }
        self.entries.insert(number, entry);
        self.last_issued = Some(number);
        Ok(())
    }

    /// Overwrites the summary row of an indexed mortgage.
    pub fn update(&mut self, number: MortgageNumber, entry: PortfolioEntry) -> Result<()> {
        match self.entries.get_mut(&number) {
            Some(row) => {
                *row = entry;
                Ok(())
            }
            None => Err(MortgageError::NotFound(format!(
                "Mortgage {} has no portfolio index entry",
                number
            ))),
        }
    }

    pub fn remove(&mut self, number: MortgageNumber) -> Option<PortfolioEntry> {
        self.entries.remove(&number)
    }
}

/// Wire shape of the index: aligned sequences, one position per mortgage.
///
/// Documents written before the summary columns existed carry only the
/// identifiers and customer names; missing columns decode as defaults.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortfolioDocument {
    mortgage_numbers: Vec<MortgageNumber>,
    customer_names: Vec<String>,
    #[serde(default)]
    mortgage_stages: Option<Vec<Stage>>,
    #[serde(default)]
    conformed_mortgages: Option<Vec<bool>>,
    #[serde(default)]
    property_ownerships: Option<Vec<Ownership>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_mortgage_number: Option<MortgageNumber>,
}

fn column_or_default<T: Default + Clone>(
    name: &str,
    column: Option<Vec<T>>,
    len: usize,
) -> Result<Vec<T>> {
    match column {
        Some(values) if values.len() != len => Err(MortgageError::Serialization(format!(
            "Portfolio column '{}' has {} entries, expected {}",
            name,
            values.len(),
            len
        ))),
        Some(values) => Ok(values),
        None => Ok(vec![T::default(); len]),
    }
}

impl TryFrom<PortfolioDocument> for PortfolioIndex {
    type Error = MortgageError;

    fn try_from(doc: PortfolioDocument) -> Result<Self> {
        let len = doc.mortgage_numbers.len();
        let names = column_or_default("customerNames", Some(doc.customer_names), len)?;
        let stages = column_or_default("mortgageStages", doc.mortgage_stages, len)?;
        let conformed = column_or_default("conformedMortgages", doc.conformed_mortgages, len)?;
        let ownerships = column_or_default("propertyOwnerships", doc.property_ownerships, len)?;

        let mut entries = BTreeMap::new();
        let rows = doc
            .mortgage_numbers
            .into_iter()
            .zip(names)
            .zip(stages)
            .zip(conformed)
            .zip(ownerships);
        for ((((number, customer_name), stage), conformed), ownership) in rows {
            if number == LEGACY_SENTINEL && customer_name.is_empty() {
                continue;
            }
            let entry = PortfolioEntry {
                customer_name,
                stage,
                conformed,
                ownership,
            };
            if entries.insert(number, entry).is_some() {
                return Err(MortgageError::Serialization(format!(
                    "Mortgage number {} is indexed twice",
                    number
                )));
            }
        }
        let highest = entries.last_key_value().map(|(number, _)| *number);
        Ok(Self {
            entries,
            last_issued: highest.max(doc.last_mortgage_number),
        })
    }
}

impl From<PortfolioIndex> for PortfolioDocument {
    fn from(index: PortfolioIndex) -> Self {
        let len = index.entries.len();
        let mut numbers = Vec::with_capacity(len);
        let mut names = Vec::with_capacity(len);
        let mut stages = Vec::with_capacity(len);
        let mut conformed = Vec::with_capacity(len);
        let mut ownerships = Vec::with_capacity(len);
        for (number, entry) in index.entries {
            numbers.push(number);
            names.push(entry.customer_name);
            stages.push(entry.stage);
            conformed.push(entry.conformed);
            ownerships.push(entry.ownership);
        }
        PortfolioDocument {
            mortgage_numbers: numbers,
            customer_names: names,
            mortgage_stages: Some(stages),
            conformed_mortgages: Some(conformed),
            property_ownerships: Some(ownerships),
            last_mortgage_number: index.last_issued,
        }
    }
}
