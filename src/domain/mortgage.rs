use crate::error::MortgageError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier assigned to a mortgage at intake.
pub type MortgageNumber = u64;

/// Whole currency units.
pub type Currency = i64;

/// Returns the ledger key under which a mortgage record is stored.
pub fn mortgage_key(number: MortgageNumber) -> String {
    number.to_string()
}

/// Upper-cases a raw label and folds the `:`, `-` and space separators into `_`.
fn canonicalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ':' | '-' | ' ' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Lifecycle stage of a mortgage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Stage {
    #[default]
    PendingBank,
    Approved,
    Disbursed,
    DisbursedReadyToPurchase,
    DisbursedReadyToSell,
    DisbursedSold,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::PendingBank,
        Stage::Approved,
        Stage::Disbursed,
        Stage::DisbursedReadyToPurchase,
        Stage::DisbursedReadyToSell,
        Stage::DisbursedSold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::PendingBank => "PENDING_BANK",
            Stage::Approved => "APPROVED",
            Stage::Disbursed => "DISBURSED",
            Stage::DisbursedReadyToPurchase => "DISBURSED_READY_TO_PURCHASE",
            Stage::DisbursedReadyToSell => "DISBURSED_READY_TO_SELL",
            Stage::DisbursedSold => "DISBURSED_SOLD",
        }
    }

    /// True for every stage whose canonical form begins with `DISBURSED`.
    pub fn is_disbursed(&self) -> bool {
        self.as_str().starts_with("DISBURSED")
    }

    /// True for the qualified disbursed stages (`DISBURSED:<qualifier>`),
    /// excluding the bare `DISBURSED` stage.
    pub fn is_disbursed_substage(&self) -> bool {
        matches!(
            self,
            Stage::DisbursedReadyToPurchase | Stage::DisbursedReadyToSell | Stage::DisbursedSold
        )
    }

    /// Stages at which a purchase cost completes the sale of the mortgage.
    pub fn is_awaiting_buyer(&self) -> bool {
        matches!(
            self,
            Stage::DisbursedReadyToPurchase | Stage::DisbursedReadyToSell
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = MortgageError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let canonical = canonicalize(raw);
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == canonical)
            .ok_or_else(|| MortgageError::Validation(format!("Unknown mortgage stage '{}'", raw)))
    }
}

impl TryFrom<String> for Stage {
    type Error = MortgageError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        stage.as_str().to_string()
    }
}

/// Party currently holding title to the mortgaged property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ownership {
    #[default]
    NotAcquired,
    LendingBank,
    Gse,
    PartnerBank,
    Customer,
}

impl Ownership {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ownership::NotAcquired => "NOT_ACQUIRED",
            Ownership::LendingBank => "LENDING_BANK",
            Ownership::Gse => "GSE",
            Ownership::PartnerBank => "PARTNER_BANK",
            Ownership::Customer => "CUSTOMER",
        }
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ownership {
    type Err = MortgageError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonicalize(raw).as_str() {
            "NOT_ACQUIRED" => Ok(Ownership::NotAcquired),
            "LENDING_BANK" | "LENDOR" => Ok(Ownership::LendingBank),
            "GSE" => Ok(Ownership::Gse),
            "PARTNER_BANK" => Ok(Ownership::PartnerBank),
            "CUSTOMER" => Ok(Ownership::Customer),
            _ => Err(MortgageError::Validation(format!(
                "Unknown property ownership '{}'",
                raw
            ))),
        }
    }
}

impl TryFrom<String> for Ownership {
    type Error = MortgageError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Ownership> for String {
    fn from(ownership: Ownership) -> Self {
        ownership.as_str().to_string()
    }
}

/// Risk grade derived from collateral, net worth and credit score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RiskClass {
    A,
    B,
    C,
    D,
    #[default]
    Unrated,
}

impl RiskClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskClass::A => "A",
            RiskClass::B => "B",
            RiskClass::C => "C",
            RiskClass::D => "D",
            RiskClass::Unrated => "unrated",
        }
    }

    /// Factor applied to the nominal rate to obtain the risk-adjusted return.
    pub fn return_multiplier(&self) -> Decimal {
        match self {
            RiskClass::A => Decimal::ONE,
            RiskClass::B => dec!(0.75),
            RiskClass::C => dec!(0.5),
            RiskClass::D => dec!(0.25),
            RiskClass::Unrated => Decimal::ZERO,
        }
    }

    /// Grades eligible for a conformed mortgage.
    pub fn is_conformable(&self) -> bool {
        matches!(self, RiskClass::A | RiskClass::B | RiskClass::C)
    }
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskClass {
    type Err = MortgageError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(RiskClass::A),
            "B" => Ok(RiskClass::B),
            "C" => Ok(RiskClass::C),
            "D" => Ok(RiskClass::D),
            "" | "UNRATED" => Ok(RiskClass::Unrated),
            _ => Err(MortgageError::Validation(format!(
                "Unknown risk classification '{}'",
                raw
            ))),
        }
    }
}

impl TryFrom<String> for RiskClass {
    type Error = MortgageError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<RiskClass> for String {
    fn from(class: RiskClass) -> Self {
        class.as_str().to_string()
    }
}

/// The persisted state of one mortgage application.
///
/// Field labels match the documents already stored on the ledger, including
/// their irregular spellings, so existing records keep decoding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MortgageRecord {
    #[serde(rename = "customerName")]
    pub customer_name: String,
    #[serde(rename = "customerAddress")]
    pub customer_address: String,
    #[serde(rename = "customerSSN", deserialize_with = "string_or_number")]
    pub customer_ssn: String,
    #[serde(rename = "customerDOB", with = "optional_date")]
    pub customer_dob: Option<NaiveDate>,
    #[serde(rename = "mortgageNumber")]
    pub mortgage_number: MortgageNumber,
    #[serde(rename = "mortgageStage")]
    pub stage: Stage,
    #[serde(rename = "MortgagePropertyOwnership")]
    pub ownership: Ownership,
    #[serde(rename = "mortagePropertyAddress")]
    pub property_address: String,
    #[serde(rename = "reqLoanAmount")]
    pub requested_loan_amount: Currency,
    #[serde(rename = "grantedLoanAmount")]
    pub granted_loan_amount: Currency,
    #[serde(rename = "mortgageType")]
    pub mortgage_type: String,
    #[serde(rename = "rateofInterest", with = "rust_decimal::serde::float")]
    pub rate_of_interest: Decimal,
    #[serde(rename = "mortgageStartDate", with = "optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "mortgageDuration")]
    pub duration_days: i64,
    #[serde(rename = "lastPaymentAmount")]
    pub last_payment_amount: Currency,
    #[serde(rename = "propertyValuation")]
    pub property_valuation: Currency,
    #[serde(rename = "creditScore")]
    pub credit_score: i64,
    #[serde(rename = "financialWorth")]
    pub financial_worth: Currency,
    #[serde(rename = "riskClassification")]
    pub risk_classification: RiskClass,
    #[serde(rename = "riskAdjustedReturn", with = "rust_decimal::serde::float")]
    pub risk_adjusted_return: Decimal,
    #[serde(rename = "expectedAnnualCashflow")]
    pub expected_annual_cashflow: Currency,
    #[serde(rename = "remainingMortgageAmount")]
    pub remaining_mortgage_amount: Currency,
    #[serde(rename = "ownershipcost")]
    pub ownership_cost: Currency,
    #[serde(rename = "conformedMortgage")]
    pub conformed: bool,
    #[serde(rename = "modifiedBy")]
    pub modified_by: String,
}

/// Rejects negative values for fields that only make sense as magnitudes.
pub(crate) fn ensure_non_negative(field: &str, value: i64) -> Result<(), MortgageError> {
    if value < 0 {
        Err(MortgageError::Validation(format!(
            "{} must not be negative",
            field
        )))
    } else {
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

impl From<TextOrNumber> for String {
    fn from(raw: TextOrNumber) -> Self {
        match raw {
            TextOrNumber::Text(text) => text,
            TextOrNumber::Number(number) => number.to_string(),
        }
    }
}

/// Accepts an identifier stored either as a JSON string or a JSON number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(TextOrNumber::deserialize(deserializer)?.into())
}

/// [`string_or_number`] for fields that may be absent or `null`.
pub(crate) fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TextOrNumber>::deserialize(deserializer)?.map(String::from))
}

/// ISO dates where an empty string or `null` means "not set".
pub(crate) mod optional_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.collect_str(&date.format("%Y-%m-%d")),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
