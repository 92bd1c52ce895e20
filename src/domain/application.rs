use super::mortgage::{
    Currency, MortgageNumber, MortgageRecord, Ownership, RiskClass, Stage, ensure_non_negative,
    optional_date, string_or_number,
};
use crate::error::{MortgageError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Intake payload for a new mortgage application.
///
/// Carries the customer and property details only. The identifier, stage and
/// ownership are assigned by intake, so any such fields in the payload are
/// ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MortgageApplication {
    #[serde(rename = "customerName")]
    pub customer_name: String,
    #[serde(rename = "customerAddress", default)]
    pub customer_address: String,
    #[serde(rename = "customerSSN", default, deserialize_with = "string_or_number")]
    pub customer_ssn: String,
    #[serde(rename = "customerDOB", default, with = "optional_date")]
    pub customer_dob: Option<NaiveDate>,
    #[serde(rename = "mortagePropertyAddress", default)]
    pub property_address: String,
    #[serde(rename = "reqLoanAmount")]
    pub requested_loan_amount: Currency,
    #[serde(rename = "mortgageType", default)]
    pub mortgage_type: String,
    #[serde(
        rename = "rateofInterest",
        default,
        with = "rust_decimal::serde::float"
    )]
    pub rate_of_interest: Decimal,
    #[serde(rename = "mortgageStartDate", default, with = "optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "mortgageDuration", default)]
    pub duration_days: i64,
    #[serde(rename = "propertyValuation", default)]
    pub property_valuation: Currency,
    #[serde(rename = "creditScore", default)]
    pub credit_score: i64,
    #[serde(rename = "financialWorth", default)]
    pub financial_worth: Currency,
    #[serde(rename = "modifiedBy", default)]
    pub modified_by: String,
}

impl MortgageApplication {
    pub fn validate(&self) -> Result<()> {
        if self.customer_name.trim().is_empty() {
            return Err(MortgageError::Validation(
                "customerName must not be empty".to_string(),
            ));
        }
        if self.requested_loan_amount <= 0 {
            return Err(MortgageError::Validation(
                "reqLoanAmount must be positive".to_string(),
            ));
        }
        if self.rate_of_interest.is_sign_negative() {
            return Err(MortgageError::Validation(
                "rateofInterest must not be negative".to_string(),
            ));
        }
        ensure_non_negative("mortgageDuration", self.duration_days)?;
        ensure_non_negative("propertyValuation", self.property_valuation)?;
        ensure_non_negative("creditScore", self.credit_score)?;
        ensure_non_negative("financialWorth", self.financial_worth)?;
        Ok(())
    }

    /// Builds the record born at intake: pending with the bank, not acquired,
    /// unrated and not conformed.
    pub fn into_record(self, mortgage_number: MortgageNumber) -> MortgageRecord {
        MortgageRecord {
            customer_name: self.customer_name,
            customer_address: self.customer_address,
            customer_ssn: self.customer_ssn,
            customer_dob: self.customer_dob,
            mortgage_number,
            stage: Stage::PendingBank,
            ownership: Ownership::NotAcquired,
            property_address: self.property_address,
            requested_loan_amount: self.requested_loan_amount,
            mortgage_type: self.mortgage_type,
            rate_of_interest: self.rate_of_interest,
            start_date: self.start_date,
            duration_days: self.duration_days,
            property_valuation: self.property_valuation,
            credit_score: self.credit_score,
            financial_worth: self.financial_worth,
            risk_classification: RiskClass::Unrated,
            remaining_mortgage_amount: self.requested_loan_amount,
            conformed: false,
            modified_by: self.modified_by,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> MortgageApplication {
        serde_json::from_str(json).expect("Failed to parse application")
    }

    #[test]
    fn test_assigned_fields_in_payload_are_ignored() {
        let application = parse(
            r#"{"customerName": "Ada", "reqLoanAmount": 500000,
                "mortgageNumber": 42, "mortgageStage": "APPROVED"}"#,
        );

        let record = application.into_record(1000001);
        assert_eq!(record.mortgage_number, 1000001);
        assert_eq!(record.stage, Stage::PendingBank);
        assert_eq!(record.ownership, Ownership::NotAcquired);
        assert!(!record.conformed);
        assert_eq!(record.remaining_mortgage_amount, 500000);
    }

    #[test]
    fn test_missing_required_fields_fail_to_parse() {
        assert!(serde_json::from_str::<MortgageApplication>(r#"{"customerName": "Ada"}"#).is_err());
        assert!(serde_json::from_str::<MortgageApplication>(r#"{"reqLoanAmount": 1}"#).is_err());
    }

    #[test]
    fn test_validation() {
        let valid = parse(r#"{"customerName": "Ada", "reqLoanAmount": 500000}"#);
        assert!(valid.validate().is_ok());

        let blank = parse(r#"{"customerName": "  ", "reqLoanAmount": 500000}"#);
        assert!(matches!(blank.validate(), Err(MortgageError::Validation(_))));

        let zero = parse(r#"{"customerName": "Ada", "reqLoanAmount": 0}"#);
        assert!(matches!(zero.validate(), Err(MortgageError::Validation(_))));

        let negative = parse(
            r#"{"customerName": "Ada", "reqLoanAmount": 1, "financialWorth": -5}"#,
        );
        assert!(matches!(
            negative.validate(),
            Err(MortgageError::Validation(_))
        ));
    }
}
