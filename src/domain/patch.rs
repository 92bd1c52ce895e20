use super::mortgage::{
    Currency, MortgageNumber, MortgageRecord, Stage, ensure_non_negative, optional_date,
    optional_string_or_number,
};
use crate::error::{MortgageError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

/// A caller-submitted amendment to one mortgage.
///
/// Lists exactly the fields an amendment may set. Derived fields (ownership,
/// grading, balance, conformance) and the identifier itself are never taken
/// from the caller; `mortgageNumber` only addresses the record.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct MortgagePatch {
    #[serde(rename = "mortgageNumber")]
    pub mortgage_number: MortgageNumber,
    #[serde(rename = "customerName")]
    pub customer_name: Option<String>,
    #[serde(rename = "customerAddress")]
    pub customer_address: Option<String>,
    #[serde(rename = "customerSSN", deserialize_with = "optional_string_or_number")]
    pub customer_ssn: Option<String>,
    #[serde(rename = "customerDOB", with = "optional_date")]
    pub customer_dob: Option<NaiveDate>,
    #[serde(rename = "mortgageStage")]
    pub stage: Option<Stage>,
    #[serde(rename = "mortagePropertyAddress")]
    pub property_address: Option<String>,
    #[serde(rename = "reqLoanAmount")]
    pub requested_loan_amount: Option<Currency>,
    #[serde(rename = "grantedLoanAmount")]
    pub granted_loan_amount: Option<Currency>,
    #[serde(rename = "mortgageType")]
    pub mortgage_type: Option<String>,
    #[serde(rename = "rateofInterest", with = "rust_decimal::serde::float_option")]
    pub rate_of_interest: Option<Decimal>,
    #[serde(rename = "mortgageStartDate", with = "optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "mortgageDuration")]
    pub duration_days: Option<i64>,
    #[serde(rename = "lastPaymentAmount")]
    pub last_payment_amount: Option<Currency>,
    #[serde(rename = "propertyValuation")]
    pub property_valuation: Option<Currency>,
    #[serde(rename = "creditScore")]
    pub credit_score: Option<i64>,
    #[serde(rename = "financialWorth")]
    pub financial_worth: Option<Currency>,
    #[serde(rename = "ownershipcost")]
    pub ownership_cost: Option<Currency>,
    #[serde(rename = "modifiedBy")]
    pub modified_by: Option<String>,
}

impl MortgagePatch {
    pub fn new(mortgage_number: MortgageNumber) -> Self {
        Self {
            mortgage_number,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.mortgage_number == 0 {
            return Err(MortgageError::Validation(
                "mortgageNumber is required".to_string(),
            ));
        }
        if self.rate_of_interest.is_some_and(|rate| rate.is_sign_negative()) {
            return Err(MortgageError::Validation(
                "rateofInterest must not be negative".to_string(),
            ));
        }
        let amounts = [
            ("reqLoanAmount", self.requested_loan_amount),
            ("grantedLoanAmount", self.granted_loan_amount),
            ("mortgageDuration", self.duration_days),
            ("lastPaymentAmount", self.last_payment_amount),
            ("propertyValuation", self.property_valuation),
            ("creditScore", self.credit_score),
            ("financialWorth", self.financial_worth),
            ("ownershipcost", self.ownership_cost),
        ];
        for (field, value) in amounts {
            if let Some(value) = value {
                ensure_non_negative(field, value)?;
            }
        }
        Ok(())
    }

    /// Overlays the patch onto a stored record.
    ///
    /// `ownershipcost` and `lastPaymentAmount` describe events of this
    /// amendment and never carry over: when absent they are zero.
    pub fn merge_onto(&self, stored: &MortgageRecord) -> MortgageRecord {
        let mut next = stored.clone();

        if let Some(value) = &self.customer_name {
            next.customer_name = value.clone();
        }
        if let Some(value) = &self.customer_address {
            next.customer_address = value.clone();
        }
        if let Some(value) = &self.customer_ssn {
            next.customer_ssn = value.clone();
        }
        if let Some(value) = self.customer_dob {
            next.customer_dob = Some(value);
        }
        if let Some(value) = self.stage {
            next.stage = value;
        }
        if let Some(value) = &self.property_address {
            next.property_address = value.clone();
        }
        if let Some(value) = self.requested_loan_amount {
            next.requested_loan_amount = value;
        }
        if let Some(value) = self.granted_loan_amount {
            next.granted_loan_amount = value;
        }
        if let Some(value) = &self.mortgage_type {
            next.mortgage_type = value.clone();
        }
        if let Some(value) = self.rate_of_interest {
            next.rate_of_interest = value;
        }
        if let Some(value) = self.start_date {
            next.start_date = Some(value);
        }
        if let Some(value) = self.duration_days {
            next.duration_days = value;
        }
        if let Some(value) = self.property_valuation {
            next.property_valuation = value;
        }
        if let Some(value) = self.credit_score {
            next.credit_score = value;
        }
        if let Some(value) = self.financial_worth {
            next.financial_worth = value;
        }
        if let Some(value) = &self.modified_by {
            next.modified_by = value.clone();
        }

        next.ownership_cost = self.ownership_cost.unwrap_or(0);
        next.last_payment_amount = self.last_payment_amount.unwrap_or(0);
        next
    }
}
