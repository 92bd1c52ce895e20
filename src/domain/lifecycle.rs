//! Lifecycle transitions for an amended mortgage.
//!
//! [`apply`] is a pure function of the stored record and the caller's patch:
//! it decides the next stage, hands ownership over, amortizes the balance,
//! grades risk and determines conformance. Reading and writing the ledger is
//! left to the caller.

use super::mortgage::{Currency, MortgageRecord, Ownership, Stage};
use super::patch::MortgagePatch;
use super::portfolio::PortfolioEntry;
use super::risk;
use crate::error::{MortgageError, Result};

/// Highest remaining balance a conformed mortgage may carry.
pub const CONFORMING_LOAN_LIMIT: Currency = 424_100;

/// The next state of an amended mortgage and its index row.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub record: MortgageRecord,
    pub entry: PortfolioEntry,
    /// Set when this amendment moved the mortgage from approved to disbursed.
    pub just_disbursed: bool,
}

/// Derives the next state of `stored` after applying `patch`.
pub fn apply(stored: &MortgageRecord, patch: &MortgagePatch) -> Result<Transition> {
    if patch.mortgage_number != stored.mortgage_number {
        return Err(MortgageError::Validation(format!(
            "Amendment for mortgage {} cannot be applied to mortgage {}",
            patch.mortgage_number, stored.mortgage_number
        )));
    }
    patch.validate()?;

    let mut next = patch.merge_onto(stored);
    let requested_stage = next.stage;
    let cost = next.ownership_cost;

    let just_disbursed = stored.stage == Stage::Approved && cost > 0;
    if just_disbursed {
        next.granted_loan_amount = cost;
        next.stage = Stage::Disbursed;
    } else if stored.stage.is_awaiting_buyer() && cost > 0 {
        next.stage = Stage::DisbursedSold;
    }

    next.ownership = next_ownership(&next, requested_stage, just_disbursed);
    next.remaining_mortgage_amount = next_remaining(stored, &next, just_disbursed);
    if next.remaining_mortgage_amount <= 0 {
        next.ownership = Ownership::Customer;
    }

    let assessment = risk::assess(&next);
    next.risk_classification = assessment.classification;
    next.risk_adjusted_return = assessment.risk_adjusted_return;
    next.expected_annual_cashflow =
        risk::expected_annual_cashflow(next.remaining_mortgage_amount, next.duration_days);
    next.conformed = is_conformed(&next);

    let entry = PortfolioEntry::from(&next);
    Ok(Transition {
        record: next,
        entry,
        just_disbursed,
    })
}

/// Buyers are identified by the stage the mortgage was offered at, before a
/// completed purchase moves it on to sold.
fn next_ownership(next: &MortgageRecord, offered_at: Stage, just_disbursed: bool) -> Ownership {
    let cost = next.ownership_cost;
    if just_disbursed {
        Ownership::LendingBank
    } else if offered_at == Stage::DisbursedReadyToPurchase && cost > 0 {
        Ownership::Gse
    } else if offered_at == Stage::DisbursedReadyToSell && cost > 0 {
        Ownership::PartnerBank
    } else if !next.stage.is_disbursed() {
        Ownership::NotAcquired
    } else {
        next.ownership
    }
}

fn next_remaining(stored: &MortgageRecord, next: &MortgageRecord, just_disbursed: bool) -> Currency {
    if !next.stage.is_disbursed() {
        if next.granted_loan_amount > 0 {
            next.granted_loan_amount
        } else {
            next.requested_loan_amount
        }
    } else if just_disbursed {
        next.granted_loan_amount
    } else {
        let after_payment = stored.remaining_mortgage_amount - next.last_payment_amount;
        after_payment.max(0)
    }
}

/// Eligible grade, balance within the conforming limit, and a qualified
/// disbursed stage.
pub fn is_conformed(record: &MortgageRecord) -> bool {
    record.risk_classification.is_conformable()
        && record.remaining_mortgage_amount <= CONFORMING_LOAN_LIMIT
        && record.stage.is_disbursed_substage()
}
