//! Risk grading and cash-flow projection.
//!
//! All arithmetic is truncating integer arithmetic in the order written;
//! observable grades depend on where the truncation happens.

use super::mortgage::{Currency, MortgageRecord, RiskClass};
use rust_decimal::Decimal;

/// Result of grading one mortgage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub classification: RiskClass,
    pub risk_adjusted_return: Decimal,
}

impl RiskAssessment {
    pub const UNRATED: Self = Self {
        classification: RiskClass::Unrated,
        risk_adjusted_return: Decimal::ZERO,
    };
}

fn bucket(score: i128) -> u32 {
    if score > 75 {
        100
    } else if score > 50 {
        75
    } else if score > 25 {
        50
    } else {
        25
    }
}

/// Buckets `value` as a percentage of the outstanding balance.
pub fn coverage_ratio(value: Currency, remaining: Currency) -> u32 {
    bucket(i128::from(value) * 100 / i128::from(remaining))
}

pub fn credit_ratio(credit_score: i64) -> u32 {
    if credit_score > 700 {
        100
    } else if credit_score > 500 {
        75
    } else if credit_score > 250 {
        50
    } else {
        25
    }
}

pub fn classify(composite: u32) -> RiskClass {
    if composite > 75 {
        RiskClass::A
    } else if composite > 50 {
        RiskClass::B
    } else if composite > 25 {
        RiskClass::C
    } else {
        RiskClass::D
    }
}

/// Grades a record from its remaining balance, valuation, worth and credit
/// score. Any of those at or below zero leaves the mortgage unrated.
pub fn assess(record: &MortgageRecord) -> RiskAssessment {
    let remaining = record.remaining_mortgage_amount;
    if remaining <= 0
        || record.financial_worth <= 0
        || record.credit_score <= 0
        || record.property_valuation <= 0
    {
        return RiskAssessment::UNRATED;
    }

    let collateral = coverage_ratio(record.property_valuation, remaining);
    let worth = coverage_ratio(record.financial_worth, remaining);
    let credit = credit_ratio(record.credit_score);
    let classification = classify((collateral + worth + credit) / 3);

    RiskAssessment {
        classification,
        risk_adjusted_return: record.rate_of_interest * classification.return_multiplier(),
    }
}

/// Projects one year of repayments for terms longer than a year; shorter
/// terms are expected to repay the whole balance.
pub fn expected_annual_cashflow(remaining: Currency, duration_days: i64) -> Currency {
    if duration_days > 365 {
        (remaining / duration_days) * 365
    } else {
        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn graded(remaining: i64, valuation: i64, worth: i64, credit: i64) -> MortgageRecord {
        MortgageRecord {
            remaining_mortgage_amount: remaining,
            property_valuation: valuation,
            financial_worth: worth,
            credit_score: credit,
            rate_of_interest: dec!(0.06),
            ..Default::default()
        }
    }

    #[test]
    fn test_bucket_thresholds_are_exclusive() {
        assert_eq!(coverage_ratio(76, 100), 100);
        assert_eq!(coverage_ratio(75, 100), 75);
        assert_eq!(coverage_ratio(51, 100), 75);
        assert_eq!(coverage_ratio(50, 100), 50);
        assert_eq!(coverage_ratio(26, 100), 50);
        assert_eq!(coverage_ratio(25, 100), 25);
        assert_eq!(credit_ratio(701), 100);
        assert_eq!(credit_ratio(700), 75);
        assert_eq!(credit_ratio(250), 25);
    }

    #[test]
    fn test_strong_applicant_is_class_a() {
        let assessment = assess(&graded(400_000, 600_000, 500_000, 720));
        assert_eq!(assessment.classification, RiskClass::A);
        assert_eq!(assessment.risk_adjusted_return, dec!(0.06));
    }

    #[test]
    fn test_composite_uses_truncating_average() {
        // 100 + 75 + 50 = 225 / 3 = 75, which is not above 75
        let assessment = assess(&graded(100_000, 80_000, 60_000, 300));
        assert_eq!(assessment.classification, RiskClass::B);
        assert_eq!(assessment.risk_adjusted_return, dec!(0.0450));
    }

    #[test]
    fn test_weak_applicant_is_class_d() {
        let assessment = assess(&graded(1_000_000, 100_000, 10_000, 200));
        assert_eq!(assessment.classification, RiskClass::D);
        assert_eq!(assessment.risk_adjusted_return, dec!(0.015));
    }

    #[test]
    fn test_missing_inputs_leave_mortgage_unrated() {
        assert_eq!(assess(&graded(0, 1, 1, 1)), RiskAssessment::UNRATED);
        assert_eq!(assess(&graded(1, 0, 1, 1)), RiskAssessment::UNRATED);
        assert_eq!(assess(&graded(1, 1, 0, 1)), RiskAssessment::UNRATED);
        assert_eq!(assess(&graded(1, 1, 1, 0)), RiskAssessment::UNRATED);
    }

    #[test]
    fn test_cashflow_divides_before_multiplying() {
        assert_eq!(expected_annual_cashflow(100_000, 730), 49_640);
        assert_eq!(expected_annual_cashflow(100_000, 365), 100_000);
        assert_eq!(expected_annual_cashflow(100_000, 0), 100_000);
    }
}
