//! Fixed-rate loan amortization
//!
//! Closed-form annuity formulas over a single liability. Every function here is pure
//! and returns a safe numeric default (zero payment, full or zero balance) for
//! malformed terms instead of failing.

use serde::{Deserialize, Serialize};

use crate::portfolio::Liability;

/// Round a money amount to currency precision (cents)
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Totals over the full life of a liability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentTotals {
    /// Sum of all scheduled monthly payments
    pub total_payments: f64,
    /// Total payments minus principal
    pub total_interest: f64,
    /// Interest as a percentage of principal
    pub interest_rate: f64,
}

/// One loan year of an amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Year number (1-indexed)
    pub year: u32,
    pub opening_balance: f64,
    /// Scheduled payments made during the year
    pub payments: f64,
    pub interest: f64,
    pub principal_repaid: f64,
    pub closing_balance: f64,
}

/// Stateless amortization calculator
pub struct AmortizationCalculator;

impl AmortizationCalculator {
    /// Level monthly payment for a fully amortizing loan
    ///
    /// `payment = P * r(1+r)^n / ((1+r)^n - 1)` with `r` the monthly rate and `n` the
    /// number of monthly payments. Returns 0 when any input is non-positive.
    pub fn calculate_monthly_payment(principal: f64, annual_rate_percent: f64, term_years: u32) -> f64 {
        if principal <= 0.0 || annual_rate_percent <= 0.0 || term_years == 0 {
            return 0.0;
        }

        let monthly_rate = annual_rate_percent / 100.0 / 12.0;
        let n_payments = term_years as f64 * 12.0;
        let growth = (1.0 + monthly_rate).powf(n_payments);
        // Terms long enough to overflow amortize like an interest-only loan
        if !growth.is_finite() {
            return round_currency(principal * monthly_rate);
        }

        // growth > 1 for any positive rate, but a denormal rate can still round to 1.0
        let denominator = growth - 1.0;
        if denominator <= 0.0 {
            return 0.0;
        }

        round_currency(principal * monthly_rate * growth / denominator)
    }

    /// Outstanding balance after `elapsed_years` of scheduled payments
    ///
    /// Fractional years are converted to months linearly (`elapsed_years * 12`).
    pub fn calculate_remaining_balance(liability: &Liability, elapsed_years: f64) -> f64 {
        let principal = liability.principal();
        let term_years = liability.term_years();

        if elapsed_years <= 0.0 {
            return principal;
        }
        if elapsed_years >= term_years as f64 {
            return 0.0;
        }
        if principal <= 0.0 {
            return 0.0;
        }
        // No interest means no scheduled payment: the balance is untouched until the term ends
        if liability.rate() <= 0.0 {
            return principal;
        }

        let monthly_rate = liability.rate() / 100.0 / 12.0;
        let total_payments = term_years as f64 * 12.0;
        let payments_made = elapsed_years * 12.0;

        let growth_total = (1.0 + monthly_rate).powf(total_payments);
        let growth_made = (1.0 + monthly_rate).powf(payments_made);
        if !growth_total.is_finite() {
            return principal;
        }
        let denominator = growth_total - 1.0;
        if denominator <= 0.0 {
            return principal;
        }

        let balance = principal * (growth_total - growth_made) / denominator;
        round_currency(balance.max(0.0))
    }

    /// Total payments and interest over the full term
    pub fn calculate_total_payments(liability: &Liability) -> PaymentTotals {
        let principal = liability.principal();
        let total_payments = liability.monthly_payment() * liability.term_years() as f64 * 12.0;
        let total_interest = total_payments - principal;
        let interest_rate = if principal > 0.0 {
            total_interest / principal * 100.0
        } else {
            0.0
        };

        PaymentTotals {
            total_payments,
            total_interest,
            interest_rate,
        }
    }

    /// Year-by-year schedule over the full term
    ///
    /// Principal repaid each year is the drop in the closed-form balance; interest is
    /// the remainder of that year's payments.
    pub fn yearly_schedule(liability: &Liability) -> Vec<AmortizationRow> {
        let annual_payment = liability.monthly_payment() * 12.0;

        (1..=liability.term_years())
            .map(|year| {
                let opening_balance = Self::calculate_remaining_balance(liability, (year - 1) as f64);
                let closing_balance = Self::calculate_remaining_balance(liability, year as f64);
                let principal_repaid = opening_balance - closing_balance;
                let payments = if annual_payment > 0.0 { annual_payment } else { principal_repaid };

                AmortizationRow {
                    year,
                    opening_balance,
                    payments: round_currency(payments),
                    interest: round_currency((payments - principal_repaid).max(0.0)),
                    principal_repaid: round_currency(principal_repaid),
                    closing_balance,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::LiabilityType;
    use approx::assert_abs_diff_eq;

    fn mortgage() -> Liability {
        Liability::new("m1", LiabilityType::Mortgage, 1_000_000.0, 8.5, 20)
    }

    #[test]
    fn test_monthly_payment_reference_mortgage() {
        let payment = AmortizationCalculator::calculate_monthly_payment(1_000_000.0, 8.5, 20);
        assert_abs_diff_eq!(payment, 8678.23, epsilon = 0.5);
        // Always rounded to cents
        assert_abs_diff_eq!(payment * 100.0, (payment * 100.0).round(), epsilon = 1e-6);
    }

    #[test]
    fn test_very_long_term_stays_finite() {
        let payment = AmortizationCalculator::calculate_monthly_payment(1_000.0, 5.0, 400_000_000);
        assert_abs_diff_eq!(payment, 4.17, epsilon = 1e-9);

        let loan = Liability::new("l", LiabilityType::Mortgage, 1_000.0, 5.0, u32::MAX);
        assert!(loan.monthly_payment().is_finite());
        assert_eq!(AmortizationCalculator::calculate_remaining_balance(&loan, 10.0), 1_000.0);
        assert!(AmortizationCalculator::calculate_total_payments(&loan).total_payments.is_finite());
    }

    #[test]
    fn test_monthly_payment_degenerate_inputs() {
        assert_eq!(AmortizationCalculator::calculate_monthly_payment(0.0, 8.5, 20), 0.0);
        assert_eq!(AmortizationCalculator::calculate_monthly_payment(-5.0, 8.5, 20), 0.0);
        assert_eq!(AmortizationCalculator::calculate_monthly_payment(1000.0, 0.0, 20), 0.0);
        assert_eq!(AmortizationCalculator::calculate_monthly_payment(1000.0, -1.0, 20), 0.0);
        assert_eq!(AmortizationCalculator::calculate_monthly_payment(1000.0, 5.0, 0), 0.0);
    }

    #[test]
    fn test_remaining_balance_endpoints() {
        let loan = mortgage();
        assert_eq!(AmortizationCalculator::calculate_remaining_balance(&loan, 0.0), 1_000_000.0);
        assert_eq!(AmortizationCalculator::calculate_remaining_balance(&loan, -3.0), 1_000_000.0);
        assert_eq!(AmortizationCalculator::calculate_remaining_balance(&loan, 20.0), 0.0);
        assert_eq!(AmortizationCalculator::calculate_remaining_balance(&loan, 25.0), 0.0);
    }

    #[test]
    fn test_remaining_balance_declines() {
        let loan = mortgage();
        let at_5 = AmortizationCalculator::calculate_remaining_balance(&loan, 5.0);
        let at_10 = AmortizationCalculator::calculate_remaining_balance(&loan, 10.0);

        assert!(at_10 > 0.0 && at_10 < 1_000_000.0);
        assert!(at_10 < at_5);
    }

    #[test]
    fn test_remaining_balance_fractional_years() {
        let loan = mortgage();
        let at_1 = AmortizationCalculator::calculate_remaining_balance(&loan, 1.0);
        let at_1_5 = AmortizationCalculator::calculate_remaining_balance(&loan, 1.5);
        let at_2 = AmortizationCalculator::calculate_remaining_balance(&loan, 2.0);

        assert!(at_1 > at_1_5 && at_1_5 > at_2);
    }

    #[test]
    fn test_remaining_balance_zero_rate_is_untouched() {
        let loan = Liability::new("free", LiabilityType::Consumer, 12_000.0, 0.0, 2);
        assert_eq!(AmortizationCalculator::calculate_remaining_balance(&loan, 1.0), 12_000.0);
        assert_eq!(AmortizationCalculator::calculate_remaining_balance(&loan, 2.0), 0.0);
    }

    #[test]
    fn test_total_payments() {
        let loan = mortgage();
        let totals = AmortizationCalculator::calculate_total_payments(&loan);

        assert_abs_diff_eq!(totals.total_payments, loan.monthly_payment() * 240.0, epsilon = 1e-6);
        assert_abs_diff_eq!(totals.total_interest, totals.total_payments - 1_000_000.0, epsilon = 1e-6);
        assert!(totals.interest_rate > 100.0 && totals.interest_rate < 110.0);
    }

    #[test]
    fn test_total_payments_zero_principal() {
        let loan = Liability::new("empty", LiabilityType::Auto, 0.0, 10.0, 5);
        let totals = AmortizationCalculator::calculate_total_payments(&loan);
        assert_eq!(totals.total_payments, 0.0);
        assert_eq!(totals.interest_rate, 0.0);
    }

    #[test]
    fn test_yearly_schedule_balances_chain() {
        let loan = Liability::new("car", LiabilityType::Auto, 30_000.0, 12.0, 5);
        let schedule = AmortizationCalculator::yearly_schedule(&loan);

        assert_eq!(schedule.len(), 5);
        assert_eq!(schedule[0].opening_balance, 30_000.0);
        assert_eq!(schedule[4].closing_balance, 0.0);
        for pair in schedule.windows(2) {
            assert_eq!(pair[0].closing_balance, pair[1].opening_balance);
        }

        let repaid: f64 = schedule.iter().map(|r| r.principal_repaid).sum();
        assert_abs_diff_eq!(repaid, 30_000.0, epsilon = 0.05);

        // Interest share falls as the balance is paid down
        assert!(schedule[0].interest > schedule[4].interest);
    }
}
