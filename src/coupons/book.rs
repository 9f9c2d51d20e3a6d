//! Coupon Book
//!
//! The set of coupons offered to a shopper, looked up by code.

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::coupons::{Coupon, CouponOutcome, evaluate_coupon};

/// Errors building a coupon book.
#[derive(Debug, Error, PartialEq)]
pub enum CouponBookError {
    /// Two coupons share a code (compared case-insensitively).
    #[error("Duplicate coupon code: {0}")]
    DuplicateCode(String),
}

/// Coupons indexed by case-folded code.
#[derive(Debug, Clone, Default)]
pub struct CouponBook<'a> {
    coupons: Vec<Coupon<'a>>,
    by_code: FxHashMap<String, usize>,
}

impl<'a> CouponBook<'a> {
    /// Build a book from a list of coupons.
    ///
    /// # Errors
    ///
    /// Returns [`CouponBookError::DuplicateCode`] if two coupons share a code.
    pub fn new(coupons: impl IntoIterator<Item = Coupon<'a>>) -> Result<Self, CouponBookError> {
        let mut book = Self::default();

        for coupon in coupons {
            let key = fold(coupon.code());

            if book.by_code.contains_key(&key) {
                return Err(CouponBookError::DuplicateCode(coupon.code().to_string()));
            }

            book.by_code.insert(key, book.coupons.len());
            book.coupons.push(coupon);
        }

        Ok(book)
    }

    /// Find a coupon by code, ignoring case and surrounding whitespace.
    pub fn find(&self, code: &str) -> Option<&Coupon<'a>> {
        self.by_code
            .get(&fold(code))
            .and_then(|idx| self.coupons.get(*idx))
    }

    /// Check every coupon against the cart, in book order.
    pub fn evaluate_all(
        &self,
        subtotal: Money<'a, Currency>,
        item_count: u64,
    ) -> impl Iterator<Item = (&Coupon<'a>, CouponOutcome<'a>)> {
        self.coupons
            .iter()
            .map(move |coupon| (coupon, evaluate_coupon(coupon, &subtotal, item_count)))
    }

    /// The applicable coupon with the largest discount. Earlier coupons win ties.
    pub fn best_for(
        &self,
        subtotal: &Money<'a, Currency>,
        item_count: u64,
    ) -> Option<(&Coupon<'a>, CouponOutcome<'a>)> {
        self.evaluate_all(*subtotal, item_count)
            .filter(|(_coupon, outcome)| outcome.is_applicable())
            .fold(None::<(&Coupon<'a>, CouponOutcome<'a>)>, |best, candidate| {
                let better = best.as_ref().is_none_or(|(_, outcome)| {
                    candidate.1.discount().to_minor_units() > outcome.discount().to_minor_units()
                });

                if better { Some(candidate) } else { best }
            })
    }

    /// Number of coupons.
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Check if the book has no coupons.
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

fn fold(code: &str) -> String {
    code.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use crate::coupons::CouponStatus;

    use super::*;

    fn inr<'a>(rupees: i64) -> Money<'a, Currency> {
        Money::from_minor(rupees * 100, INR)
    }

    fn book<'a>() -> Result<CouponBook<'a>, CouponBookError> {
        CouponBook::new([
            Coupon::percentage("BLOOM10", Percentage::from(0.1)).with_max_discount(inr(200)),
            Coupon::fixed("FLAT150", inr(150)).with_min_purchase(inr(999)),
            Coupon::fixed("WELCOME300", inr(300)).with_status(CouponStatus::Inactive),
            Coupon::fixed("BIGBAG", inr(500)).with_min_items(5),
        ])
    }

    #[test]
    fn find_is_case_insensitive() -> TestResult {
        let book = book()?;

        assert_eq!(book.find("bloom10").map(Coupon::code), Some("BLOOM10"));
        assert_eq!(book.find(" Flat150 ").map(Coupon::code), Some("FLAT150"));
        assert!(book.find("NOPE").is_none());

        Ok(())
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let result = CouponBook::new([
            Coupon::fixed("SAVE", inr(10)),
            Coupon::fixed("save", inr(20)),
        ]);

        assert_eq!(
            result.map(|book| book.len()),
            Err(CouponBookError::DuplicateCode("save".to_string()))
        );
    }

    #[test]
    fn evaluate_all_lists_every_coupon() -> TestResult {
        let book = book()?;
        let subtotal = inr(3097);

        let applicable: Vec<(&str, bool)> = book
            .evaluate_all(subtotal, 3)
            .map(|(coupon, outcome)| (coupon.code(), outcome.is_applicable()))
            .collect();

        assert_eq!(
            applicable,
            vec![
                ("BLOOM10", true),
                ("FLAT150", true),
                ("WELCOME300", false),
                ("BIGBAG", false),
            ]
        );

        Ok(())
    }

    #[test]
    fn best_for_picks_largest_applicable_discount() -> TestResult {
        let book = book()?;

        let best = book.best_for(&inr(3097), 3);

        assert_eq!(
            best.map(|(coupon, outcome)| (coupon.code(), outcome.discount())),
            Some(("BLOOM10", inr(200)))
        );

        let best = book.best_for(&inr(3097), 6);

        assert_eq!(best.map(|(coupon, _)| coupon.code()), Some("BIGBAG"));

        Ok(())
    }

    #[test]
    fn best_for_prefers_earlier_coupon_on_ties() -> TestResult {
        let book = CouponBook::new([
            Coupon::fixed("FIRST", inr(100)),
            Coupon::fixed("SECOND", inr(100)),
        ])?;

        assert_eq!(
            book.best_for(&inr(500), 1).map(|(coupon, _)| coupon.code()),
            Some("FIRST")
        );

        Ok(())
    }

    #[test]
    fn best_for_returns_none_when_nothing_applies() -> TestResult {
        let book = CouponBook::new([
            Coupon::fixed("FLAT150", inr(150)).with_min_purchase(inr(999)),
            Coupon::fixed("WELCOME300", inr(300)).with_status(CouponStatus::Inactive),
        ])?;

        assert!(book.best_for(&inr(500), 1).is_none());
        assert!(CouponBook::default().best_for(&inr(500), 1).is_none());

        Ok(())
    }
}
