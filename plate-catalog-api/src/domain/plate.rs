use chrono::{DateTime, Utc};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, PlateError, PlateResult};

/// Lifecycle status of a plate: `ForSale` -> `Reserved` -> `Sold`, with
/// `Reserved` -> `ForSale` re-opening the cycle. `Sold` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "plate_status", rename_all = "PascalCase"))]
pub enum PlateStatus {
    ForSale,
    Reserved,
    Sold,
}

impl std::fmt::Display for PlateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlateStatus::ForSale => write!(f, "ForSale"),
            PlateStatus::Reserved => write!(f, "Reserved"),
            PlateStatus::Sold => write!(f, "Sold"),
        }
    }
}

impl FromStr for PlateStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ForSale") {
            Ok(PlateStatus::ForSale)
        } else if s.eq_ignore_ascii_case("Reserved") {
            Ok(PlateStatus::Reserved)
        } else if s.eq_ignore_ascii_case("Sold") {
            Ok(PlateStatus::Sold)
        } else {
            Err(())
        }
    }
}

/// A vehicle registration mark offered for sale.
///
/// The business state (`status`, `reserved_date`, `sold_date`, `sold_price`,
/// `promo_code_used`) is only mutated through the transition methods below, so
/// every auditable change flows through the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plate {
    pub id: Uuid,
    pub registration: HeaplessString<20>,
    pub purchase_price: Decimal,
    /// Stored sale price. Derived from `purchase_price` but persisted; see
    /// [`Plate::refresh_sale_price`] for the staleness fixup applied on read.
    pub sale_price: Decimal,
    pub letters: HeaplessString<10>,
    pub numbers: i32,
    pub status: PlateStatus,
    pub reserved_date: Option<DateTime<Utc>>,
    pub sold_date: Option<DateTime<Utc>>,
    pub sold_price: Option<Decimal>,
    pub promo_code_used: Option<HeaplessString<50>>,
}

/// 20% markup applied on top of the purchase price.
const MARKUP: Decimal = Decimal::from_parts(120, 0, 0, false, 2);
/// Floor for a negotiated sale: 90% of the computed sale price.
const MINIMUM_RATIO: Decimal = Decimal::from_parts(90, 0, 0, false, 2);

impl Plate {
    pub fn new(
        registration: &str,
        letters: &str,
        numbers: i32,
        purchase_price: Decimal,
    ) -> ApiResult<Self> {
        let registration = HeaplessString::from_str(registration)
            .map_err(|_| ApiError::ValidationError("registration exceeds 20 characters".into()))?;
        let letters = HeaplessString::from_str(letters)
            .map_err(|_| ApiError::ValidationError("letters exceed 10 characters".into()))?;

        let mut plate = Plate {
            id: Uuid::new_v4(),
            registration,
            purchase_price,
            sale_price: Decimal::ZERO,
            letters,
            numbers,
            status: PlateStatus::ForSale,
            reserved_date: None,
            sold_date: None,
            sold_price: None,
            promo_code_used: None,
        };
        plate.sale_price = plate.calculate_sale_price();
        Ok(plate)
    }

    /// Move a `ForSale` plate to `Reserved`, stamping the reservation time.
    pub fn reserve(&mut self) -> PlateResult<()> {
        if self.status != PlateStatus::ForSale {
            return Err(PlateError::InvalidStateTransition {
                current: self.status,
                operation: "reserve",
            });
        }

        self.status = PlateStatus::Reserved;
        self.reserved_date = Some(Utc::now());
        Ok(())
    }

    /// Return a `Reserved` plate to `ForSale`, clearing the reservation time.
    pub fn unreserve(&mut self) -> PlateResult<()> {
        if self.status != PlateStatus::Reserved {
            return Err(PlateError::InvalidStateTransition {
                current: self.status,
                operation: "unreserve",
            });
        }

        self.status = PlateStatus::ForSale;
        self.reserved_date = None;
        Ok(())
    }

    /// Close a reservation as a sale.
    ///
    /// The negotiated `final_price` must be at least 90% of the computed sale
    /// price; the boundary is inclusive.
    pub fn sell(&mut self, final_price: Decimal, promo_code: Option<&str>) -> PlateResult<()> {
        if self.status != PlateStatus::Reserved {
            return Err(PlateError::InvalidStateTransition {
                current: self.status,
                operation: "sell",
            });
        }

        let minimum = self.calculate_sale_price() * MINIMUM_RATIO;
        if final_price < minimum {
            return Err(PlateError::PriceBelowMinimum {
                offered: final_price,
                minimum,
            });
        }

        let promo_code_used = promo_code
            .map(HeaplessString::from_str)
            .transpose()
            .map_err(|_| PlateError::InvalidPromoCode(promo_code.unwrap_or_default().to_string()))?;

        self.status = PlateStatus::Sold;
        self.sold_price = Some(final_price);
        self.sold_date = Some(Utc::now());
        self.promo_code_used = promo_code_used;
        Ok(())
    }

    /// Sale price derived on demand: purchase price plus 20% markup.
    pub fn calculate_sale_price(&self) -> Decimal {
        self.purchase_price * MARKUP
    }

    pub fn calculate_profit(&self) -> Decimal {
        match self.sold_price {
            Some(sold) => sold - self.purchase_price,
            None => Decimal::ZERO,
        }
    }

    pub fn calculate_profit_margin(&self) -> Decimal {
        match self.sold_price {
            Some(sold) if !sold.is_zero() => (sold - self.purchase_price) / sold,
            _ => Decimal::ZERO,
        }
    }

    /// Fix up a stale stored sale price on read.
    ///
    /// The stored column and the recomputed value coexist; when they disagree
    /// (or the column was never populated) the recomputed value wins in memory
    /// and is written back on the next update.
    pub fn refresh_sale_price(&mut self) -> bool {
        let computed = self.calculate_sale_price();
        if self.sale_price.is_zero() || self.sale_price != computed {
            self.sale_price = computed;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plate(purchase_price: i64) -> Plate {
        Plate::new("VRM 1", "VRM", 1, Decimal::from(purchase_price)).unwrap()
    }

    #[test]
    fn reserve_from_for_sale_sets_status_and_date() {
        let mut p = plate(100);
        p.reserve().unwrap();
        assert_eq!(p.status, PlateStatus::Reserved);
        assert!(p.reserved_date.is_some());
    }

    #[test]
    fn reserve_twice_is_rejected() {
        let mut p = plate(100);
        p.reserve().unwrap();
        let err = p.reserve().unwrap_err();
        assert_eq!(
            err,
            PlateError::InvalidStateTransition {
                current: PlateStatus::Reserved,
                operation: "reserve",
            }
        );
    }

    #[test]
    fn unreserve_clears_reservation() {
        let mut p = plate(100);
        p.reserve().unwrap();
        p.unreserve().unwrap();
        assert_eq!(p.status, PlateStatus::ForSale);
        assert!(p.reserved_date.is_none());
    }

    #[test]
    fn unreserve_from_for_sale_is_rejected() {
        let mut p = plate(100);
        assert!(matches!(
            p.unreserve(),
            Err(PlateError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn sell_at_exact_minimum_succeeds() {
        // P = 100 -> sale price 120 -> minimum 108, boundary inclusive.
        let mut p = plate(100);
        p.reserve().unwrap();
        p.sell(Decimal::from(108), None).unwrap();
        assert_eq!(p.status, PlateStatus::Sold);
        assert_eq!(p.sold_price, Some(Decimal::from(108)));
        assert!(p.sold_date.is_some());
    }

    #[test]
    fn sell_below_minimum_is_rejected() {
        let mut p = plate(100);
        p.reserve().unwrap();
        let err = p.sell(Decimal::from(107), None).unwrap_err();
        match err {
            PlateError::PriceBelowMinimum { offered, minimum } => {
                assert_eq!(offered, Decimal::from(107));
                assert_eq!(minimum, Decimal::from(108));
            }
            other => panic!("expected PriceBelowMinimum, got {other:?}"),
        }
        assert_eq!(p.status, PlateStatus::Reserved);
        assert!(p.sold_price.is_none());
    }

    #[test]
    fn sell_from_for_sale_is_rejected() {
        let mut p = plate(100);
        assert!(matches!(
            p.sell(Decimal::from(120), None),
            Err(PlateError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn sell_records_promo_code() {
        let mut p = plate(300);
        p.reserve().unwrap();
        p.sell(Decimal::from(335), Some("DISCOUNT")).unwrap();
        assert_eq!(p.promo_code_used.as_deref(), Some("DISCOUNT"));
    }

    #[test]
    fn profit_is_zero_until_sold() {
        let mut p = plate(100);
        assert_eq!(p.calculate_profit(), Decimal::ZERO);
        assert_eq!(p.calculate_profit_margin(), Decimal::ZERO);

        p.reserve().unwrap();
        p.sell(Decimal::from(120), None).unwrap();
        assert_eq!(p.calculate_profit(), Decimal::from(20));
        assert_eq!(
            p.calculate_profit_margin(),
            Decimal::from(20) / Decimal::from(120)
        );
    }

    #[test]
    fn refresh_sale_price_recomputes_stale_values() {
        let mut p = plate(100);
        p.sale_price = Decimal::ZERO;
        assert!(p.refresh_sale_price());
        assert_eq!(p.sale_price, Decimal::from(120));

        // Already consistent: no change reported.
        assert!(!p.refresh_sale_price());

        p.sale_price = Decimal::from(110);
        assert!(p.refresh_sale_price());
        assert_eq!(p.sale_price, Decimal::from(120));
    }
}
