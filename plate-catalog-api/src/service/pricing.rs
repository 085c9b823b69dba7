use rust_decimal::Decimal;

use crate::error::{PlateError, PlateResult};

/// Flat 25 off the sale price.
pub const PROMO_DISCOUNT: &str = "DISCOUNT";
/// 15% off the sale price.
pub const PROMO_PERCENT_OFF: &str = "PERCENTOFF";

const FLAT_DISCOUNT: Decimal = Decimal::from_parts(25, 0, 0, false, 0);
const PERCENT_OFF_RATIO: Decimal = Decimal::from_parts(85, 0, 0, false, 2);

/// Apply a promo code to a computed sale price.
///
/// Codes are matched case-insensitively; a missing or blank code leaves the
/// price unchanged. The discounted price still has to clear the 90% floor in
/// [`crate::domain::Plate::sell`], which is what makes some promos invalid on
/// cheaper plates.
pub fn apply_promo_code(sale_price: Decimal, promo_code: Option<&str>) -> PlateResult<Decimal> {
    let code = match promo_code {
        Some(c) if !c.trim().is_empty() => c,
        _ => return Ok(sale_price),
    };

    match code.to_ascii_uppercase().as_str() {
        PROMO_DISCOUNT => Ok(sale_price - FLAT_DISCOUNT),
        PROMO_PERCENT_OFF => Ok(sale_price * PERCENT_OFF_RATIO),
        _ => Err(PlateError::InvalidPromoCode(code.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_code_leaves_price_unchanged() {
        assert_eq!(
            apply_promo_code(Decimal::from(360), None).unwrap(),
            Decimal::from(360)
        );
        assert_eq!(
            apply_promo_code(Decimal::from(360), Some("  ")).unwrap(),
            Decimal::from(360)
        );
    }

    #[test]
    fn flat_discount_takes_25_off() {
        assert_eq!(
            apply_promo_code(Decimal::from(360), Some("DISCOUNT")).unwrap(),
            Decimal::from(335)
        );
    }

    #[test]
    fn percent_off_takes_15_percent() {
        assert_eq!(
            apply_promo_code(Decimal::from(600), Some("PERCENTOFF")).unwrap(),
            Decimal::new(51000, 2)
        );
    }

    #[test]
    fn codes_match_case_insensitively() {
        assert_eq!(
            apply_promo_code(Decimal::from(360), Some("discount")).unwrap(),
            Decimal::from(335)
        );
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(matches!(
            apply_promo_code(Decimal::from(360), Some("HALFPRICE")),
            Err(PlateError::InvalidPromoCode(_))
        ));
    }
}
