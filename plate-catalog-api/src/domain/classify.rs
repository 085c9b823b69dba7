use std::str::FromStr;

use crate::domain::audit::{AuditAction, AuditFieldChange};
use crate::domain::diff::{FIELD_PURCHASE_PRICE, FIELD_SALE_PRICE, FIELD_STATUS};
use crate::domain::plate::PlateStatus;

/// Map a captured change set to its semantic audit action.
///
/// A status transition always dominates a concurrent price edit in the same
/// write; a price-only edit is an update; anything else in the tracked field
/// set carries no dedicated label.
pub fn classify(changes: &[AuditFieldChange]) -> AuditAction {
    if let Some(status_change) = changes.iter().find(|c| c.field_name == FIELD_STATUS) {
        // Typed comparison against the captured new value. A value that does
        // not parse as a known status still counts as an update.
        let new_status = status_change
            .new_value
            .as_deref()
            .and_then(|v| PlateStatus::from_str(v).ok());

        return match new_status {
            Some(PlateStatus::Reserved) => AuditAction::PlateReserved,
            Some(PlateStatus::ForSale) => AuditAction::PlateUnreserved,
            Some(PlateStatus::Sold) => AuditAction::PlateSold,
            None => AuditAction::PlateUpdated,
        };
    }

    if changes
        .iter()
        .any(|c| c.field_name == FIELD_SALE_PRICE || c.field_name == FIELD_PURCHASE_PRICE)
    {
        return AuditAction::PlateUpdated;
    }

    AuditAction::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diff::FIELD_PROMO_CODE_USED;

    fn change(field: &str, old: Option<&str>, new: Option<&str>) -> AuditFieldChange {
        AuditFieldChange::new(field, old.map(String::from), new.map(String::from))
    }

    #[test]
    fn status_to_reserved_is_plate_reserved() {
        let changes = vec![change(FIELD_STATUS, Some("ForSale"), Some("Reserved"))];
        assert_eq!(classify(&changes), AuditAction::PlateReserved);
    }

    #[test]
    fn status_to_for_sale_is_plate_unreserved() {
        let changes = vec![change(FIELD_STATUS, Some("Reserved"), Some("ForSale"))];
        assert_eq!(classify(&changes), AuditAction::PlateUnreserved);
    }

    #[test]
    fn status_to_sold_is_plate_sold() {
        let changes = vec![change(FIELD_STATUS, Some("ForSale"), Some("Sold"))];
        assert_eq!(classify(&changes), AuditAction::PlateSold);
    }

    #[test]
    fn unknown_status_value_is_plate_updated() {
        let changes = vec![change(FIELD_STATUS, Some("ForSale"), Some("Scrapped"))];
        assert_eq!(classify(&changes), AuditAction::PlateUpdated);
    }

    #[test]
    fn status_change_dominates_price_change() {
        let changes = vec![
            change(FIELD_SALE_PRICE, Some("100"), Some("120")),
            change(FIELD_STATUS, Some("ForSale"), Some("Reserved")),
        ];
        assert_eq!(classify(&changes), AuditAction::PlateReserved);
    }

    #[test]
    fn price_only_change_is_plate_updated() {
        let changes = vec![change(FIELD_SALE_PRICE, Some("100"), Some("120"))];
        assert_eq!(classify(&changes), AuditAction::PlateUpdated);
    }

    #[test]
    fn non_price_non_status_change_is_unknown() {
        let changes = vec![change(FIELD_PROMO_CODE_USED, None, Some("PROMO10"))];
        assert_eq!(classify(&changes), AuditAction::Unknown);
    }

    #[test]
    fn empty_change_set_is_unknown() {
        assert_eq!(classify(&[]), AuditAction::Unknown);
    }
}
