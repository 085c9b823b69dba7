use crate::domain::audit::AuditFieldChange;
use crate::domain::plate::Plate;

pub const FIELD_STATUS: &str = "Status";
pub const FIELD_PURCHASE_PRICE: &str = "PurchasePrice";
pub const FIELD_SALE_PRICE: &str = "SalePrice";
pub const FIELD_RESERVED_DATE: &str = "ReservedDate";
pub const FIELD_SOLD_DATE: &str = "SoldDate";
pub const FIELD_SOLD_PRICE: &str = "SoldPrice";
pub const FIELD_PROMO_CODE_USED: &str = "PromoCodeUsed";

/// One tracked field: a typed change predicate plus a string renderer.
///
/// Change detection compares the typed values (so `100` and `100.00` are
/// equal); only fields that actually changed are rendered.
struct TrackedField {
    name: &'static str,
    changed: fn(&Plate, &Plate) -> bool,
    render: fn(&Plate) -> Option<String>,
}

/// The fixed field set under audit. Iterated in a plain loop; nothing dynamic.
const TRACKED_FIELDS: &[TrackedField] = &[
    TrackedField {
        name: FIELD_STATUS,
        changed: |o, c| o.status != c.status,
        render: |p| Some(p.status.to_string()),
    },
    TrackedField {
        name: FIELD_PURCHASE_PRICE,
        changed: |o, c| o.purchase_price != c.purchase_price,
        render: |p| Some(p.purchase_price.to_string()),
    },
    TrackedField {
        name: FIELD_SALE_PRICE,
        changed: |o, c| o.sale_price != c.sale_price,
        render: |p| Some(p.sale_price.to_string()),
    },
    TrackedField {
        name: FIELD_RESERVED_DATE,
        changed: |o, c| o.reserved_date != c.reserved_date,
        render: |p| p.reserved_date.map(|d| d.to_rfc3339()),
    },
    TrackedField {
        name: FIELD_SOLD_DATE,
        changed: |o, c| o.sold_date != c.sold_date,
        render: |p| p.sold_date.map(|d| d.to_rfc3339()),
    },
    TrackedField {
        name: FIELD_SOLD_PRICE,
        changed: |o, c| o.sold_price != c.sold_price,
        render: |p| p.sold_price.map(|v| v.to_string()),
    },
    TrackedField {
        name: FIELD_PROMO_CODE_USED,
        changed: |o, c| o.promo_code_used != c.promo_code_used,
        render: |p| p.promo_code_used.as_ref().map(|v| v.to_string()),
    },
];

/// Diff two snapshots of the same plate over the tracked field set.
///
/// Pure over the snapshot pair; values are rendered to strings here, at diff
/// time, not at persist time.
pub fn diff_plate(original: &Plate, current: &Plate) -> Vec<AuditFieldChange> {
    let mut changes = Vec::new();
    for field in TRACKED_FIELDS {
        if (field.changed)(original, current) {
            changes.push(AuditFieldChange::new(
                field.name,
                (field.render)(original),
                (field.render)(current),
            ));
        }
    }
    changes
}
