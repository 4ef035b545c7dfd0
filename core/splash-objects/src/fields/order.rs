use super::{lookup, FieldHandler};
use crate::{FieldError, FieldResult, ObjectHandle, PendingFields};
use chrono::Utc;
use serde_json::Value;
use splash_model::{FieldType, FieldsFactory, DATETIME_FORMAT};
use splash_storage::{BackingStore, FieldMap};

const ORDER_COLUMNS: &[(&str, &str)] = &[
    ("reference", "number"),
    ("status", "status"),
    ("created", "date_created"),
    ("total", "total"),
    ("currency", "currency"),
];

/// Status a new order starts in.
pub const DEFAULT_STATUS: &str = "pending";

const STATUSES: &[(&str, &str)] = &[
    ("pending", "Pending payment"),
    ("processing", "Processing"),
    ("on-hold", "On hold"),
    ("completed", "Completed"),
    ("cancelled", "Cancelled"),
    ("refunded", "Refunded"),
    ("failed", "Failed"),
];

/// Header columns of an order record.
#[derive(Debug, Default)]
pub struct OrderCoreFields;

impl FieldHandler for OrderCoreFields {
    fn name(&self) -> &'static str {
        "order-core"
    }

    fn declare(&self, factory: &mut FieldsFactory) {
        factory
            .create(FieldType::Varchar)
            .identifier("reference")
            .name("Reference")
            .micro_data("http://schema.org/Order", "orderNumber")
            .is_required()
            .is_listed()
            .is_logged();
        factory
            .create(FieldType::Varchar)
            .identifier("status")
            .name("Status")
            .micro_data("http://schema.org/Order", "orderStatus")
            .is_listed()
            .is_logged();
        for (value, label) in STATUSES {
            factory.add_choice(value, label);
        }
        factory
            .create(FieldType::DateTime)
            .identifier("created")
            .name("Order date")
            .micro_data("http://schema.org/Order", "orderDate")
            .is_read_only()
            .is_listed();
        factory
            .create(FieldType::Double)
            .identifier("total")
            .name("Total")
            .micro_data("http://schema.org/Invoice", "totalPaymentDue");
        factory
            .create(FieldType::Currency)
            .identifier("currency")
            .name("Currency")
            .micro_data("http://schema.org/PriceSpecification", "priceCurrency");
    }

    fn claims(&self, field_id: &str) -> bool {
        lookup(ORDER_COLUMNS, field_id).is_some()
    }

    fn get(
        &self,
        _store: &dyn BackingStore,
        handle: &ObjectHandle,
        field_id: &str,
    ) -> FieldResult<Option<Value>> {
        Ok(lookup(ORDER_COLUMNS, field_id).and_then(|column| handle.column(column).cloned()))
    }

    fn set(
        &self,
        _store: &dyn BackingStore,
        handle: &mut ObjectHandle,
        field_id: &str,
        value: Value,
    ) -> FieldResult<()> {
        let column = lookup(ORDER_COLUMNS, field_id)
            .ok_or_else(|| FieldError::invalid(field_id, "not an order column"))?;
        handle.set_column(column, value);
        Ok(())
    }

    fn column(&self, field_id: &str) -> Option<&str> {
        lookup(ORDER_COLUMNS, field_id)
    }

    fn prepare_create(&self, _input: &mut PendingFields, fields: &mut FieldMap) {
        fields
            .entry("status".to_string())
            .or_insert_with(|| Value::String(DEFAULT_STATUS.into()));
        fields.insert(
            "date_created".into(),
            Value::String(Utc::now().naive_utc().format(DATETIME_FORMAT).to_string()),
        );
    }
}
