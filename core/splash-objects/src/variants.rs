//! The object types the bridge exposes.

use crate::fields::{
    AddressFields, AddressStorage, CustomMetaFields, FieldHandler, OrderCoreFields, OwnerField,
    OwnerSource, UserCoreFields, UserMetaFields,
};
use crate::{Capabilities, EntityAdapter, ObjectResult, SyncContext};
use splash_types::IdCodec;

pub const USER_KIND: &str = "user";
pub const ORDER_KIND: &str = "order";

pub const THIRD_PARTY_TYPE: &str = "ThirdParty";
pub const ADDRESS_TYPE: &str = "Address";
pub const ORDER_TYPE: &str = "Order";
pub const ORDER_ADDRESS_TYPE: &str = "OrderAddress";

const USER_ADDRESS_VIEWS: &[&str] = &["billing", "shipping"];
const ORDER_ADDRESS_VIEWS: &[&str] = &["billing", "delivery"];

/// Customer accounts.
pub fn user_adapter(ctx: &SyncContext) -> ObjectResult<EntityAdapter> {
    let core = UserCoreFields;
    let meta = UserMetaFields;
    let mut excluded = meta.meta_keys();
    excluded.extend(AddressFields::new(AddressStorage::Meta, USER_ADDRESS_VIEWS).meta_keys());

    let adapter = EntityAdapter::new(ctx.clone(), THIRD_PARTY_TYPE, USER_KIND)?
        .with_description("Customer account")
        .searching(&["email", "login", "first_name", "last_name"])
        .with_handler(core)
        .with_handler(meta);
    Ok(with_custom_fields(ctx, adapter, USER_KIND, excluded))
}

/// Billing and shipping addresses of a user, one object per view.
pub fn user_address_adapter(ctx: &SyncContext) -> ObjectResult<EntityAdapter> {
    let owner = OwnerField::new(
        "user",
        "Customer",
        THIRD_PARTY_TYPE,
        IdCodec::new(USER_KIND)?,
        OwnerSource::Record,
    );
    Ok(
        EntityAdapter::new(ctx.clone(), ADDRESS_TYPE, USER_KIND)?
            .with_description("Customer address")
            .with_views(USER_ADDRESS_VIEWS)
            .with_capabilities(Capabilities::projection())
            .searching(&["email", "login", "first_name", "last_name"])
            .with_handler(AddressFields::new(AddressStorage::Meta, USER_ADDRESS_VIEWS))
            .with_handler(owner),
    )
}

/// Orders, with the ordering customer as a reference.
pub fn order_adapter(ctx: &SyncContext) -> ObjectResult<EntityAdapter> {
    let owner = OwnerField::new(
        "customer",
        "Customer",
        THIRD_PARTY_TYPE,
        IdCodec::new(USER_KIND)?,
        OwnerSource::Column("customer_id".into()),
    )
    .writable();

    let adapter = EntityAdapter::new(ctx.clone(), ORDER_TYPE, ORDER_KIND)?
        .with_description("Customer order")
        .searching(&["number", "status"])
        .with_handler(OrderCoreFields)
        .with_handler(owner);
    Ok(with_custom_fields(ctx, adapter, ORDER_KIND, Vec::new()))
}

/// Billing and delivery addresses of an order.
///
/// The delivery view reads the order's `shipping_*` columns.
pub fn order_address_adapter(ctx: &SyncContext) -> ObjectResult<EntityAdapter> {
    let owner = OwnerField::new(
        "customer",
        "Customer",
        THIRD_PARTY_TYPE,
        IdCodec::new(USER_KIND)?,
        OwnerSource::Column("customer_id".into()),
    );
    let address = AddressFields::new(AddressStorage::Columns, ORDER_ADDRESS_VIEWS)
        .with_prefix("delivery", "shipping");
    Ok(
        EntityAdapter::new(ctx.clone(), ORDER_ADDRESS_TYPE, ORDER_KIND)?
            .with_description("Order address")
            .with_views(ORDER_ADDRESS_VIEWS)
            .with_capabilities(Capabilities::projection())
            .searching(&["number", "billing_last_name", "shipping_last_name", "billing_city"])
            .with_handler(address)
            .with_handler(owner),
    )
}

fn with_custom_fields(
    ctx: &SyncContext,
    adapter: EntityAdapter,
    kind: &str,
    excluded: Vec<String>,
) -> EntityAdapter {
    if !ctx.settings().features.custom_fields {
        return adapter;
    }
    adapter.with_handler(CustomMetaFields::new(ctx.store.clone(), kind, excluded))
}
