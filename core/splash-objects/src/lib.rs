//! Object adapters for the Splash bridge.
//!
//! Every synchronizable object type (ThirdParty, Address, Order,
//! OrderAddress) is exposed through the same contract, [`ObjectAdapter`]:
//! load / create / update / delete, field-level get / set, and paginated
//! listing. The sync engine talks to the adapters through
//! [`ObjectRegistry`], which routes requests by object type name.
//!
//! # Field dispatch
//!
//! An adapter owns an ordered list of [`FieldHandler`] modules (core
//! columns, metadata, address block, owner reference, custom fields).
//! Each module declares its fields into the shared schema and claims the
//! identifiers it owns. Incoming writes arrive as [`PendingFields`]; every
//! module removes the keys it handled, and whatever is left belongs to no
//! one and is ignored.
//!
//! # Dirty tracking
//!
//! A write only reaches a module when the normalized value differs from
//! the persisted one. Modules then write and the handle is marked dirty;
//! `update` persists only dirty handles, so an unchanged pass neither
//! writes nor triggers a change notification.

mod adapter;
mod buffer;
mod context;
mod error;
pub mod fields;
mod handle;
mod lister;
mod registry;
mod variants;

pub use adapter::{Capabilities, EntityAdapter, ObjectAdapter};
pub use buffer::{FieldValues, PendingFields};
pub use context::SyncContext;
pub use error::{FieldError, FieldResult, ObjectError, ObjectResult};
pub use fields::FieldHandler;
pub use handle::{DirtyTracker, ObjectHandle};
pub use lister::{ListParams, ObjectListItem, ObjectPage, SortOrder};
pub use registry::{ObjectRegistry, SetOutcome};
pub use variants::{
    order_address_adapter, order_adapter, user_adapter, user_address_adapter, ADDRESS_TYPE,
    ORDER_ADDRESS_TYPE, ORDER_KIND, ORDER_TYPE, THIRD_PARTY_TYPE, USER_KIND,
};
