//! Entry point for the sync engine.

use crate::{
    order_address_adapter, order_adapter, user_adapter, user_address_adapter, FieldError,
    FieldValues, ListParams, ObjectAdapter, ObjectError, ObjectPage, ObjectResult, PendingFields,
    SyncContext,
};
use splash_model::EntitySchema;
use splash_notify::{ChangeNotifier, NoticeStore, NotifyRoute};
use splash_types::ObjectId;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a remote write.
#[derive(Debug)]
pub struct SetOutcome {
    pub id: ObjectId,
    pub created: bool,
    /// Per-field failures; the rest of the write was applied.
    pub field_errors: Vec<FieldError>,
    /// Input fields no module claimed.
    pub unclaimed: Vec<String>,
}

/// Routes sync-engine requests to adapters by object type name.
///
/// Writes made here are remote: the target object is locked for the
/// duration, so the store events they cause are not echoed back to the
/// engine as local changes.
pub struct ObjectRegistry {
    ctx: SyncContext,
    adapters: Vec<Arc<dyn ObjectAdapter>>,
}

impl ObjectRegistry {
    pub fn new(ctx: SyncContext) -> Self {
        Self {
            ctx,
            adapters: Vec::new(),
        }
    }

    /// Registry with every object type enabled by the context's settings.
    pub fn with_defaults(ctx: SyncContext) -> ObjectResult<Self> {
        let mut registry = Self::new(ctx.clone());
        registry.register(Arc::new(user_adapter(&ctx)?));
        registry.register(Arc::new(user_address_adapter(&ctx)?));
        if ctx.settings().features.orders {
            registry.register(Arc::new(order_adapter(&ctx)?));
            registry.register(Arc::new(order_address_adapter(&ctx)?));
        }
        Ok(registry)
    }

    /// Adds an adapter, replacing one registered under the same name.
    pub fn register(&mut self, adapter: Arc<dyn ObjectAdapter>) {
        self.adapters
            .retain(|a| a.object_type() != adapter.object_type());
        self.adapters.push(adapter);
    }

    pub fn context(&self) -> &SyncContext {
        &self.ctx
    }

    pub fn object_types(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.object_type()).collect()
    }

    pub fn adapter(&self, object_type: &str) -> ObjectResult<Arc<dyn ObjectAdapter>> {
        self.adapters
            .iter()
            .find(|a| a.object_type() == object_type)
            .cloned()
            .ok_or_else(|| ObjectError::UnknownType(object_type.to_string()))
    }

    pub fn describe(&self, object_type: &str) -> ObjectResult<Arc<EntitySchema>> {
        Ok(self.adapter(object_type)?.schema())
    }

    pub fn list(
        &self,
        object_type: &str,
        filter: Option<&str>,
        params: &ListParams,
    ) -> ObjectResult<ObjectPage> {
        self.adapter(object_type)?.list(filter, params)
    }

    /// Reads `field_ids` (all readable fields when empty) of one object.
    pub fn get(&self, object_type: &str, id: &str, field_ids: &[&str]) -> ObjectResult<FieldValues> {
        let adapter = self.adapter(object_type)?;
        let handle = adapter.load(id)?;
        Ok(adapter.get_fields(&handle, field_ids))
    }

    /// Writes `fields` to object `id`, or creates a new object when `id`
    /// is `None`.
    pub fn set(
        &self,
        object_type: &str,
        id: Option<&str>,
        mut fields: PendingFields,
    ) -> ObjectResult<SetOutcome> {
        let adapter = self.adapter(object_type)?;
        let (id, created, field_errors) = match id {
            Some(id) => {
                let _lock = self.ctx.locks.lock(object_type, id);
                let mut handle = adapter.load(id)?;
                let errors = adapter.set_fields(&mut handle, &mut fields);
                (adapter.update(&mut handle)?, false, errors)
            }
            None => {
                let _creating = self.ctx.locks.lock_new(object_type);
                let handle = adapter.create(&mut fields)?;
                (handle.id().clone(), true, Vec::new())
            }
        };

        let unclaimed: Vec<String> = fields.field_ids().map(str::to_string).collect();
        if !unclaimed.is_empty() {
            debug!("[{object_type}] {id}: ignored fields {unclaimed:?}");
        }
        info!(
            "[{object_type}] remote {} of {id} ({} field errors)",
            if created { "create" } else { "update" },
            field_errors.len()
        );
        Ok(SetOutcome {
            id,
            created,
            field_errors,
            unclaimed,
        })
    }

    pub fn delete(&self, object_type: &str, id: &str) -> ObjectResult<bool> {
        let adapter = self.adapter(object_type)?;
        let _lock = self.ctx.locks.lock(object_type, id);
        let deleted = adapter.delete(id)?;
        if !deleted {
            warn!("[{object_type}] delete of {id}: no such object");
        }
        Ok(deleted)
    }

    /// Notification routes for every registered object type.
    pub fn routes(&self) -> Vec<NotifyRoute> {
        self.adapters
            .iter()
            .map(|adapter| {
                let schema = adapter.schema();
                let views: Vec<&str> = schema.views.iter().map(String::as_str).collect();
                NotifyRoute::new(adapter.backing_kind(), adapter.object_type()).with_views(&views)
            })
            .collect()
    }

    /// A change notifier sharing this registry's locks and engine.
    pub fn change_notifier(&self, notices: Arc<dyn NoticeStore>) -> ChangeNotifier {
        self.routes().into_iter().fold(
            ChangeNotifier::new(
                Arc::clone(&self.ctx.locks),
                Arc::clone(&self.ctx.engine),
                notices,
            ),
            ChangeNotifier::with_route,
        )
    }
}
