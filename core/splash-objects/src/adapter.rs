//! The object contract and its one generic implementation.

use crate::lister::PageWindow;
use crate::{
    FieldError, FieldHandler, FieldResult, FieldValues, ListParams, ObjectError, ObjectHandle,
    ObjectListItem, ObjectPage, ObjectResult, PendingFields, SortOrder, SyncContext,
};
use serde_json::Value;
use splash_model::{EntitySchema, FieldDescriptor, FieldsFactory};
use splash_storage::{FieldMap, ListCriteria};
use splash_types::{IdCodec, ObjectId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the sync engine may do with one object type.
pub trait ObjectAdapter: Send + Sync {
    fn object_type(&self) -> &str;
    fn description(&self) -> &str;
    /// Store kind of the records behind this object type.
    fn backing_kind(&self) -> &str;
    fn schema(&self) -> Arc<EntitySchema>;

    fn load(&self, id: &str) -> ObjectResult<ObjectHandle>;
    fn create(&self, input: &mut PendingFields) -> ObjectResult<ObjectHandle>;
    /// Persists a dirty handle; a clean one is not written.
    ///
    /// Every write sequence starts from a freshly loaded handle with a clean
    /// tracker. The tracker is reset after a successful write, so it never
    /// carries changes from one `update` into the next.
    fn update(&self, handle: &mut ObjectHandle) -> ObjectResult<ObjectId>;
    fn delete(&self, id: &str) -> ObjectResult<bool>;

    fn get_field(&self, handle: &ObjectHandle, field_id: &str) -> Option<Value>;
    fn set_field(&self, handle: &mut ObjectHandle, field_id: &str, value: Value)
    -> FieldResult<()>;
    /// Reads `field_ids`, or every readable field when empty.
    fn get_fields(&self, handle: &ObjectHandle, field_ids: &[&str]) -> FieldValues;
    /// Applies and removes every claimed entry of `input`.
    fn set_fields(&self, handle: &mut ObjectHandle, input: &mut PendingFields) -> Vec<FieldError>;

    fn list(&self, filter: Option<&str>, params: &ListParams) -> ObjectResult<ObjectPage>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub create: bool,
    pub delete: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            create: true,
            delete: true,
        }
    }
}

impl Capabilities {
    /// Objects that exist only as projections of another record.
    pub fn projection() -> Self {
        Self {
            create: false,
            delete: false,
        }
    }
}

/// An object type assembled from field modules over one backing kind.
pub struct EntityAdapter {
    ctx: SyncContext,
    object_type: String,
    description: String,
    codec: IdCodec,
    views: Vec<String>,
    capabilities: Capabilities,
    search_columns: Vec<String>,
    handlers: Vec<Box<dyn FieldHandler>>,
}

impl EntityAdapter {
    pub fn new(ctx: SyncContext, object_type: &str, kind: &str) -> ObjectResult<Self> {
        Ok(Self {
            ctx,
            object_type: object_type.to_string(),
            description: String::new(),
            codec: IdCodec::new(kind)?,
            views: Vec::new(),
            capabilities: Capabilities::default(),
            search_columns: Vec::new(),
            handlers: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Projects every record as one object per view.
    #[must_use]
    pub fn with_views(mut self, views: &[&str]) -> Self {
        self.views = views.iter().map(|v| (*v).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Columns the list filter matches against.
    #[must_use]
    pub fn searching(mut self, columns: &[&str]) -> Self {
        self.search_columns = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Appends a field module; earlier modules win contested identifiers.
    #[must_use]
    pub fn with_handler(mut self, handler: impl FieldHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    pub fn context(&self) -> &SyncContext {
        &self.ctx
    }

    pub fn handlers(&self) -> impl Iterator<Item = &dyn FieldHandler> {
        self.handlers.iter().map(|h| h.as_ref())
    }

    fn handler_for(&self, field_id: &str) -> Option<&dyn FieldHandler> {
        self.handlers().find(|h| h.claims(field_id))
    }

    fn build_schema(&self) -> EntitySchema {
        let mut factory = FieldsFactory::new();
        for handler in &self.handlers {
            handler.declare(&mut factory);
        }
        factory
            .build(&self.object_type)
            .with_description(self.description.clone())
            .with_views(self.views.clone())
    }

    /// Decodes `id` and checks that it names an object of this type.
    fn resolve(&self, id: &str) -> ObjectResult<ObjectId> {
        let oid = self.codec.decode(id).map_err(|e| {
            warn!("[{}] bad identifier {id:?}: {e}", self.object_type);
            ObjectError::NotFound(id.to_string())
        })?;
        let view_ok = match oid.view() {
            None => self.views.is_empty(),
            Some(view) => self.views.iter().any(|v| v == view),
        };
        if !view_ok {
            debug!("[{}] {id} is not an object of this type", self.object_type);
            return Err(ObjectError::NotFound(id.to_string()));
        }
        Ok(oid)
    }

    /// Routes one already-resolved write through `handler`.
    fn apply(
        &self,
        handler: &dyn FieldHandler,
        handle: &mut ObjectHandle,
        field: &FieldDescriptor,
        value: Value,
    ) -> FieldResult<()> {
        let id = field.identifier.as_str();
        let value = field
            .field_type
            .normalize(&value)
            .map_err(|reason| FieldError::invalid(id, reason))?;
        if let Value::String(choice) = &value {
            if !choice.is_empty() && !field.accepts_choice(choice) {
                return Err(FieldError::invalid(id, format!("{choice:?} is not a valid choice")));
            }
        }

        let store = self.ctx.store.as_ref();
        let current = handler.get(store, handle, id)?.unwrap_or(Value::Null);
        let current = field.field_type.normalize(&current).unwrap_or(current);
        if same_value(&current, &value) {
            return Ok(());
        }
        if field.is_read_only() {
            return Err(FieldError::ReadOnly(id.to_string()));
        }

        if field.flags.logged {
            info!("[{}] {} {id}: {current} -> {value}", self.object_type, handle.id());
        }
        handler.set(store, handle, id, value)?;
        handle.dirty_mut().mark(id);
        Ok(())
    }

    /// Reads one field; failures are logged and read as absent.
    fn read(&self, handler: &dyn FieldHandler, handle: &ObjectHandle, field_id: &str) -> Option<Value> {
        match handler.get(self.ctx.store.as_ref(), handle, field_id) {
            Ok(value) => value,
            Err(e) => {
                warn!("[{}] {} read failed: {e}", self.object_type, handle.id());
                None
            }
        }
    }

    /// Checks the create input and collects the record's initial columns.
    fn initial_columns(
        &self,
        schema: &EntitySchema,
        input: &mut PendingFields,
    ) -> ObjectResult<(FieldMap, PendingFields)> {
        let mut invalid = Vec::new();
        let mut accepted = Vec::new();
        for field in schema.required_fields() {
            let id = field.identifier.as_str();
            let value = input
                .get(id)
                .filter(|v| !is_blank(v))
                .map(|v| field.field_type.normalize(v));
            match value {
                Some(Ok(value)) if !is_blank(&value) => accepted.push((id, value)),
                _ => invalid.push(id.to_string()),
            }
        }
        if !invalid.is_empty() {
            return Err(ObjectError::Validation {
                object_type: self.object_type.clone(),
                fields: invalid,
            });
        }

        let mut columns = FieldMap::new();
        let mut deferred = PendingFields::new();
        for (id, value) in accepted {
            input.take(id);
            match self.handler_for(id).and_then(|h| h.column(id)) {
                Some(column) => {
                    columns.insert(column.to_string(), value);
                }
                None => deferred.insert(id, value),
            }
        }
        for handler in &self.handlers {
            handler.prepare_create(input, &mut columns);
        }
        Ok((columns, deferred))
    }
}

impl ObjectAdapter for EntityAdapter {
    fn object_type(&self) -> &str {
        &self.object_type
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn backing_kind(&self) -> &str {
        self.codec.kind()
    }

    fn schema(&self) -> Arc<EntitySchema> {
        self.ctx
            .schemas
            .get_or_build(&self.object_type, || self.build_schema())
    }

    fn load(&self, id: &str) -> ObjectResult<ObjectHandle> {
        let oid = self.resolve(id)?;
        let record = self
            .ctx
            .store
            .get(self.codec.kind(), oid.backing_id())?
            .ok_or_else(|| ObjectError::NotFound(id.to_string()))?;
        Ok(ObjectHandle::new(self.object_type.clone(), oid, record))
    }

    fn create(&self, input: &mut PendingFields) -> ObjectResult<ObjectHandle> {
        if !self.capabilities.create {
            return Err(ObjectError::PermissionDenied {
                object_type: self.object_type.clone(),
                operation: "create",
            });
        }
        let schema = self.schema();
        let (columns, mut deferred) = self.initial_columns(&schema, input)?;

        let record = self.ctx.store.insert(self.codec.kind(), columns)?;
        let view = self.views.first().map(String::as_str);
        let oid = self.codec.object_id(record.id, view)?;
        info!("[{}] created {oid}", self.object_type);

        // The insert already announced this record; the writes below complete it.
        let _settling = self.ctx.locks.lock(&self.object_type, &oid.to_string());
        let mut handle = ObjectHandle::new(self.object_type.clone(), oid, record);
        let mut errors = self.set_fields(&mut handle, &mut deferred);
        errors.extend(self.set_fields(&mut handle, input));
        for e in &errors {
            warn!("[{}] {} not applied on create: {e}", self.object_type, handle.id());
        }
        self.update(&mut handle)?;
        Ok(handle)
    }

    fn update(&self, handle: &mut ObjectHandle) -> ObjectResult<ObjectId> {
        if !handle.is_dirty() {
            debug!("[{}] {} unchanged, nothing to write", self.object_type, handle.id());
            return Ok(handle.id().clone());
        }
        let changed = self.ctx.store.update(handle.record())?;
        if changed {
            debug!(
                "[{}] {} updated: {:?}",
                self.object_type,
                handle.id(),
                handle.dirty().changed_fields()
            );
        } else {
            debug!("[{}] {} saved with no column change", self.object_type, handle.id());
        }
        handle.dirty_mut().reset();
        Ok(handle.id().clone())
    }

    fn delete(&self, id: &str) -> ObjectResult<bool> {
        if !self.capabilities.delete {
            return Err(ObjectError::PermissionDenied {
                object_type: self.object_type.clone(),
                operation: "delete",
            });
        }
        let oid = match self.resolve(id) {
            Ok(oid) => oid,
            Err(ObjectError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        let deleted = self.ctx.store.delete(self.codec.kind(), oid.backing_id())?;
        if deleted {
            info!("[{}] deleted {oid}", self.object_type);
        }
        Ok(deleted)
    }

    fn get_field(&self, handle: &ObjectHandle, field_id: &str) -> Option<Value> {
        if !self.schema().contains(field_id) {
            return None;
        }
        let handler = self.handler_for(field_id)?;
        self.read(handler, handle, field_id)
    }

    fn set_field(
        &self,
        handle: &mut ObjectHandle,
        field_id: &str,
        value: Value,
    ) -> FieldResult<()> {
        let schema = self.schema();
        let (Some(field), Some(handler)) = (schema.field(field_id), self.handler_for(field_id))
        else {
            debug!("[{}] ignoring unknown field {field_id}", self.object_type);
            return Ok(());
        };
        self.apply(handler, handle, field, value)
    }

    fn get_fields(&self, handle: &ObjectHandle, field_ids: &[&str]) -> FieldValues {
        let schema = self.schema();
        let wanted: Vec<&FieldDescriptor> = if field_ids.is_empty() {
            schema.fields.iter().filter(|f| !f.flags.write_only).collect()
        } else {
            field_ids.iter().filter_map(|id| schema.field(id)).collect()
        };

        let mut out = FieldValues::new();
        for field in wanted {
            let id = field.identifier.as_str();
            let value = self
                .handler_for(id)
                .and_then(|h| self.read(h, handle, id))
                .unwrap_or(Value::Null);
            out.insert(id.to_string(), value);
        }
        out
    }

    fn set_fields(&self, handle: &mut ObjectHandle, input: &mut PendingFields) -> Vec<FieldError> {
        let schema = self.schema();
        let mut errors = Vec::new();
        for handler in &self.handlers {
            let claimed: Vec<String> = input
                .field_ids()
                .filter(|id| handler.claims(id) && schema.contains(id))
                .map(str::to_string)
                .collect();
            for id in claimed {
                let (Some(value), Some(field)) = (input.take(&id), schema.field(&id)) else {
                    continue;
                };
                if let Err(e) = self.apply(handler.as_ref(), handle, field, value) {
                    warn!("[{}] {} {}: {e}", self.object_type, handle.id(), handler.name());
                    errors.push(e);
                }
            }
        }
        if !input.is_empty() {
            debug!(
                "[{}] unclaimed fields left: {:?}",
                self.object_type,
                input.field_ids().collect::<Vec<_>>()
            );
        }
        errors
    }

    fn list(&self, filter: Option<&str>, params: &ListParams) -> ObjectResult<ObjectPage> {
        let schema = self.schema();
        let views: Vec<Option<&str>> = if self.views.is_empty() {
            vec![None]
        } else {
            self.views.iter().map(|v| Some(v.as_str())).collect()
        };
        let window = PageWindow::new(params.offset(), params.max(), views.len());

        let sort_field = params.sort_field();
        let sort_column = if schema.contains(sort_field) {
            self.handler_for(sort_field).and_then(|h| h.column(sort_field))
        } else {
            None
        }
        .unwrap_or("id");

        let criteria = ListCriteria {
            search: filter.map(str::to_string).filter(|f| !f.trim().is_empty()),
            search_columns: self.search_columns.clone(),
            sort_column: sort_column.to_string(),
            descending: params.sort_order() == SortOrder::Desc,
            limit: window.record_limit,
            offset: window.record_offset,
        };
        let page = self.ctx.store.list(self.codec.kind(), &criteria)?;

        let listed: Vec<&str> = schema
            .listed_fields()
            .map(|f| f.identifier.as_str())
            .collect();
        let mut items = Vec::new();
        let positions = page
            .records
            .iter()
            .flat_map(|record| views.iter().map(move |view| (record, *view)))
            .skip(window.skip)
            .take(window.max);
        for (record, view) in positions {
            let oid = self.codec.object_id(record.id, view)?;
            let handle = ObjectHandle::new(self.object_type.clone(), oid, record.clone());
            items.push(ObjectListItem {
                id: handle.id().to_string(),
                fields: self.get_fields(&handle, &listed),
            });
        }

        Ok(ObjectPage {
            total: page.total * views.len(),
            current: items.len(),
            items,
        })
    }
}

/// Equality after normalization; null and empty text are the same.
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        _ if is_blank(a) && is_blank(b) => true,
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
