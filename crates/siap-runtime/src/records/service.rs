//! One record service for every resource.
//!
//! ```text
//! RecordService::create(&Authenticated, &Schema, RecordInput)
//!   │
//!   ├─ 1. gate.require(role, resource, CREATE)   ── denied → AccessDenied, no I/O
//!   ├─ 2. coerce + validate every field           ── bad input → RecordError, no I/O
//!   ├─ 3. upload attachments (BlobStore)          ── URLs become field values
//!   └─ 4. put document (DocumentStore)
//! ```

use super::error::RecordError;
use super::input::{RecordInput, Upload};
use super::outcome::{Notice, RecordOutcome};
use super::schema::{IdStrategy, Schema};
use crate::collab::{BlobStore, Document, DocumentStore, Fields, StoreError, Subscription};
use chrono::Utc;
use serde_json::Value;
use siap_auth::{AuthorizationGate, AuthorizationPolicy, Authenticated, Capability, Resource, Route};
use siap_types::{CollectionPath, DocId, DocPath, TryNew};
use std::sync::Arc;
use tracing::{debug, error, info};

/// A stored record.
pub type Record = Document;

/// Schema-driven list/show/watch/create/edit/delete.
///
/// Every operation checks the caller's capability on the schema's
/// resource before touching a collaborator.
#[derive(Debug, Clone)]
pub struct RecordService<D, B> {
    docs: D,
    blobs: B,
    gate: Arc<AuthorizationGate>,
    app_id: String,
}

impl<D: DocumentStore, B: BlobStore> RecordService<D, B> {
    pub fn new(docs: D, blobs: B, gate: Arc<AuthorizationGate>, app_id: impl Into<String>) -> Self {
        Self {
            docs,
            blobs,
            gate,
            app_id: app_id.into(),
        }
    }

    #[must_use]
    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    #[must_use]
    pub fn documents(&self) -> &D {
        &self.docs
    }

    /// Lists records sorted by id.
    ///
    /// # Errors
    ///
    /// [`RecordError::Access`] without view capability, or a collaborator error.
    pub async fn list(&self, who: &Authenticated, schema: &Schema) -> Result<Vec<Record>, RecordError> {
        let result: Result<Vec<Record>, RecordError> = async {
            let collection = self.authorize(who, schema, Capability::VIEW)?;
            Ok(self.docs.list(&collection).await?)
        }
        .await;
        log_failure("list", schema, result)
    }

    /// Reads one record.
    ///
    /// # Errors
    ///
    /// [`RecordError::NotFound`] when the record does not exist.
    pub async fn show(&self, who: &Authenticated, schema: &Schema, id: &str) -> Result<Record, RecordError> {
        let result: Result<Record, RecordError> = async {
            let path = self.locate(who, schema, Capability::VIEW, id)?;
            self.fetch(schema, &path).await
        }
        .await;
        log_failure("show", schema, result)
    }

    /// Opens a live view of one record. `on_change` receives `None`
    /// once the record is deleted.
    ///
    /// # Errors
    ///
    /// [`RecordError::NotFound`] when the record does not exist at open time.
    pub async fn watch<F>(
        &self,
        who: &Authenticated,
        schema: &Schema,
        id: &str,
        on_change: F,
    ) -> Result<Subscription, RecordError>
    where
        F: Fn(Option<Record>) + Send + Sync + 'static,
    {
        let result: Result<Subscription, RecordError> = async {
            let path = self.locate(who, schema, Capability::VIEW, id)?;
            self.fetch(schema, &path).await?;

            let resource = schema.resource;
            let on_error = move |e: StoreError| error!(resource = %resource, error = %e, "record watch failed");
            Ok(self.docs.subscribe(&path, on_change, on_error).await?)
        }
        .await;
        log_failure("watch", schema, result)
    }

    /// Creates a record, uploading attachments first.
    ///
    /// # Errors
    ///
    /// [`RecordError::Access`] without create capability; validation
    /// errors before any upload; collaborator errors.
    pub async fn create(
        &self,
        who: &Authenticated,
        schema: &Schema,
        input: RecordInput,
    ) -> Result<RecordOutcome, RecordError> {
        let result: Result<RecordOutcome, RecordError> = async {
            let collection = self.authorize(who, schema, Capability::CREATE)?;
            let mut fields = coerce(schema, &input, true)?;
            let id = match schema.id {
                IdStrategy::Auto => DocId::generate(),
                IdStrategy::FromField(name) => {
                    let raw = input.value(name).ok_or(RecordError::MissingField(name))?;
                    DocId::try_new(raw.trim().to_string())?
                }
            };

            self.upload_all(schema, &id, &input, &mut fields).await?;
            for spec in schema.attachments {
                if !fields.contains_key(spec.field) {
                    let empty = if spec.multiple {
                        Value::Array(Vec::new())
                    } else {
                        Value::String(String::new())
                    };
                    fields.insert(spec.field.to_string(), empty);
                }
            }

            self.docs.put(&collection.doc(id.clone()), fields).await?;
            info!(resource = %schema.resource, id = %id, "record created");
            Ok(RecordOutcome {
                navigate: Route::List(schema.resource),
                notice: Notice::success(format!("{} saved", label(schema))),
                id,
            })
        }
        .await;
        log_failure("create", schema, result)
    }

    /// Applies a partial update and returns to the list. Fields absent
    /// from `input` are kept.
    ///
    /// # Errors
    ///
    /// [`RecordError::NotFound`] (checked before validation and uploads),
    /// [`RecordError::ImmutableField`] when the input changes the id field.
    pub async fn edit(
        &self,
        who: &Authenticated,
        schema: &Schema,
        id: &str,
        input: RecordInput,
    ) -> Result<RecordOutcome, RecordError> {
        let result: Result<RecordOutcome, RecordError> = async {
            let path = self.locate(who, schema, Capability::EDIT, id)?;
            self.fetch(schema, &path).await?;

            if let IdStrategy::FromField(name) = schema.id {
                if input.value(name).is_some_and(|v| v.trim() != path.id().as_str()) {
                    return Err(RecordError::ImmutableField(name));
                }
            }

            let mut partial = coerce(schema, &input, false)?;
            self.upload_all(schema, path.id(), &input, &mut partial).await?;

            let id = path.id().clone();
            let navigate = Route::List(schema.resource);
            if partial.is_empty() {
                return Ok(RecordOutcome {
                    id,
                    navigate,
                    notice: Notice::info("No changes"),
                });
            }

            self.docs.update(&path, partial).await?;
            info!(resource = %schema.resource, id = %id, "record updated");
            Ok(RecordOutcome {
                id,
                navigate,
                notice: Notice::success(format!("{} updated", label(schema))),
            })
        }
        .await;
        log_failure("edit", schema, result)
    }

    /// Deletes a record. Deleting a missing record succeeds.
    ///
    /// # Errors
    ///
    /// [`RecordError::Access`] without delete capability, or a collaborator error.
    pub async fn delete(
        &self,
        who: &Authenticated,
        schema: &Schema,
        id: &str,
    ) -> Result<RecordOutcome, RecordError> {
        let result: Result<RecordOutcome, RecordError> = async {
            let path = self.locate(who, schema, Capability::DELETE, id)?;
            self.docs.delete(&path).await?;
            info!(resource = %schema.resource, id = %path.id(), "record deleted");
            Ok(RecordOutcome {
                id: path.id().clone(),
                navigate: Route::List(schema.resource),
                notice: Notice::success(format!("{} deleted", label(schema))),
            })
        }
        .await;
        log_failure("delete", schema, result)
    }

    fn authorize(
        &self,
        who: &Authenticated,
        schema: &Schema,
        required: Capability,
    ) -> Result<CollectionPath, RecordError> {
        self.gate.require(who.role(), schema.resource, required)?;
        Ok(schema.collection(&self.app_id)?)
    }

    fn locate(
        &self,
        who: &Authenticated,
        schema: &Schema,
        required: Capability,
        id: &str,
    ) -> Result<DocPath, RecordError> {
        let collection = self.authorize(who, schema, required)?;
        Ok(collection.doc(DocId::try_new(id.to_string())?))
    }

    async fn fetch(&self, schema: &Schema, path: &DocPath) -> Result<Record, RecordError> {
        self.docs
            .get(path)
            .await?
            .ok_or_else(|| RecordError::NotFound {
                resource: schema.resource,
                id: path.id().clone(),
            })
    }

    async fn upload_all(
        &self,
        schema: &Schema,
        id: &DocId,
        input: &RecordInput,
        fields: &mut Fields,
    ) -> Result<(), RecordError> {
        let millis = Utc::now().timestamp_millis();
        for spec in schema.attachments {
            let mut files: Vec<&Upload> = input
                .uploads()
                .iter()
                .filter(|u| u.field == spec.field)
                .collect();
            if files.is_empty() {
                continue;
            }
            // A single-file field keeps the last file chosen.
            if !spec.multiple {
                files.drain(..files.len() - 1);
            }

            let mut urls = Vec::with_capacity(files.len());
            for file in files {
                let key = spec.naming.key(id, millis, &file.file_name);
                let handle = self.blobs.upload(&key, file.bytes.clone()).await?;
                urls.push(Value::String(self.blobs.url(&handle).await?));
                debug!(resource = %schema.resource, key = %key, "attachment uploaded");
            }

            let value = if spec.multiple {
                Value::Array(urls)
            } else {
                urls.pop().unwrap_or(Value::Null)
            };
            fields.insert(spec.field.to_string(), value);
        }
        Ok(())
    }
}

/// Validates and converts raw values. On create, absent fields get
/// their empty value and absent required fields are an error.
fn coerce(schema: &Schema, input: &RecordInput, creating: bool) -> Result<Fields, RecordError> {
    let mut fields = Fields::new();
    for (name, raw) in input.values() {
        let Some(spec) = schema.field(name) else {
            if schema.attachment(name).is_some() {
                return Err(RecordError::InvalidField {
                    field: name.to_string(),
                    reason: "attach a file instead",
                });
            }
            return Err(RecordError::UnknownField {
                resource: schema.resource,
                field: name.to_string(),
            });
        };

        let value = if raw.trim().is_empty() {
            if spec.required {
                return Err(RecordError::MissingField(spec.name));
            }
            spec.kind.empty()
        } else {
            spec.kind
                .coerce(raw)
                .map_err(|reason| RecordError::InvalidField {
                    field: spec.name.to_string(),
                    reason,
                })?
        };
        fields.insert(spec.name.to_string(), value);
    }

    for upload in input.uploads() {
        if schema.attachment(&upload.field).is_none() {
            return Err(RecordError::UnknownField {
                resource: schema.resource,
                field: upload.field.clone(),
            });
        }
    }

    if creating {
        for spec in schema.fields {
            if fields.contains_key(spec.name) {
                continue;
            }
            if spec.required {
                return Err(RecordError::MissingField(spec.name));
            }
            fields.insert(spec.name.to_string(), spec.kind.empty());
        }
    }
    Ok(fields)
}

fn label(schema: &Schema) -> &'static str {
    match schema.resource {
        Resource::OnCall => "On-call report",
        Resource::Routine => "Routine inspection",
        Resource::Workers => "Worker",
        Resource::Assets => "Asset",
        Resource::Users => "User",
        Resource::Dashboard | Resource::Profile => "Record",
    }
}

fn log_failure<T>(op: &'static str, schema: &Schema, result: Result<T, RecordError>) -> Result<T, RecordError> {
    match &result {
        Err(e @ (RecordError::Store(_) | RecordError::Blob(_))) => {
            error!(op, resource = %schema.resource, error = %e, "record operation failed");
        }
        // Denials are already audited by the gate.
        Err(RecordError::Access(_)) | Ok(_) => {}
        Err(e) => debug!(op, resource = %schema.resource, error = %e, "record operation rejected"),
    }
    result
}
