//! Resource writer
//!
//! Runs the interceptor chain around every create, update and delete.
//! Creates receive a numeric `ID` from the `<type>_ID` sequence.

use std::sync::Arc;

use serde_json::Value;

use super::errors::{WriteError, WriteResult};
use super::interceptor::{InterceptorChain, WriteEvent};
use super::store::{DocumentWriter, SequenceGenerator};
use crate::observability::{Event, Logger, ObservationScope};
use crate::schema::REFERENCE_ID_KEY;

/// Field that receives the sequence value on create
pub const SEQUENCE_ID_FIELD: &str = "ID";

/// Name of the sequence backing `SEQUENCE_ID_FIELD` for a type
pub fn sequence_name(resource_type: &str) -> String {
    format!("{}_{}", resource_type, SEQUENCE_ID_FIELD)
}

/// Writes resources through an interceptor chain
pub struct ResourceWriter<W: DocumentWriter, Q: SequenceGenerator> {
    writer: Arc<W>,
    sequence: Arc<Q>,
    interceptors: InterceptorChain,
    id_field: String,
}

impl<W: DocumentWriter, Q: SequenceGenerator> ResourceWriter<W, Q> {
    pub fn new(writer: Arc<W>, sequence: Arc<Q>, interceptors: InterceptorChain) -> Self {
        Self {
            writer,
            sequence,
            interceptors,
            id_field: REFERENCE_ID_KEY.to_string(),
        }
    }

    /// Overrides the field used to locate documents on update and delete
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    pub fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    /// Creates a resource.
    ///
    /// # Errors
    ///
    /// - `InvalidDocument` when `document` is not an object
    /// - `Rejected` when an interceptor refuses
    /// - `Sequence` when no ID could be assigned
    /// - `Store` when the insert fails
    pub async fn create(&self, resource_type: &str, document: Value) -> WriteResult<Value> {
        let scope = ObservationScope::with_fields("WRITE_CREATE", &[("type", resource_type)]);

        if !document.is_object() {
            let err = WriteError::InvalidDocument(format!(
                "{} document must be a JSON object",
                resource_type
            ));
            scope.fail(&err.to_string());
            return Err(err);
        }

        let event = WriteEvent::create(resource_type, document);
        if let Err(err) = self.interceptors.run_before(&event) {
            scope.fail(&err.to_string());
            return Err(err);
        }

        let id = match self.sequence.next(&sequence_name(resource_type)).await {
            Ok(id) => id,
            Err(err) => {
                scope.fail(err.message());
                return Err(WriteError::Sequence(err.message().to_string()));
            }
        };

        let mut stored = event.payload.clone().unwrap_or(Value::Null);
        if let Value::Object(map) = &mut stored {
            map.insert(SEQUENCE_ID_FIELD.to_string(), Value::from(id));
        }

        if let Err(err) = self.writer.insert(resource_type, stored.clone()).await {
            scope.fail(err.message());
            return Err(WriteError::Store(err));
        }

        self.interceptors.run_after(&event, &stored);
        let id_str = id.to_string();
        Logger::event(
            Event::WriteCommitted,
            &[("id", id_str.as_str()), ("op", "create"), ("type", resource_type)],
        );
        scope.complete();
        Ok(stored)
    }

    /// Applies a partial document to an existing resource
    pub async fn update(&self, resource_type: &str, id: &str, patch: Value) -> WriteResult<Value> {
        let scope =
            ObservationScope::with_fields("WRITE_UPDATE", &[("id", id), ("type", resource_type)]);

        let Value::Object(fields) = &patch else {
            let err = WriteError::InvalidDocument(format!(
                "{} patch must be a JSON object",
                resource_type
            ));
            scope.fail(&err.to_string());
            return Err(err);
        };
        let fields = fields.clone();

        let event = WriteEvent::update(resource_type, id, patch);
        let outcome = match self.interceptors.run_before(&event) {
            Ok(()) => self
                .writer
                .update(resource_type, &self.id_field, id, &fields)
                .await
                .map_err(WriteError::from),
            Err(err) => Err(err),
        };
        let updated = match outcome {
            Ok(Some(document)) => document,
            Ok(None) => {
                let err = WriteError::not_found(resource_type, id);
                scope.fail(&err.to_string());
                return Err(err);
            }
            Err(err) => {
                scope.fail(&err.to_string());
                return Err(err);
            }
        };

        self.interceptors.run_after(&event, &updated);
        Logger::event(
            Event::WriteCommitted,
            &[("id", id), ("op", "update"), ("type", resource_type)],
        );
        scope.complete();
        Ok(updated)
    }

    /// Deletes a resource, returning the removed document
    pub async fn delete(&self, resource_type: &str, id: &str) -> WriteResult<Value> {
        let scope =
            ObservationScope::with_fields("WRITE_DELETE", &[("id", id), ("type", resource_type)]);

        let event = WriteEvent::delete(resource_type, id);
        let outcome = match self.interceptors.run_before(&event) {
            Ok(()) => self
                .writer
                .delete(resource_type, &self.id_field, id)
                .await
                .map_err(WriteError::from),
            Err(err) => Err(err),
        };
        let removed = match outcome {
            Ok(Some(document)) => document,
            Ok(None) => {
                let err = WriteError::not_found(resource_type, id);
                scope.fail(&err.to_string());
                return Err(err);
            }
            Err(err) => {
                scope.fail(&err.to_string());
                return Err(err);
            }
        };

        self.interceptors.run_after(&event, &removed);
        Logger::event(
            Event::WriteCommitted,
            &[("id", id), ("op", "delete"), ("type", resource_type)],
        );
        scope.complete();
        Ok(removed)
    }
}
