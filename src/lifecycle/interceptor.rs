//! Write interceptors
//!
//! Interceptors run in registration order before a write reaches the store.
//! The first refusal stops the chain; later interceptors never see the event.

use std::sync::Arc;

use serde_json::Value;

use super::errors::{WriteError, WriteResult};
use crate::observability::{Event, Logger};

/// Kind of write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

impl WriteOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteOp::Create => "create",
            WriteOp::Update => "update",
            WriteOp::Delete => "delete",
        }
    }
}

/// A write about to happen
#[derive(Debug, Clone, PartialEq)]
pub struct WriteEvent {
    pub op: WriteOp,
    pub resource_type: String,
    /// Target identifier; absent on create
    pub id: Option<String>,
    /// New document on create, partial document on update
    pub payload: Option<Value>,
}

impl WriteEvent {
    pub fn create(resource_type: impl Into<String>, document: Value) -> Self {
        Self {
            op: WriteOp::Create,
            resource_type: resource_type.into(),
            id: None,
            payload: Some(document),
        }
    }

    pub fn update(resource_type: impl Into<String>, id: impl Into<String>, patch: Value) -> Self {
        Self {
            op: WriteOp::Update,
            resource_type: resource_type.into(),
            id: Some(id.into()),
            payload: Some(patch),
        }
    }

    pub fn delete(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            op: WriteOp::Delete,
            resource_type: resource_type.into(),
            id: Some(id.into()),
            payload: None,
        }
    }
}

/// Hook around store writes
pub trait Interceptor: Send + Sync {
    /// Name reported when this interceptor refuses a write
    fn name(&self) -> &str;

    /// Called before the write; `Err(reason)` refuses it
    fn before(&self, event: &WriteEvent) -> Result<(), String>;

    /// Called after a committed write with the stored document
    fn after(&self, _event: &WriteEvent, _document: &Value) {}
}

/// Ordered interceptor list
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interceptor
    pub fn with(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Runs every `before` hook in order, stopping at the first refusal
    pub fn run_before(&self, event: &WriteEvent) -> WriteResult<()> {
        for interceptor in &self.interceptors {
            if let Err(reason) = interceptor.before(event) {
                Logger::event(
                    Event::WriteRejected,
                    &[
                        ("interceptor", interceptor.name()),
                        ("op", event.op.as_str()),
                        ("reason", reason.as_str()),
                        ("type", event.resource_type.as_str()),
                    ],
                );
                return Err(WriteError::rejected(interceptor.name(), reason));
            }
        }
        Ok(())
    }

    /// Runs every `after` hook in order
    pub fn run_after(&self, event: &WriteEvent, document: &Value) {
        for interceptor in &self.interceptors {
            interceptor.after(event, document);
        }
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.interceptors.iter().map(|i| i.name()).collect();
        f.debug_struct("InterceptorChain")
            .field("interceptors", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        name: &'static str,
        calls: Arc<AtomicUsize>,
        refuse: bool,
    }

    impl Interceptor for Counting {
        fn name(&self) -> &str {
            self.name
        }

        fn before(&self, _event: &WriteEvent) -> Result<(), String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.refuse {
                Err("locked".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_first_refusal_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = InterceptorChain::new()
            .with(Counting {
                name: "first",
                calls: calls.clone(),
                refuse: false,
            })
            .with(Counting {
                name: "second",
                calls: calls.clone(),
                refuse: true,
            })
            .with(Counting {
                name: "third",
                calls: calls.clone(),
                refuse: false,
            });

        let err = chain
            .run_before(&WriteEvent::delete("item", "7"))
            .unwrap_err();
        match err {
            WriteError::Rejected {
                interceptor,
                reason,
            } => {
                assert_eq!(interceptor, "second");
                assert_eq!(reason, "locked");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_chain_accepts() {
        let chain = InterceptorChain::new();
        assert!(chain.is_empty());
        assert!(chain
            .run_before(&WriteEvent::create("item", json!({})))
            .is_ok());
    }

    #[test]
    fn test_event_constructors() {
        let event = WriteEvent::update("item", "3", json!({"name": "x"}));
        assert_eq!(event.op, WriteOp::Update);
        assert_eq!(event.id.as_deref(), Some("3"));
        assert!(WriteEvent::delete("item", "3").payload.is_none());
    }
}
