use std::sync::Arc;

use super::defaults::engine_handler;
use super::{Handler, Operation, Scope};
use crate::error::SqlHooksError;

/// Ordered, named handlers for one operation.
#[derive(Clone)]
pub struct CallbackProcessor {
    operation: Operation,
    entries: Vec<(String, Handler)>,
}

impl CallbackProcessor {
    #[must_use]
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The handler currently registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Handler> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, handler)| Arc::clone(handler))
    }

    /// Append a handler under a new name.
    ///
    /// # Errors
    /// Returns `ConfigError` if `name` is already registered.
    pub fn register(&mut self, name: impl Into<String>, handler: Handler) -> Result<(), SqlHooksError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(SqlHooksError::ConfigError(format!(
                "callback {name:?} is already registered for {}",
                self.operation
            )));
        }
        self.entries.push((name, handler));
        Ok(())
    }

    /// Swap the handler registered under `name`, keeping its position.
    ///
    /// # Errors
    /// Returns `ConfigError` if `name` is not registered.
    pub fn replace(&mut self, name: &str, handler: Handler) -> Result<(), SqlHooksError> {
        let slot = self
            .entries
            .iter_mut()
            .find(|(entry, _)| entry == name)
            .ok_or_else(|| {
                SqlHooksError::ConfigError(format!(
                    "callback {name:?} is not registered for {}",
                    self.operation
                ))
            })?;
        slot.1 = handler;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Handler> {
        let idx = self.entries.iter().position(|(entry, _)| entry == name)?;
        Some(self.entries.remove(idx).1)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(entry, _)| entry == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run the handlers in order. Stops at the first error recorded on the
    /// scope.
    pub async fn execute(&self, mut scope: Scope) -> Scope {
        for (_, handler) in &self.entries {
            if scope.has_error() {
                break;
            }
            scope = handler(scope).await;
        }
        scope
    }
}

/// One [`CallbackProcessor`] per [`Operation`].
#[derive(Clone)]
pub struct Callbacks {
    processors: [CallbackProcessor; 5],
}

impl Callbacks {
    /// Processors with nothing registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            processors: Operation::ALL.map(CallbackProcessor::new),
        }
    }

    /// Processors holding the engine's own handler for each operation.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut callbacks = Self::empty();
        for op in Operation::ALL {
            callbacks.processors[op.index()]
                .entries
                .push((op.callback_name().to_string(), engine_handler()));
        }
        callbacks
    }

    #[must_use]
    pub fn processor(&self, operation: Operation) -> &CallbackProcessor {
        &self.processors[operation.index()]
    }

    pub fn processor_mut(&mut self, operation: Operation) -> &mut CallbackProcessor {
        &mut self.processors[operation.index()]
    }
}

impl Default for Callbacks {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for processor in &self.processors {
            map.entry(&processor.operation, &processor.names().collect::<Vec<_>>());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::handler_fn;
    use crate::results::ResultSet;

    fn counting(rows: usize) -> Handler {
        handler_fn(move |mut scope: Scope| async move {
            let seen = scope.rows_affected();
            scope.set_result(ResultSet::from_rows_affected(seen + rows));
            scope
        })
    }

    #[test]
    fn defaults_register_every_extension_point() {
        let callbacks = Callbacks::with_defaults();
        for op in Operation::ALL {
            let names: Vec<_> = callbacks.processor(op).names().collect();
            assert_eq!(names, vec![op.callback_name()]);
        }
    }

    #[test]
    fn replace_requires_existing_name() {
        let mut processor = CallbackProcessor::new(Operation::Create);
        assert!(matches!(
            processor.replace("engine:create", counting(1)),
            Err(SqlHooksError::ConfigError(_))
        ));
        processor.register("engine:create", counting(1)).unwrap();
        assert!(processor.register("engine:create", counting(1)).is_err());
        processor.replace("engine:create", counting(2)).unwrap();
        assert_eq!(processor.len(), 1);
        assert!(processor.remove("engine:create").is_some());
        assert!(processor.is_empty());
    }

    #[tokio::test]
    async fn execute_runs_in_order_and_stops_on_error() {
        let mut processor = CallbackProcessor::new(Operation::Update);
        processor.register("first", counting(1)).unwrap();
        processor
            .register(
                "fail",
                handler_fn(|mut scope: Scope| async move {
                    scope.set_error(SqlHooksError::InvalidTransaction);
                    scope
                }),
            )
            .unwrap();
        processor.register("never", counting(100)).unwrap();

        let scope = processor
            .execute(Scope::detached(Operation::Update, "UPDATE t SET a = 1", vec![]))
            .await;
        assert_eq!(scope.rows_affected(), 1);
        assert!(matches!(scope.into_result(), Err(SqlHooksError::InvalidTransaction)));
    }
}
