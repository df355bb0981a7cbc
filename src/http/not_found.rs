//! Registry of errors that mean "resource not found".
//!
//! Storage layers register their own not-found error types so the response
//! writer can answer 404 without knowing about them.

use std::error::Error;

use parking_lot::RwLock;
use thiserror::Error;

/// Generic not-found error, always recognised by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("resource not found")]
pub struct ResourceNotFound;

type Predicate = Box<dyn Fn(&(dyn Error + 'static)) -> bool + Send + Sync>;

#[derive(Default)]
pub struct NotFoundRegistry {
    predicates: RwLock<Vec<Predicate>>,
}

impl std::fmt::Debug for NotFoundRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotFoundRegistry")
            .field("registered", &self.predicates.read().len())
            .finish()
    }
}

impl NotFoundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat every error of type `E` as not found.
    pub fn register<E: Error + 'static>(&self) {
        self.predicates.write().push(Box::new(|err: &(dyn Error + 'static)| err.is::<E>()));
    }

    /// Treat errors of type `E` as not found when `predicate` holds.
    pub fn register_when<E, F>(&self, predicate: F)
    where
        E: Error + 'static,
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.predicates
            .write()
            .push(Box::new(move |err: &(dyn Error + 'static)| {
                err.downcast_ref::<E>().is_some_and(&predicate)
            }));
    }

    /// Checks `err` and every error in its source chain.
    pub fn is_not_found(&self, err: &(dyn Error + 'static)) -> bool {
        let predicates = self.predicates.read();
        let mut current = Some(err);
        while let Some(err) = current {
            if err.is::<ResourceNotFound>() || predicates.iter().any(|p| p(err)) {
                return true;
            }
            current = err.source();
        }
        false
    }
}
