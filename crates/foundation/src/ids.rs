use std::cell::Cell;

/// Source of fresh identifiers for migrated documents and selection bookkeeping.
///
/// Every id handed out by a production source must be collision-free across
/// runs. Deterministic sources exist so tests can compare whole documents.
pub trait IdSource {
    fn generate(&self) -> String;
}

/// Random identifiers (UUID v4, simple form without hyphens).
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Always returns the same id.
#[derive(Debug, Clone)]
pub struct FixedIds(pub String);

impl FixedIds {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl IdSource for FixedIds {
    fn generate(&self) -> String {
        self.0.clone()
    }
}

/// `<prefix>1`, `<prefix>2`, ... in call order.
#[derive(Debug, Default)]
pub struct SequentialIds {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(1),
        }
    }
}

impl IdSource for SequentialIds {
    fn generate(&self) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("{}{n}", self.prefix)
    }
}

impl<T: IdSource + ?Sized> IdSource for &T {
    fn generate(&self) -> String {
        (**self).generate()
    }
}
