//! Correlation identifiers for log entries.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Produces the short token that ties a console line to its collector entry.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn next_id(&self) -> String {
        self()
    }
}

/// Random alphanumeric tokens.
#[derive(Debug, Clone, Copy)]
pub struct RandomIds {
    len: usize,
}

impl RandomIds {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new(8)
    }
}

impl IdGenerator for RandomIds {
    fn next_id(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.len)
            .map(char::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_random_ids_shape() {
        let ids = RandomIds::default();
        let id = ids.next_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_closure_generator() {
        let counter = AtomicUsize::new(0);
        let ids = move || format!("id-{}", counter.fetch_add(1, Ordering::SeqCst));
        assert_eq!(ids.next_id(), "id-0");
        assert_eq!(ids.next_id(), "id-1");
    }
}
