//! Shared locking helper

use std::sync::{Mutex, MutexGuard};

/// Lock `mutex`, recovering the data if a holder panicked
///
/// Every guarded value here is replaced whole or counted, so a poisoned
/// lock still holds consistent data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_recovers_poisoned_data() {
        let mutex = std::sync::Arc::new(Mutex::new(1));
        let held = std::sync::Arc::clone(&mutex);
        let _ = std::thread::spawn(move || {
            let mut guard = held.lock().unwrap();
            *guard = 2;
            panic!("poison the lock");
        })
        .join();

        assert!(mutex.is_poisoned());
        assert_eq!(*lock(&mutex), 2);
    }
}
