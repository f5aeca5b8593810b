//! RAII guard for environment variables touched by tests.
//!
//! Config and path resolution read `ETU_*` variables from the process
//! environment. Tests that set them must restore the previous value even when
//! an assertion panics, and must run `#[serial]` because the environment is
//! process-global.

use std::env;
use std::ffi::{OsStr, OsString};

/// Snapshots one environment variable and restores it (or its absence) on drop.
pub struct EnvGuard {
    key: String,
    original: Option<OsString>,
}

impl EnvGuard {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            original: env::var_os(key),
        }
    }

    /// Snapshot `key` and set it to `value`.
    ///
    /// # Safety
    /// Mutates the process environment; callers must be `#[serial]`.
    pub unsafe fn set(key: &str, value: impl AsRef<OsStr>) -> Self {
        let guard = Self::new(key);
        unsafe { env::set_var(key, value) };
        guard
    }

    /// Snapshot `key` and remove it.
    ///
    /// # Safety
    /// Mutates the process environment; callers must be `#[serial]`.
    pub unsafe fn remove(key: &str) -> Self {
        let guard = Self::new(key);
        unsafe { env::remove_var(key) };
        guard
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: guarded tests are #[serial].
        match &self.original {
            Some(val) => unsafe { env::set_var(&self.key, val) },
            None => unsafe { env::remove_var(&self.key) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_restores_previous_value() {
        let key = "ETU_TEST_GUARD_EXISTING";
        let _outer = unsafe { EnvGuard::set(key, "before") };
        {
            let _inner = unsafe { EnvGuard::set(key, "during") };
            assert_eq!(env::var(key).unwrap(), "during");
        }
        assert_eq!(env::var(key).unwrap(), "before");
    }

    #[test]
    #[serial]
    fn test_removes_variable_that_was_absent() {
        let key = "ETU_TEST_GUARD_ABSENT";
        let _outer = unsafe { EnvGuard::remove(key) };
        {
            let _inner = unsafe { EnvGuard::set(key, "temporary") };
            assert!(env::var(key).is_ok());
        }
        assert!(env::var(key).is_err());
    }
}
