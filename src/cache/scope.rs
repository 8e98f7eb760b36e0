//! Cooperative liveness tracking for fetch owners.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Liveness flag shared between a fetch owner and its in-flight work.
///
/// The executor consults the flag after every suspension point and discards
/// results once the owner is gone. Nothing is forcibly cancelled through it.
#[derive(Debug, Clone)]
pub struct Scope {
  live: Arc<AtomicBool>,
}

impl Scope {
  pub fn is_live(&self) -> bool {
    self.live.load(Ordering::Acquire)
  }
}

/// Owning side of a [`Scope`]. Dropping the handle marks the scope dead.
#[derive(Debug)]
pub struct ScopeHandle {
  live: Arc<AtomicBool>,
}

impl ScopeHandle {
  pub fn new() -> Self {
    Self {
      live: Arc::new(AtomicBool::new(true)),
    }
  }

  /// A flag to hand to in-flight work.
  pub fn scope(&self) -> Scope {
    Scope {
      live: Arc::clone(&self.live),
    }
  }

  /// Mark the scope dead without dropping the handle.
  pub fn close(&self) {
    self.live.store(false, Ordering::Release);
  }
}

impl Drop for ScopeHandle {
  fn drop(&mut self) {
    self.close();
  }
}

impl Default for ScopeHandle {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scope_dies_with_its_handle() {
    let handle = ScopeHandle::new();
    let scope = handle.scope();
    assert!(scope.is_live());

    drop(handle);
    assert!(!scope.is_live());
  }

  #[test]
  fn close_marks_all_clones_dead() {
    let handle = ScopeHandle::new();
    let scope = handle.scope();
    let clone = scope.clone();

    handle.close();
    assert!(!scope.is_live());
    assert!(!clone.is_live());
  }
}
