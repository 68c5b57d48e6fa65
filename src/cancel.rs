use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{AutomatonError, Result};

/// A cooperative cancellation signal.
///
/// Long running constructions poll the token between iterations of their outer loops and abort with [`AutomatonError::Cancelled`] once it is set.
/// Clones share the same flag, so a token can be handed to another thread that requests the cancellation.
/// The default token is never cancelled unless [`CancelToken::cancel`] is called on it or one of its clones.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every operation observing this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Returns an error if cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(AutomatonError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_flag() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(token.check().is_ok());
        other.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.check(), Err(AutomatonError::Cancelled));
    }
}
