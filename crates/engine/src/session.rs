// Session capability: whether a user is currently signed in.
//
// Passed explicitly into the engine instead of read from ambient global
// state; the layer that owns credentials flips it on login/logout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Session {
    signed_in: Arc<AtomicBool>,
}

impl Session {
    /// A signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that starts signed in.
    pub fn authenticated() -> Self {
        let session = Self::new();
        session.sign_in();
        session
    }

    pub fn sign_in(&self) {
        self.signed_in.store(true, Ordering::SeqCst);
    }

    pub fn sign_out(&self) {
        self.signed_in.store(false, Ordering::SeqCst);
    }

    pub fn is_authenticated(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }
}
