/// A guard that runs a cleanup function when dropped.
///
/// Used to restore the host terminal on both normal exit and panic: when
/// the stack unwinds the guard is dropped and its callback still runs.
///
/// # Examples
///
/// ```
/// use kpa_term::utils::guard::Guard;
///
/// let _guard = Guard::with(|| {
///     println!("Cleanup executed!");
/// });
/// // Cleanup runs when _guard goes out of scope
/// ```
pub struct Guard<AtExit: FnOnce()> {
    exit_cb: Option<AtExit>,
}

impl<F: FnOnce()> Guard<F> {
    /// Creates a guard that calls `f` on drop.
    pub fn with(f: F) -> Self {
        Self { exit_cb: Some(f) }
    }

    /// Drop the guard without running its callback.
    pub fn disarm(mut self) {
        self.exit_cb = None;
    }
}

impl<F: FnOnce()> Drop for Guard<F> {
    fn drop(&mut self) {
        if let Some(f) = self.exit_cb.take() {
            f()
        }
    }
}
