//! In-flight markers that reset themselves

/// RAII guard that holds a view's busy marker for the duration of a request.
///
/// The marker goes back to `T::default()` when the guard drops, which also
/// happens when the future owning it is cancelled mid-request.
pub(crate) struct InFlight<'a, T: Default> {
    slot: &'a mut T,
}

impl<'a, T: Default> InFlight<'a, T> {
    pub(crate) fn enter(slot: &'a mut T, value: T) -> Self {
        *slot = value;
        Self { slot }
    }
}

impl<T: Default> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        *self.slot = T::default();
    }
}
