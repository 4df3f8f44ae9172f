//! Mutual exclusion for the board state shared between client calls and the display refresh.

/// Any type that can implement `IOMutex` can guard the [`BoardState`](crate::board::BoardState)
/// shared by the client-facing [`Board`](crate::Board) handle and the display
/// [`Refresher`](crate::Refresher).
///
/// If the `std` feature is enabled, then `IOMutex` is implemented for `std::sync::Mutex`. If
/// `cortexm` is enabled, then `IOMutex` is implemented for
/// `cortex_m::interrupt::Mutex<core::cell::RefCell>`, so that a refresh driven from a timer
/// interrupt and the main loop never observe a half-written frame.
///
/// If either of these features is enabled, then the type alias [`DefaultMutex<T>`] will point to
/// the corresponding mutex type to use. With both enabled, `std` wins.
pub trait IOMutex<T> {
    /// Construct a new instance of this mutex containing the value `v`.
    fn new(v: T) -> Self;

    /// Lock the mutex and call the closure `f` as a critical section, passing a mutable reference
    /// to the owned value. Returns the value returned by `f`.
    ///
    /// Keep `f` short: the refresh loop takes this lock once per digit.
    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R;
}

#[cfg(feature = "std")]
pub type DefaultMutex<T> = std::sync::Mutex<T>;

#[cfg(all(feature = "cortexm", not(feature = "std")))]
pub type DefaultMutex<T> = cortex_m::interrupt::Mutex<core::cell::RefCell<T>>;

#[cfg(feature = "std")]
impl<T> IOMutex<T> for std::sync::Mutex<T> {
    fn new(v: T) -> Self {
        std::sync::Mutex::new(v)
    }
    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        // A panic while holding the lock cannot leave the state torn: every critical section is a
        // plain copy or a single assignment.
        let mut v = match std::sync::Mutex::lock(self) {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut v)
    }
}

#[cfg(feature = "cortexm")]
impl<T> IOMutex<T> for cortex_m::interrupt::Mutex<core::cell::RefCell<T>> {
    fn new(v: T) -> Self {
        cortex_m::interrupt::Mutex::new(core::cell::RefCell::new(v))
    }
    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        cortex_m::interrupt::free(|cs| {
            let mut v = self.borrow(cs).borrow_mut();
            f(&mut v)
        })
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn lock_returns_closure_value() {
        let m: DefaultMutex<u8> = IOMutex::new(0b0000_0001);
        let old = IOMutex::lock(&m, |v| {
            let old = *v;
            *v |= 0b1000_0000;
            old
        });
        assert_eq!(old, 0b0000_0001);
        assert_eq!(IOMutex::lock(&m, |v| *v), 0b1000_0001);
    }

    #[test]
    fn lock_survives_poisoning() {
        use std::sync::Arc;

        let m: Arc<DefaultMutex<u8>> = Arc::new(IOMutex::new(7));
        let m2 = m.clone();
        let _ = std::thread::spawn(move || {
            IOMutex::lock(&*m2, |_| panic!("poison"));
        })
        .join();
        assert_eq!(IOMutex::lock(&*m, |v| *v), 7);
    }
}
