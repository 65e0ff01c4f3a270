//! Guarded setters
//!
//! A gate wraps a plain setter with a guard supplied at the call site. When
//! the guard refuses the proposed value, the setter is not called, the
//! pending value stays as it was and `on_denied` is told why.
//!
//! ```rust
//! use wifiwidget::reversible::gate::{gated, when};
//!
//! let mut brightness = 3;
//! let mut denied = false;
//! let result = gated(11, when(|v: &i32| *v <= 10), |_, _| denied = true, |v| brightness = v);
//! assert!(result.is_err());
//! assert!(denied);
//! assert_eq!(brightness, 3);
//! ```

/// Apply `set(proposed)` only if `guard` accepts it.
pub fn gated<A, D>(
    proposed: A,
    guard: impl FnOnce(&A) -> Result<(), D>,
    on_denied: impl FnOnce(&A, &D),
    set: impl FnOnce(A),
) -> Result<(), D> {
    match guard(&proposed) {
        Ok(()) => {
            set(proposed);
            Ok(())
        }
        Err(denial) => {
            on_denied(&proposed, &denial);
            Err(denial)
        }
    }
}

/// Turn a boolean predicate into a guard whose denial carries no reason.
pub fn when<A>(predicate: impl FnOnce(&A) -> bool) -> impl FnOnce(&A) -> Result<(), ()> {
    move |proposed: &A| if predicate(proposed) { Ok(()) } else { Err(()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Denial {
        TooLarge,
    }

    #[test]
    fn test_accepted_value_is_set() {
        let mut target = 0;
        let result: Result<(), Denial> = gated(4, |_| Ok(()), |_, _| unreachable!(), |v| target = v);
        assert_eq!(result, Ok(()));
        assert_eq!(target, 4);
    }

    #[test]
    fn test_denial_reason_reaches_callback_and_caller() {
        let mut target = 0;
        let mut seen = None;
        let result = gated(
            99,
            |v| if *v > 10 { Err(Denial::TooLarge) } else { Ok(()) },
            |v, d| seen = Some((*v, format!("{:?}", d))),
            |v| target = v,
        );
        assert_eq!(result, Err(Denial::TooLarge));
        assert_eq!(target, 0);
        assert_eq!(seen, Some((99, "TooLarge".to_string())));
    }

    #[test]
    fn test_predicate_guard() {
        let mut target = 1;
        assert_eq!(gated(2, when(|v: &i32| v % 2 == 0), |_, _| {}, |v| target = v), Ok(()));
        assert_eq!(gated(3, when(|v: &i32| v % 2 == 0), |_, _| {}, |v| target = v), Err(()));
        assert_eq!(target, 2);
    }
}
