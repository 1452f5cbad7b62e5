//! Fallible construction.
//!
//! | Pattern | Use When |
//! |---------|----------|
//! | `new()` | Construction always succeeds |
//! | [`TryNew`] | Construction validates its input |
//! | `TryFrom<T>` | Converting from another domain type |
//!
//! Types that implement [`TryNew`] do not also offer an unchecked `new()`
//! with the same meaning; the `try_` prefix keeps fallibility visible at
//! the call site.

/// Validated constructor.
///
/// ```
/// use siap_types::TryNew;
///
/// struct Latitude(f64);
///
/// #[derive(Debug, PartialEq)]
/// struct OutOfRange(f64);
///
/// impl TryNew for Latitude {
///     type Error = OutOfRange;
///     type Args = f64;
///
///     fn try_new(deg: f64) -> Result<Self, Self::Error> {
///         if !(-90.0..=90.0).contains(&deg) {
///             return Err(OutOfRange(deg));
///         }
///         Ok(Latitude(deg))
///     }
/// }
///
/// assert!(Latitude::try_new(-6.2).is_ok());
/// assert_eq!(Latitude::try_new(120.0).err(), Some(OutOfRange(120.0)));
/// ```
pub trait TryNew {
    /// Why construction was rejected.
    type Error;

    /// Construction input; use a tuple or a struct for several values.
    type Args;

    /// Attempts to build a validated value.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` describing the rejected input.
    fn try_new(args: Self::Args) -> Result<Self, Self::Error>
    where
        Self: Sized;
}
