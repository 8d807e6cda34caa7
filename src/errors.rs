//! Error classification traits shared by the client and the retry policy.

/// Trait for errors that can be classified as retryable or permanent.
///
/// Two levels of retryability are distinguished:
///
/// 1. **Request-level** (`is_retryable`): whether re-sending the exact same
///    request might succeed. Only transport failures (connection errors,
///    timeouts, bad HTTP status) qualify. Application errors reported by the
///    service never do: re-sending a rejected login or a request made with an
///    empty balance cannot change the outcome.
///
/// 2. **Operation-level** (`should_retry_operation`): whether issuing the
///    operation again later might succeed, e.g. polling for a message that has
///    not arrived yet, or asking for a number once the pool refills.
///
/// # Examples
///
/// ```rust
/// use haozhu::RetryableError;
///
/// enum MyError {
///     ConnectionReset,
///     StillWaiting,
///     BadPassword,
/// }
///
/// impl RetryableError for MyError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, MyError::ConnectionReset)
///     }
///
///     fn should_retry_operation(&self) -> bool {
///         matches!(self, MyError::ConnectionReset | MyError::StillWaiting)
///     }
/// }
/// ```
pub trait RetryableError {
    /// Returns true if this error is a transient transport failure and the
    /// same request may be sent again.
    fn is_retryable(&self) -> bool;

    /// Returns true if repeating the operation later might succeed.
    ///
    /// Default implementation returns the same as `is_retryable()`.
    fn should_retry_operation(&self) -> bool {
        self.is_retryable()
    }
}
