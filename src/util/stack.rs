/// Remaining stack below which recursion switches to a freshly allocated
/// segment.
const RED_ZONE: usize = 128 * 1024;

/// Size of each segment allocated when the red zone is reached.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Runs `f`, first growing the stack when less than the red zone remains.
///
/// Every recursive walk over source nesting or value nesting goes through
/// this, so deeply nested programs and data fail with an error (or succeed)
/// instead of overflowing the thread's stack.
///
/// # Example
/// ```
/// use noktoy::util::stack::ensure_sufficient_stack;
///
/// fn depth(n: u64) -> u64 {
///     ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
/// }
///
/// assert_eq!(depth(100_000), 100_000);
/// ```
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
