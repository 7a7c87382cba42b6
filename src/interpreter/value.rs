/// The `Value` enum and the array, object and pointer cells it shares.
///
/// Also implements rendering (the text `Io::print` and `..` produce) and
/// truthiness.
pub mod core;
/// Structural value keys.
///
/// Defines `ValueKey`, a hashable mirror of a value used for `==`, object
/// entry lookup and the arena's literal cache.
pub mod key;
/// Struct and tag descriptors and their instances.
pub mod entity;
/// Closures and native functions.
pub mod function;

pub use self::core::Value;
