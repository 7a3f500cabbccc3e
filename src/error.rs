use alloc::collections::TryReserveError;

/// Failures reported by the store's data structures.
///
/// Every fallible operation leaves the structure it was called on unchanged
/// when it returns an error.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// An insert found the key already present.
    #[error("key already exists")]
    KeyExists,
    /// A remove or neighbour lookup did not find the key.
    #[error("key does not exist")]
    KeyDoesNotExist,
    /// A bulk build received entries that are not in ascending key order.
    #[error("entries are not sorted in ascending key order")]
    NotSorted,
    /// Growing an internal buffer failed.
    #[error("allocation failed: {0}")]
    Alloc(#[from] TryReserveError),
}
