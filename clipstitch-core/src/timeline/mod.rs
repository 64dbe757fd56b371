//! Timeline construction: contiguous segments at an exact rational cursor.

/// The Empty -> Building -> Sealed timeline builder and its sealed product.
pub mod builder;
