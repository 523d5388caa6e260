//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** — two instances
/// with the same attribute values are the same value. Settlement results,
/// money amounts, and rates are all value objects: they carry no identity and
/// are never mutated after construction, which makes them safe to share and
/// recompute freely.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
