//! Shared primitive types used across the engine.

/// Opaque subscriber identifier, unique within a tenant.
pub type SubscriberId = String;

/// Owning organization of a subscriber (multi-tenant partition key).
pub type TenantId = String;

/// A signed count of calendar days between two dates.
pub type DayCount = i64;
