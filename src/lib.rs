//! Plugin runtime for the OC component registry.
//!

pub use oc_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use oc_internal::prelude::*;
}
