//! Core module - fundamental types and utilities

pub mod flags;
pub mod guid;
pub mod named_set;
pub mod nullable;
pub mod sandbox;
pub mod version;

pub use flags::{
    parse_flag_names, AuthScopeFlags, FlagsError, InputStateButtonFlags,
    IntegratedPlatformManagementFlags, NamedFlags, PlatformFlags,
};
pub use named_set::{NameChanged, NamedItem, NamedItemMut, NamedSet, SubscriptionId};
pub use sandbox::{SandboxId, SandboxIdError};
pub use version::{versions_equal, Version, VersionParseError};
