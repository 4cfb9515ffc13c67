// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros shared across the tickwork crates.

/// `Display` for a fieldless enum, writing each variant's wire name.
///
/// The names must agree with the enum's `serde(rename_all)` so that log
/// lines and notification payloads spell kinds the same way.
///
/// ```ignore
/// crate::simple_display! {
///     ChunkPhase {
///         Idle => "idle",
///         FindEntities => "find_entities",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($ty:ty { $( $variant:ident => $name:literal ),+ $(,)? }) => {
        impl $ty {
            /// Wire name of this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
