// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier newtypes

use crate::clock::Tick;
use crate::job::JobKind;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// String identifier newtype backed by `SmolStr`.
///
/// Serializes as a bare string and compares directly against `&str`.
/// `Ord` keeps per-agent iteration deterministic.
macro_rules! define_id {
    ($(#[$meta:meta])* pub struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(SmolStr);

        impl $name {
            pub fn new(id: impl Into<SmolStr>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Identifier of an autonomous agent (a controllable character).
    ///
    /// Assigned by the host; the core never mints agent IDs.
    pub struct AgentId;
}

define_id! {
    /// Identifier of one accepted command, carried by every lifecycle event
    /// for that command.
    pub struct ActionId;
}

impl ActionId {
    /// Derive the action ID for a command of `kind` accepted for `agent` at `tick`.
    ///
    /// Format: `{kind}:{agent}:{tick}`. Re-issuing the same command for the
    /// same agent in the same tick yields the same ID, which callers treat as
    /// an idempotent resubmission.
    pub fn generate(agent: &AgentId, kind: JobKind, tick: Tick) -> Self {
        Self::new(format!("{kind}:{agent}:{}", tick.get()))
    }

    /// Job kind prefix of a generated ID, if it parses.
    pub fn kind(&self) -> Option<JobKind> {
        let (prefix, _) = self.0.split_once(':')?;
        prefix.parse().ok()
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
