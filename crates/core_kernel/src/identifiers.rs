//! Identifiers for sessions, requests, and correlation
//!
//! Newtype wrappers around UUIDs keep correlation ids and session ids from
//! being mixed up. `RequestId` is different: it is a per-session monotonic
//! counter used to decide whether a completion is still the latest one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

// Sent to the prediction service as `x-request-id`
define_id!(CorrelationId, "REQ");

// One per interactive session, attached to log spans
define_id!(SessionId, "SES");

/// Sequence number of a remote operation within one session
///
/// Ids are strictly increasing; the zero id is never issued and stands for
/// "nothing in flight".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// The id that no operation ever carries
    pub const NONE: RequestId = RequestId(0);

    /// Returns the raw sequence number
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues monotonic `RequestId`s
#[derive(Debug, Clone, Default)]
pub struct RequestSequence {
    last: u64,
}

impl RequestSequence {
    /// Creates a sequence whose first issued id is `#1`
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next id
    pub fn next_id(&mut self) -> RequestId {
        self.last += 1;
        RequestId(self.last)
    }

    /// Returns the most recently issued id, or `RequestId::NONE`
    pub fn latest(&self) -> RequestId {
        RequestId(self.last)
    }

    /// Returns true if `id` is the most recently issued id
    pub fn is_latest(&self, id: RequestId) -> bool {
        id != RequestId::NONE && id.0 == self.last
    }
}
