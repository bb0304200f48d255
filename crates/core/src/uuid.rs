// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! A `UUID4` Universally Unique Identifier (UUID) version 4 (RFC 4122).

use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Represents a Universally Unique Identifier (UUID)
/// version 4 based on a 128-bit label as specified in RFC 4122.
#[repr(C)]
#[derive(Copy, Clone, Hash, PartialEq, Eq)]
pub struct UUID4 {
    value: Uuid,
}

impl UUID4 {
    /// Creates a new [`UUID4`] instance.
    #[must_use]
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);

        bytes[6] = (bytes[6] & 0x0F) | 0x40; // Set the version to 4
        bytes[8] = (bytes[8] & 0x3F) | 0x80; // Set the variant to RFC 4122

        Self {
            value: Uuid::from_bytes(bytes),
        }
    }

    /// Returns the UUID value as a `Uuid`.
    #[must_use]
    pub const fn inner(&self) -> Uuid {
        self.value
    }
}

impl FromStr for UUID4 {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::parse_str(value)?;
        Ok(Self { value: uuid })
    }
}

impl From<&str> for UUID4 {
    /// Creates a [`UUID4`] from a string representation.
    ///
    /// # Panics
    ///
    /// Panics if `value` is not a valid UUID string.
    fn from(value: &str) -> Self {
        Self::from_str(value).expect("`value` should be a valid UUID string")
    }
}

impl Default for UUID4 {
    /// Creates a new default [`UUID4`] instance.
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for UUID4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}('{}')", stringify!(UUID4), self.value)
    }
}

impl Display for UUID4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl Serialize for UUID4 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UUID4 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let uuid_str: String = Deserialize::deserialize(deserializer)?;
        Self::from_str(&uuid_str).map_err(serde::de::Error::custom)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_new_produces_valid_v4() {
        let uuid = UUID4::new();
        assert_eq!(uuid.inner().get_version(), Some(uuid::Version::Random));
        assert_eq!(uuid.inner().get_variant(), uuid::Variant::RFC4122);
    }

    #[rstest]
    fn test_from_str_round_trip() {
        let value = "2d89666b-1a1e-4a75-b193-4eb3b454c757";
        let uuid = UUID4::from(value);
        assert_eq!(uuid.to_string(), value);
    }

    #[rstest]
    #[should_panic(expected = "should be a valid UUID string")]
    fn test_from_invalid_str_panics() {
        let _ = UUID4::from("not-a-uuid");
    }

    #[rstest]
    fn test_uniqueness() {
        assert_ne!(UUID4::new(), UUID4::new());
    }

    #[rstest]
    fn test_serde_round_trip() {
        let uuid = UUID4::new();
        let json = serde_json::to_string(&uuid).unwrap();
        let deserialized: UUID4 = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, uuid);
    }
}
