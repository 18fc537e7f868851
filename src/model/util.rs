// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Serde helpers for the node JSON representation.

/// A Serde helper module for converting values to [`String`].
pub mod stringify {
    use std::{fmt::Display, marker::PhantomData, str::FromStr};

    use serde::{de::Visitor, Deserializer, Serializer};

    /// Deserialize T using [`FromStr`]
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        struct Helper<S>(PhantomData<S>);

        impl<'de, S> Visitor<'de> for Helper<S>
        where
            S: FromStr,
            <S as FromStr>::Err: Display,
        {
            type Value = S;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "a string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                value.parse::<Self::Value>().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(Helper(PhantomData))
    }

    /// Serialize T using [`Display`]
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(&value)
    }
}

/// Byte strings as `0x`-prefixed lowercase hex.
pub mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Deserialize a `0x`-prefixed hex string into bytes.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Box<[u8]>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        prefix_hex::decode::<Vec<u8>>(&hex)
            .map(Vec::into_boxed_slice)
            .map_err(|e| de::Error::custom(format!("invalid hex `{hex}`: {e:?}")))
    }

    /// Serialize bytes as a `0x`-prefixed hex string.
    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&prefix_hex::encode(bytes))
    }
}

/// 256-bit integers as the node writes them: `0x`-prefixed hex without leading zeros.
pub mod hex_u256 {
    use primitive_types::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    /// Deserialize a `0x`-prefixed hex string into a [`U256`].
    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        prefix_hex::decode::<U256>(&hex).map_err(|e| de::Error::custom(format!("invalid U256 `{hex}`: {e:?}")))
    }

    /// Serialize a [`U256`] as a `0x`-prefixed hex string.
    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&prefix_hex::encode(*value))
    }
}

/// Objects discriminated by a numeric `type` field, as the node writes them.
pub(crate) mod tagged {
    use std::marker::PhantomData;

    use serde::{de, Deserialize, Deserializer, Serialize};
    use serde_json::{Map, Value};

    /// Serializes `body` with a leading `type` field.
    #[derive(Serialize)]
    pub(crate) struct Tagged<'a, T> {
        #[serde(rename = "type")]
        pub(crate) kind: u8,
        #[serde(flatten)]
        pub(crate) body: &'a T,
    }

    /// The fields left after the discriminator, reporting failures as `E`.
    pub(crate) struct Fields<E> {
        map: Map<String, Value>,
        _error: PhantomData<E>,
    }

    impl<E: de::Error> Fields<E> {
        /// Interprets the fields as `T`.
        pub(crate) fn parse<T: de::DeserializeOwned>(self) -> Result<T, E> {
            serde_json::from_value(Value::Object(self.map)).map_err(E::custom)
        }

        pub(crate) fn remove(&mut self, key: &str) -> Option<Value> {
            self.map.remove(key)
        }

        pub(crate) fn into_inner(self) -> Map<String, Value> {
            self.map
        }
    }

    /// Reads an object and splits off its `type` discriminator.
    pub(crate) fn split<'de, D>(deserializer: D, what: &'static str) -> Result<(u8, Fields<D::Error>), D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut map = Map::deserialize(deserializer)?;
        let kind = map
            .remove("type")
            .ok_or_else(|| <D::Error as de::Error>::missing_field("type"))?
            .as_u64()
            .ok_or_else(|| <D::Error as de::Error>::custom(format!("{what} type must be an integer")))?;
        let kind = u8::try_from(kind)
            .map_err(|_| <D::Error as de::Error>::custom(format!("{what} type {kind} out of range")))?;
        Ok((
            kind,
            Fields {
                map,
                _error: PhantomData,
            },
        ))
    }
}

pub(crate) fn is_empty_bytes(bytes: &[u8]) -> bool {
    bytes.is_empty()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use primitive_types::U256;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "super::hex_bytes")]
        data: Box<[u8]>,
        #[serde(with = "super::hex_u256")]
        amount: U256,
        #[serde(with = "super::stringify")]
        index: u64,
    }

    #[test]
    fn hex_and_string_helpers() {
        let sample = Sample {
            data: vec![0xde, 0xad].into_boxed_slice(),
            amount: U256::from(255u64),
            index: 7,
        };
        let value = serde_json::to_value(&sample).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "data": "0xdead", "amount": "0xff", "index": "7" })
        );
        assert_eq!(serde_json::from_value::<Sample>(value).unwrap(), sample);
    }
}
