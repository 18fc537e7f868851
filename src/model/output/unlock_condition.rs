// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Module containing the [`UnlockCondition`] types.

use derive_more::Deref;
use packable::{packer::Packer, unpacker::Unpacker, Packable};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{unknown::Unrecognized, Address};
use crate::{
    error::{DecodingError, EncodingError},
    model::{
        packing::{
            pack_u8_counted, unknown_kind, unpack_int, unpack_kind, unpack_u8_counted, verified, UnpackResult,
        },
        util::tagged::{self, Tagged},
        TokenAmount,
    },
};

/// Returns the amount of the output to `return_address` if it is consumed by anyone else.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageDepositReturnUnlockCondition {
    /// The address receiving the returned deposit.
    pub return_address: Address,
    /// The amount to return.
    pub amount: TokenAmount,
}

/// Locks the output until `unix_time`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct TimelockUnlockCondition {
    pub unix_time: u32,
}

/// Hands the output to `return_address` once `unix_time` has passed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ExpirationUnlockCondition {
    pub return_address: Address,
    pub unix_time: u32,
}

#[derive(Serialize, Deserialize)]
struct AddressDto {
    address: Address,
}

/// The different [`UnlockCondition`] variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnlockCondition {
    /// The address that may unlock the output.
    Address(Address),
    /// A storage deposit return.
    StorageDepositReturn(StorageDepositReturnUnlockCondition),
    /// A timelock.
    Timelock(TimelockUnlockCondition),
    /// An expiration.
    Expiration(ExpirationUnlockCondition),
    /// The state controller of an alias.
    StateControllerAddress(Address),
    /// The governor of an alias.
    GovernorAddress(Address),
    /// The alias controlling a foundry.
    ImmutableAliasAddress(Address),
    /// A condition of an unknown kind.
    Unknown(Unrecognized),
}

#[allow(missing_docs)]
impl UnlockCondition {
    pub const ADDRESS_KIND: u8 = 0;
    pub const STORAGE_DEPOSIT_RETURN_KIND: u8 = 1;
    pub const TIMELOCK_KIND: u8 = 2;
    pub const EXPIRATION_KIND: u8 = 3;
    pub const STATE_CONTROLLER_ADDRESS_KIND: u8 = 4;
    pub const GOVERNOR_ADDRESS_KIND: u8 = 5;
    pub const IMMUTABLE_ALIAS_ADDRESS_KIND: u8 = 6;

    /// Returns the kind discriminator.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Address(_) => Self::ADDRESS_KIND,
            Self::StorageDepositReturn(_) => Self::STORAGE_DEPOSIT_RETURN_KIND,
            Self::Timelock(_) => Self::TIMELOCK_KIND,
            Self::Expiration(_) => Self::EXPIRATION_KIND,
            Self::StateControllerAddress(_) => Self::STATE_CONTROLLER_ADDRESS_KIND,
            Self::GovernorAddress(_) => Self::GOVERNOR_ADDRESS_KIND,
            Self::ImmutableAliasAddress(_) => Self::IMMUTABLE_ALIAS_ADDRESS_KIND,
            Self::Unknown(u) => u.kind,
        }
    }

    /// Checks the rules a single condition must follow to have a canonical encoding.
    pub fn verify(&self) -> Result<(), EncodingError> {
        match self {
            Self::StorageDepositReturn(sdr) => sdr.amount.to_u64().map(drop),
            Self::Timelock(TimelockUnlockCondition { unix_time: 0 }) => Err(EncodingError::NullTimestamp("timelock")),
            Self::Expiration(ExpirationUnlockCondition { unix_time: 0, .. }) => {
                Err(EncodingError::NullTimestamp("expiration"))
            }
            Self::ImmutableAliasAddress(address) if !matches!(address, Address::Alias(_)) => {
                Err(EncodingError::Disallowed {
                    output: "foundry",
                    what: "immutable alias address",
                    kind: address.kind(),
                })
            }
            Self::Unknown(u) => Err(EncodingError::UnrecognizedKind {
                what: "unlock condition",
                kind: u.kind,
            }),
            _ => Ok(()),
        }
    }
}

impl Packable for UnlockCondition {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        if let Self::Unknown(u) = self {
            return u.pack(packer);
        }
        self.kind().pack(packer)?;
        match self {
            Self::Address(a)
            | Self::StateControllerAddress(a)
            | Self::GovernorAddress(a)
            | Self::ImmutableAliasAddress(a) => a.pack(packer),
            Self::StorageDepositReturn(sdr) => {
                sdr.return_address.pack(packer)?;
                sdr.amount.pack(packer)
            }
            Self::Timelock(t) => t.unix_time.pack(packer),
            Self::Expiration(e) => {
                e.return_address.pack(packer)?;
                e.unix_time.pack(packer)
            }
            Self::Unknown(_) => Ok(()),
        }
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        let condition = match unpack_kind::<_, VERIFY>(unpacker)? {
            Self::ADDRESS_KIND => Self::Address(Address::unpack::<_, VERIFY>(unpacker, &())?),
            Self::STORAGE_DEPOSIT_RETURN_KIND => Self::StorageDepositReturn(StorageDepositReturnUnlockCondition {
                return_address: Address::unpack::<_, VERIFY>(unpacker, &())?,
                amount: TokenAmount::unpack::<_, VERIFY>(unpacker, &())?,
            }),
            Self::TIMELOCK_KIND => Self::Timelock(TimelockUnlockCondition {
                unix_time: unpack_int::<u32, _, VERIFY>(unpacker)?,
            }),
            Self::EXPIRATION_KIND => Self::Expiration(ExpirationUnlockCondition {
                return_address: Address::unpack::<_, VERIFY>(unpacker, &())?,
                unix_time: unpack_int::<u32, _, VERIFY>(unpacker)?,
            }),
            Self::STATE_CONTROLLER_ADDRESS_KIND => {
                Self::StateControllerAddress(Address::unpack::<_, VERIFY>(unpacker, &())?)
            }
            Self::GOVERNOR_ADDRESS_KIND => Self::GovernorAddress(Address::unpack::<_, VERIFY>(unpacker, &())?),
            Self::IMMUTABLE_ALIAS_ADDRESS_KIND => {
                Self::ImmutableAliasAddress(Address::unpack::<_, VERIFY>(unpacker, &())?)
            }
            kind => return unknown_kind::<_, U>("unlock condition", kind),
        };
        if VERIFY {
            verified::<U>(condition.verify())?;
        }
        Ok(condition)
    }
}

impl Serialize for UnlockCondition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind();
        match self {
            Self::Address(address)
            | Self::StateControllerAddress(address)
            | Self::GovernorAddress(address)
            | Self::ImmutableAliasAddress(address) => Tagged {
                kind,
                body: &AddressDto { address: *address },
            }
            .serialize(serializer),
            Self::StorageDepositReturn(body) => Tagged { kind, body }.serialize(serializer),
            Self::Timelock(body) => Tagged { kind, body }.serialize(serializer),
            Self::Expiration(body) => Tagged { kind, body }.serialize(serializer),
            Self::Unknown(unknown) => unknown.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for UnlockCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (kind, map) = tagged::split(deserializer, "unlock condition")?;
        Ok(match kind {
            Self::ADDRESS_KIND => Self::Address(map.parse::<AddressDto>()?.address),
            Self::STORAGE_DEPOSIT_RETURN_KIND => Self::StorageDepositReturn(map.parse()?),
            Self::TIMELOCK_KIND => Self::Timelock(map.parse()?),
            Self::EXPIRATION_KIND => Self::Expiration(map.parse()?),
            Self::STATE_CONTROLLER_ADDRESS_KIND => {
                Self::StateControllerAddress(map.parse::<AddressDto>()?.address)
            }
            Self::GOVERNOR_ADDRESS_KIND => Self::GovernorAddress(map.parse::<AddressDto>()?.address),
            Self::IMMUTABLE_ALIAS_ADDRESS_KIND => {
                Self::ImmutableAliasAddress(map.parse::<AddressDto>()?.address)
            }
            kind => Self::Unknown(Unrecognized::from_json(kind, map.into_inner())),
        })
    }
}

/// The unlock conditions of an output: at most one per kind, sorted by kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deref, Serialize)]
#[serde(transparent)]
pub struct UnlockConditions(Vec<UnlockCondition>);

impl UnlockConditions {
    /// The maximum number of unlock conditions.
    pub const COUNT_MAX: usize = 7;

    /// Sorts `conditions` by kind and checks the count and uniqueness.
    pub fn new(conditions: impl IntoIterator<Item = UnlockCondition>) -> Result<Self, EncodingError> {
        let mut conditions = conditions.into_iter().collect::<Vec<_>>();
        conditions.sort_by_key(UnlockCondition::kind);
        verify_sorted_kinds(&conditions, UnlockCondition::kind, "unlock condition", Self::COUNT_MAX)?;
        Ok(Self(conditions))
    }

    /// Returns the condition of the given kind.
    pub fn get(&self, kind: u8) -> Option<&UnlockCondition> {
        self.0.iter().find(|c| c.kind() == kind)
    }

    /// Returns the address of the [`UnlockCondition::Address`].
    pub fn address(&self) -> Option<&Address> {
        self.0.iter().find_map(|c| match c {
            UnlockCondition::Address(a) => Some(a),
            _ => None,
        })
    }

    /// Returns the address of the [`UnlockCondition::ImmutableAliasAddress`].
    pub fn immutable_alias_address(&self) -> Option<&Address> {
        self.0.iter().find_map(|c| match c {
            UnlockCondition::ImmutableAliasAddress(a) => Some(a),
            _ => None,
        })
    }

    /// Returns the storage deposit return condition, if any.
    pub fn storage_deposit_return(&self) -> Option<&StorageDepositReturnUnlockCondition> {
        self.0.iter().find_map(|c| match c {
            UnlockCondition::StorageDepositReturn(sdr) => Some(sdr),
            _ => None,
        })
    }

    pub(crate) fn kinds(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().map(UnlockCondition::kind)
    }

    /// Checks the count, the order and every condition.
    pub fn verify(&self) -> Result<(), EncodingError> {
        verify_sorted_kinds(&self.0, UnlockCondition::kind, "unlock condition", Self::COUNT_MAX)?;
        self.0.iter().try_for_each(UnlockCondition::verify)
    }
}

/// Checks the count of a collection and that its kinds strictly increase.
pub(crate) fn verify_sorted_kinds<T>(
    items: &[T],
    kind: impl Fn(&T) -> u8,
    what: &'static str,
    max: usize,
) -> Result<(), EncodingError> {
    if items.len() > max {
        return Err(EncodingError::InvalidCount {
            what,
            count: items.len(),
            max,
        });
    }
    for pair in items.windows(2) {
        let (a, b) = (kind(&pair[0]), kind(&pair[1]));
        if a == b {
            return Err(EncodingError::Duplicate {
                what,
                id: a.to_string(),
            });
        }
        if a > b {
            return Err(EncodingError::Unsorted { what });
        }
    }
    Ok(())
}

impl Packable for UnlockConditions {
    type UnpackError = DecodingError;
    type UnpackVisitor = ();

    fn pack<P: Packer>(&self, packer: &mut P) -> Result<(), P::Error> {
        pack_u8_counted(self.0.iter(), packer)
    }

    fn unpack<U: Unpacker, const VERIFY: bool>(unpacker: &mut U, _: &()) -> UnpackResult<Self, U> {
        let conditions = unpack_u8_counted::<UnlockCondition, _, VERIFY, { Self::COUNT_MAX as u8 }>(
            unpacker,
            "unlock conditions",
        )?;
        if VERIFY {
            verified::<U>(verify_sorted_kinds(
                &conditions,
                UnlockCondition::kind,
                "unlock condition",
                Self::COUNT_MAX,
            ))?;
        }
        Ok(Self(conditions))
    }
}

impl<'de> Deserialize<'de> for UnlockConditions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Self::new(Vec::<UnlockCondition>::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}

impl From<Unrecognized> for UnlockCondition {
    fn from(value: Unrecognized) -> Self {
        Self::Unknown(value)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use packable::PackableExt;

    use super::*;
    use crate::model::{output::Ed25519Address, unpack_exact};

    fn ed25519(byte: u8) -> Address {
        Address::Ed25519(Ed25519Address::new([byte; 32]))
    }

    #[test]
    fn json_shapes() {
        let hex = format!("0x{}", "11".repeat(32));
        let sdr = UnlockCondition::StorageDepositReturn(StorageDepositReturnUnlockCondition {
            return_address: ed25519(0x11),
            amount: "18446744073709551616".parse().unwrap(),
        });
        assert_eq!(
            serde_json::to_value(&sdr).unwrap(),
            json!({
                "type": 1,
                "returnAddress": { "type": 0, "pubKeyHash": hex },
                "amount": "18446744073709551616",
            })
        );
        let expiration = UnlockCondition::Expiration(ExpirationUnlockCondition {
            return_address: ed25519(0x11),
            unix_time: 1000,
        });
        let value = serde_json::to_value(&expiration).unwrap();
        assert_eq!(
            value,
            json!({
                "type": 3,
                "returnAddress": { "type": 0, "pubKeyHash": hex },
                "unixTime": 1000,
            })
        );
        assert_eq!(serde_json::from_value::<UnlockCondition>(value).unwrap(), expiration);
    }

    #[test]
    fn oversized_return_amount_cannot_be_packed() {
        let sdr = UnlockCondition::StorageDepositReturn(StorageDepositReturnUnlockCondition {
            return_address: ed25519(1),
            amount: "18446744073709551616".parse().unwrap(),
        });
        assert!(matches!(sdr.verify(), Err(EncodingError::AmountOutOfRange(_))));
    }

    #[test]
    fn unknown_json_kind_round_trips() {
        let value = json!({ "type": 42, "whatever": [1, 2, 3] });
        let condition = serde_json::from_value::<UnlockCondition>(value.clone()).unwrap();
        assert_eq!(condition.kind(), 42);
        assert_eq!(serde_json::to_value(&condition).unwrap(), value);
        assert_eq!(
            condition.verify(),
            Err(EncodingError::UnrecognizedKind {
                what: "unlock condition",
                kind: 42
            })
        );
    }

    #[test]
    fn conditions_are_sorted_and_unique() {
        let a = UnlockConditions::new([
            UnlockCondition::Timelock(TimelockUnlockCondition { unix_time: 5 }),
            UnlockCondition::Address(ed25519(1)),
        ])
        .unwrap();
        assert_eq!(a.kinds().collect::<Vec<_>>(), vec![0, 2]);
        assert!(matches!(
            UnlockConditions::new([UnlockCondition::Address(ed25519(1)), UnlockCondition::Address(ed25519(2))]),
            Err(EncodingError::Duplicate { .. })
        ));
        assert_eq!(unpack_exact::<UnlockConditions>(a.pack_to_vec()).unwrap(), a);
    }

    #[test]
    fn zero_timelock_is_rejected() {
        let bytes = [2u8, 0, 0, 0, 0];
        assert!(matches!(
            unpack_exact::<UnlockCondition>(bytes),
            Err(DecodingError::Invalid(EncodingError::NullTimestamp("timelock")))
        ));
    }

    #[test]
    fn too_many_conditions_in_binary() {
        assert!(matches!(
            unpack_exact::<UnlockConditions>([8u8]),
            Err(DecodingError::Invalid(EncodingError::InvalidCount { count: 8, max: 7, .. }))
        ));
    }

    #[test]
    fn unsorted_binary_is_rejected() {
        let timelock = UnlockCondition::Timelock(TimelockUnlockCondition { unix_time: 5 });
        let address = UnlockCondition::Address(ed25519(1));
        let bytes = [vec![2], timelock.pack_to_vec(), address.pack_to_vec()].concat();
        assert!(matches!(
            unpack_exact::<UnlockConditions>(bytes),
            Err(DecodingError::Invalid(EncodingError::Unsorted { .. }))
        ));
    }
}
