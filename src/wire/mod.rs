// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

//! Conversion between the node JSON representation and the typed model.

mod params;
mod response;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

pub use self::{
    params::{AliasOutputBuilderParams, BasicOutputBuilderParams, FoundryOutputBuilderParams, NftOutputBuilderParams},
    response::Response,
};
use crate::error::DecodingError;

/// Converts `value` into its node JSON representation.
pub fn to_wire<T: Serialize + ?Sized>(value: &T) -> Result<Value, DecodingError> {
    Ok(serde_json::to_value(value)?)
}

/// Reads a typed value from its node JSON representation.
pub fn from_wire<T: DeserializeOwned>(value: Value) -> Result<T, DecodingError> {
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::{
        output::{Output, OutputId},
        ProtocolParameters,
    };

    #[test]
    fn outputs_survive_the_wire() {
        for output in [
            Output::Basic(crate::model::output::BasicOutput::rand()),
            Output::Alias(crate::model::output::AliasOutput::rand()),
            Output::Foundry(crate::model::output::FoundryOutput::rand()),
            Output::Nft(crate::model::output::NftOutput::rand()),
        ] {
            let value = to_wire(&output).unwrap();
            assert_eq!(from_wire::<Output>(value.clone()).unwrap(), output);
            assert_eq!(to_wire(&from_wire::<Output>(value.clone()).unwrap()).unwrap(), value);
        }
    }

    #[test]
    fn missing_fields_are_decoding_errors() {
        let value = json!({ "type": 3, "amount": "10" });
        assert!(matches!(from_wire::<Output>(value), Err(DecodingError::Json(_))));
        assert!(matches!(
            from_wire::<ProtocolParameters>(json!({ "version": "2" })),
            Err(DecodingError::Json(_))
        ));
        assert!(matches!(from_wire::<OutputId>(json!(7)), Err(DecodingError::Json(_))));
    }
}
