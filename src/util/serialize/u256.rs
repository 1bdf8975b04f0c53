use {
    serde::{Deserialize, Deserializer, Serializer, de},
    serde_with::{DeserializeAs, SerializeAs},
    std::borrow::Cow,
};

/// Serialize and deserialize [`alloy::primitives::U256`] as a decimal string.
/// Hex strings with a `0x` prefix are accepted when deserializing, since the
/// encoding layer emits chained output references that way.
#[derive(Debug)]
pub struct U256;

impl<'de> DeserializeAs<'de, alloy::primitives::U256> for U256 {
    fn deserialize_as<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<alloy::primitives::U256, D::Error> {
        let value = Cow::<str>::deserialize(deserializer)?;
        match value.strip_prefix("0x") {
            Some(hex) => alloy::primitives::U256::from_str_radix(hex, 16),
            None => alloy::primitives::U256::from_str_radix(&value, 10),
        }
        .map_err(de::Error::custom)
    }
}

impl SerializeAs<alloy::primitives::U256> for U256 {
    fn serialize_as<S: Serializer>(
        value: &alloy::primitives::U256,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }
}
