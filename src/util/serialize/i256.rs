use {
    serde::{Deserialize, Deserializer, Serializer, de},
    serde_with::{DeserializeAs, SerializeAs},
    std::borrow::Cow,
};

/// Serialize and deserialize [`alloy::primitives::I256`] as a signed decimal
/// string.
#[derive(Debug)]
pub struct I256;

impl<'de> DeserializeAs<'de, alloy::primitives::I256> for I256 {
    fn deserialize_as<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<alloy::primitives::I256, D::Error> {
        let value = Cow::<str>::deserialize(deserializer)?;
        alloy::primitives::I256::from_dec_str(&value).map_err(de::Error::custom)
    }
}

impl SerializeAs<alloy::primitives::I256> for I256 {
    fn serialize_as<S: Serializer>(
        value: &alloy::primitives::I256,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }
}
