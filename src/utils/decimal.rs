use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;

pub trait BigDecimalHelpers {
    fn to_f64_or_zero(&self) -> f64;
}

impl BigDecimalHelpers for BigDecimal {
    fn to_f64_or_zero(&self) -> f64 {
        self.to_f64().unwrap_or(0.0)
    }
}

/// Converts a client-supplied amount into the NUMERIC(10,2) representation.
pub fn money_from_f64(value: f64) -> Result<BigDecimal, String> {
    if !value.is_finite() {
        return Err(format!("{} is not a valid amount", value));
    }
    BigDecimal::try_from(value)
        .map(|bd| bd.round(2).with_scale(2))
        .map_err(|_| format!("{} is not a valid amount", value))
}

/// Money columns go over the wire as JSON numbers, the same way the search
/// projection reports prices.
pub mod money {
    use bigdecimal::BigDecimal;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::{money_from_f64, BigDecimalHelpers};

    pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.to_f64_or_zero())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
        money_from_f64(f64::deserialize(deserializer)?).map_err(D::Error::custom)
    }

    pub mod option {
        use bigdecimal::BigDecimal;
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        use super::super::{money_from_f64, BigDecimalHelpers};

        pub fn serialize<S: Serializer>(
            value: &Option<BigDecimal>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(amount) => serializer.serialize_some(&amount.to_f64_or_zero()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<BigDecimal>, D::Error> {
            Option::<f64>::deserialize(deserializer)?
                .map(|amount| money_from_f64(amount).map_err(D::Error::custom))
                .transpose()
        }
    }
}
