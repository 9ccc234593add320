use async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, Value};
use std::fmt;

/// Whole yen. Fees are never fractional, so the wire value is an integer.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Debug)]
pub struct Yen(pub i32);

impl fmt::Display for Yen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "¥{}", self.0)
    }
}

#[Scalar]
impl ScalarType for Yen {
    fn parse(value: Value) -> InputValueResult<Self> {
        let Value::Number(n) = &value else {
            return Err(InputValueError::expected_type(value));
        };
        let amount = n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| InputValueError::custom("Yen expects a whole number of yen"))?;
        if amount < 0 {
            return Err(InputValueError::custom("Yen cannot be negative"));
        }
        Ok(Yen(amount))
    }

    fn to_value(&self) -> Value {
        Value::Number(self.0.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_non_negative_amounts() {
        assert_eq!(Yen::parse(Value::from(1500)).unwrap(), Yen(1500));
        assert!(Yen::parse(Value::from(-1)).is_err());
        assert!(Yen::parse(Value::Number(async_graphql::Number::from_f64(1.5).unwrap())).is_err());
        assert!(Yen::parse(Value::String("1500".into())).is_err());
        assert_eq!(Yen(0).to_value(), Value::from(0));
    }
}
