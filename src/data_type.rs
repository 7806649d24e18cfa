use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Represents the supported data types in the database schema.
/// These types define the structure of columns and the expected format of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// A 32-bit signed integer (`int`).
    Int,
    /// A 32-bit floating-point number (`float`).
    Float,
    /// A 64-bit floating-point number (`double`).
    Double,
    /// A boolean value (`bool`).
    Bool,
    /// A variable-length UTF-8 character string (`varchar`, optionally `varchar(n)`).
    Text,
}

impl DataType {
    /// The type token used in `CREATE TABLE` statements and save files.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::Text => "varchar",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Parses a type token. `varchar` may carry a width suffix such as
/// `varchar(32)`; the width is accepted but not enforced.
impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "double" => Ok(Self::Double),
            "bool" => Ok(Self::Bool),
            "varchar" => Ok(Self::Text),
            other => match other
                .strip_prefix("varchar(")
                .and_then(|rest| rest.strip_suffix(')'))
            {
                Some(width) if !width.is_empty() && width.bytes().all(|b| b.is_ascii_digit()) => {
                    Ok(Self::Text)
                }
                _ => Err(Error::Schema(s.to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_tokens() {
        assert_eq!("int".parse::<DataType>().unwrap(), DataType::Int);
        assert_eq!("FLOAT".parse::<DataType>().unwrap(), DataType::Float);
        assert_eq!("double".parse::<DataType>().unwrap(), DataType::Double);
        assert_eq!("bool".parse::<DataType>().unwrap(), DataType::Bool);
        assert_eq!("varchar".parse::<DataType>().unwrap(), DataType::Text);
        assert_eq!("varchar(20)".parse::<DataType>().unwrap(), DataType::Text);
    }

    #[test]
    fn test_unknown_type_is_schema_error() {
        assert!(matches!("text".parse::<DataType>(), Err(Error::Schema(_))));
        assert!(matches!("varchar()".parse::<DataType>(), Err(Error::Schema(_))));
        assert!(matches!("varchar(x)".parse::<DataType>(), Err(Error::Schema(_))));
    }

    #[test]
    fn test_keyword_round_trip() {
        for ty in [
            DataType::Int,
            DataType::Float,
            DataType::Double,
            DataType::Bool,
            DataType::Text,
        ] {
            assert_eq!(ty.keyword().parse::<DataType>().unwrap(), ty);
        }
    }
}
