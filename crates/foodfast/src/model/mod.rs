//! # Domain Model
//!
//! Plain data for the records the actors own: [`Order`], [`Product`], [`Drone`], plus the
//! [`Branch`] a delivery departs from. Everything here is serializable in the camelCase
//! shape the browser client and sibling services already speak.
//!
//! Cross-record references are copies taken at write time. An order stores the product
//! name and price it was priced with and the drone's display name, never a live link.

/// Declares a numeric id newtype that prints as `<prefix>_<n>` and parses from either
/// that form or the bare number.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(pub u32);

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::model::IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s.strip_prefix(concat!($prefix, "_")).unwrap_or(s);
                digits
                    .parse()
                    .map(Self)
                    .map_err(|_| $crate::model::IdParseError {
                        kind: $prefix,
                        value: s.to_string(),
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::model::IdParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_string()
            }
        }
    };
}

pub mod branch;
pub mod drone;
pub mod order;
pub mod product;

pub use branch::*;
pub use drone::*;
pub use order::*;
pub use product::*;

/// A path or payload id that is neither `<kind>_<n>` nor a bare number.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid {kind} id: {value:?}")]
pub struct IdParseError {
    pub kind: &'static str,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_prefixed_and_bare_forms() {
        assert_eq!("order_12".parse::<OrderId>(), Ok(OrderId(12)));
        assert_eq!("12".parse::<OrderId>(), Ok(OrderId(12)));
        assert_eq!(DroneId(3).to_string(), "drone_3");

        let err = "product_x".parse::<ProductId>().unwrap_err();
        assert_eq!(err.kind, "product");
        // a drone id is not an order id
        assert!("drone_3".parse::<OrderId>().is_err());
    }

    #[test]
    fn ids_travel_as_strings_in_json() {
        let json = serde_json::to_string(&OrderId(7)).unwrap();
        assert_eq!(json, "\"order_7\"");
        let back: ProductId = serde_json::from_str("\"4\"").unwrap();
        assert_eq!(back, ProductId(4));
    }
}
