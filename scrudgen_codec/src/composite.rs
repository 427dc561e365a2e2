use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::{Arity, FromIdentifier, Identifiable, MalformedIdentifier, encode_segments, split};

/// Defines a fixed-arity composite identifier over its component slots.
///
/// Equality and hashing are defined over the component identifiers only, so
/// two values decoded independently from equal strings compare equal whatever
/// else their components carry.
macro_rules! composite_identifier {
    ($(#[$meta:meta])* $name:ident, $arity:expr, { $($slot:ident: $param:ident),+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default)]
        pub struct $name<$($param),+> {
            $(pub $slot: $param,)+
        }

        impl<$($param),+> $name<$($param),+> {
            pub const ARITY: Arity = $arity;

            pub const fn new($($slot: $param),+) -> Self {
                Self { $($slot),+ }
            }

            /// Decode `value`, handing each raw segment to its slot builder.
            pub fn decode_with(
                value: &str,
                $($slot: impl FnOnce(&str) -> $param),+
            ) -> Result<Self, MalformedIdentifier> {
                let mut parts = split(value, Self::ARITY)?.into_iter();
                Ok(Self {
                    $($slot: $slot(parts.next().unwrap_or_default()),)+
                })
            }
        }

        impl<$($param: Identifiable),+> $name<$($param),+> {
            /// Component identifiers in slot order.
            pub fn component_ids(&self) -> Vec<Option<String>> {
                vec![$(self.$slot.identifier()),+]
            }

            /// Canonical string form, `None` when no component has an identifier.
            pub fn encode(&self) -> Option<String> {
                encode_segments(&self.component_ids())
            }
        }

        impl<$($param: Identifiable),+> PartialEq for $name<$($param),+> {
            fn eq(&self, other: &Self) -> bool {
                self.component_ids() == other.component_ids()
            }
        }

        impl<$($param: Identifiable),+> Eq for $name<$($param),+> {}

        impl<$($param: Identifiable),+> Hash for $name<$($param),+> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.component_ids().hash(state);
            }
        }

        impl<$($param: Identifiable),+> fmt::Display for $name<$($param),+> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.encode().unwrap_or_default())
            }
        }

        impl<$($param: FromIdentifier),+> FromStr for $name<$($param),+> {
            type Err = MalformedIdentifier;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::decode_with(value, $($param::from_identifier),+)
            }
        }

        impl<$($param: Identifiable),+> Serialize for $name<$($param),+> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.encode().serialize(serializer)
            }
        }

        impl<'de, $($param: FromIdentifier),+> Deserialize<'de> for $name<$($param),+> {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

composite_identifier!(
    /// Two-component identifier, typically the key of a join model.
    Pair, Arity::Two, { left: L, right: R }
);

composite_identifier!(
    /// Three-component identifier.
    Triple, Arity::Three, { left: L, middle: M, right: R }
);

composite_identifier!(
    /// Four-component identifier.
    Quadruple, Arity::Four, { left: L, inner_left: IL, inner_right: IR, right: R }
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, Clone, Default)]
    struct UserRef {
        id: Option<String>,
        display_name: Option<String>,
    }

    impl Identifiable for UserRef {
        fn identifier(&self) -> Option<String> {
            self.id.clone()
        }
    }

    impl FromIdentifier for UserRef {
        fn from_identifier(raw: &str) -> Self {
            Self {
                id: Some(raw.to_string()),
                display_name: None,
            }
        }
    }

    #[test]
    fn test_quadruple_from_str() {
        let id: Quadruple<String, String, String, String> = "a_b_c_d".parse().unwrap();
        assert_eq!(id.left, "a");
        assert_eq!(id.inner_left, "b");
        assert_eq!(id.inner_right, "c");
        assert_eq!(id.right, "d");

        let err = "a_b_c".parse::<Quadruple<String, String, String, String>>().unwrap_err();
        assert_eq!(err.arity, 4);
    }

    #[test]
    fn test_equality_ignores_non_identifier_state() {
        let decoded: Pair<UserRef, UserRef> = "u1_u2".parse().unwrap();
        let built = Pair::new(
            UserRef {
                id: Some("u1".to_string()),
                display_name: Some("Alice".to_string()),
            },
            UserRef {
                id: Some("u2".to_string()),
                display_name: Some("Bob".to_string()),
            },
        );
        assert_eq!(decoded, built);

        let mut set = HashSet::new();
        set.insert(decoded);
        assert!(set.contains(&built));
    }

    #[test]
    fn test_independent_decodes_are_equal() {
        let a: Triple<UserRef, String, SeqRef> = "x_y_7".parse().unwrap();
        let b: Triple<UserRef, String, SeqRef> = "x_y_7".parse().unwrap();
        assert_eq!(a, b);
    }

    #[derive(Debug, Clone)]
    struct SeqRef(u64);

    impl Identifiable for SeqRef {
        fn identifier(&self) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    impl FromIdentifier for SeqRef {
        fn from_identifier(raw: &str) -> Self {
            SeqRef(raw.parse().unwrap_or_default())
        }
    }

    #[test]
    fn test_partial_composite_encodes_but_does_not_decode() {
        let partial = Pair::new(UserRef::from_identifier("u1"), UserRef::default());
        assert_eq!(partial.encode(), Some("u1_".to_string()));
        assert!(partial.to_string().parse::<Pair<UserRef, UserRef>>().is_err());

        let empty: Pair<UserRef, UserRef> = Pair::default();
        assert_eq!(empty.encode(), None);
        assert_eq!(empty.to_string(), "");
    }

    #[test]
    fn test_decode_with_builders() {
        let id = Pair::decode_with("7_9", |raw| raw.len(), |raw| format!("user-{raw}")).unwrap();
        assert_eq!(id.left, 1);
        assert_eq!(id.right, "user-9");
    }
}
