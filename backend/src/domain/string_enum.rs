//! Helper macro for closed enums persisted and exchanged as snake_case text.

use thiserror::Error;

/// Raised when text does not name a variant of a closed domain enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    /// Human-readable name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Define an enum with `as_str`, `Display`, `FromStr` and serde support.
///
/// The wire text of each variant is given explicitly so storage and API
/// representations never drift from the variant names.
macro_rules! define_string_enum {
    (
        $(#[$outer:meta])*
        pub enum $name:ident ($kind:literal) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $text:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire and storage representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::string_enum::ParseEnumError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim() {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::domain::string_enum::ParseEnumError {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

pub(crate) use define_string_enum;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    define_string_enum! {
        /// Enum used to exercise the macro.
        pub enum Fruit ("fruit") {
            /// Apple.
            Apple => "apple",
            /// Blood orange.
            BloodOrange => "blood_orange",
        }
    }

    #[rstest]
    #[case("apple", Fruit::Apple)]
    #[case("blood_orange", Fruit::BloodOrange)]
    #[case("  apple ", Fruit::Apple)]
    fn parses_known_values(#[case] raw: &str, #[case] expected: Fruit) {
        assert_eq!(raw.parse::<Fruit>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_values() {
        let err = "pear".parse::<Fruit>().expect_err("unknown variant");
        assert_eq!(err.kind, "fruit");
        assert_eq!(err.to_string(), "unknown fruit value: pear");
    }

    #[rstest]
    fn serde_uses_wire_text() {
        let json = serde_json::to_string(&Fruit::BloodOrange).expect("serialise");
        assert_eq!(json, "\"blood_orange\"");
        assert_eq!(Fruit::ALL.len(), 2);
    }
}
