//! Macros for declaring workflow status enums.

/// Generate a status enum together with its [`State`](crate::core::State)
/// implementation.
///
/// Status enums serialize as `SCREAMING_SNAKE_CASE` strings, which is the
/// wire form used by the API layer. Variant attributes are forwarded, so
/// serde aliases can be attached to individual variants. Labels default to
/// the variant name when omitted.
///
/// # Example
///
/// ```
/// use labflow::status_enum;
/// use labflow::core::State;
///
/// status_enum! {
///     pub enum OrderStatus {
///         Open => "OPEN",
///         InReview => "IN_REVIEW",
///         Closed => "CLOSED",
///     }
///     final: [Closed]
/// }
///
/// assert_eq!(OrderStatus::InReview.name(), "IN_REVIEW");
/// assert!(OrderStatus::Closed.is_final());
/// ```
#[macro_export]
macro_rules! status_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $label:expr
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),*];
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $label),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::core::State::name(self))
            }
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $crate::status_enum! {
            $(#[$meta])*
            $vis enum $name {
                $(
                    $(#[$variant_meta])*
                    $variant => stringify!($variant)
                ),*
            }
            $(final: [$($final),*])?
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::State;

    status_enum! {
        enum TestStatus {
            Open => "OPEN",
            InReview => "IN_REVIEW",
            Closed => "CLOSED",
        }
        final: [Closed]
    }

    #[test]
    fn status_enum_macro_generates_trait() {
        let status = TestStatus::Open;
        assert_eq!(status.name(), "OPEN");
        assert!(!status.is_final());

        assert_eq!(TestStatus::InReview.name(), "IN_REVIEW");
        assert!(TestStatus::Closed.is_final());
    }

    #[test]
    fn status_enum_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&TestStatus::InReview).unwrap();
        assert_eq!(json, "\"IN_REVIEW\"");

        let parsed: TestStatus = serde_json::from_str("\"CLOSED\"").unwrap();
        assert_eq!(parsed, TestStatus::Closed);
    }

    #[test]
    fn status_enum_lists_all_variants() {
        assert_eq!(
            TestStatus::ALL,
            &[TestStatus::Open, TestStatus::InReview, TestStatus::Closed]
        );
    }

    #[test]
    fn status_enum_forwards_variant_attributes() {
        status_enum! {
            enum AliasedStatus {
                #[serde(alias = "PENDING")]
                Draft => "DRAFT",
                Done => "DONE",
            }
            final: [Done]
        }

        let parsed: AliasedStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(parsed, AliasedStatus::Draft);
        assert_eq!(parsed.to_string(), "DRAFT");
    }

    #[test]
    fn status_enum_works_without_final() {
        status_enum! {
            enum MinimalStatus {
                One,
                Two,
            }
        }

        assert!(!MinimalStatus::One.is_final());
        assert_eq!(MinimalStatus::Two.name(), "Two");
    }
}
