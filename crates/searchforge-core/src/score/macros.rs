//! Declarative macros for the score types.
//!
//! Every level-based score shares the same arithmetic, ordering, scaling
//! and slash-separated text format; these macros generate them field by field.

/// Generates `Ord`, `PartialOrd`, `Add`, `Sub` and `Neg` for a field-based score type.
///
/// Fields are compared lexicographically in the order they are listed.
/// The constructor must accept fields in that same order.
macro_rules! impl_score_ops {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        impl Ord for $type {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                std::cmp::Ordering::Equal
                    $(.then_with(|| self.$field.cmp(&other.$field)))+
            }
        }

        impl PartialOrd for $type {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl std::ops::Add for $type {
            type Output = Self;

            fn add(self, other: Self) -> Self {
                $type::$ctor( $(self.$field + other.$field),+ )
            }
        }

        impl std::ops::Sub for $type {
            type Output = Self;

            fn sub(self, other: Self) -> Self {
                $type::$ctor( $(self.$field - other.$field),+ )
            }
        }

        impl std::ops::Neg for $type {
            type Output = Self;

            fn neg(self) -> Self {
                $type::$ctor( $(-self.$field),+ )
            }
        }
    };
}

/// Generates the level conversions and scaling methods of the `Score` trait.
///
/// Intended to be used *inside* an `impl Score for Type { ... }` block.
macro_rules! impl_score_levels {
    ($type:ident { $($field:ident),+ } => $ctor:ident) => {
        fn to_level_numbers(&self) -> Vec<i64> {
            vec![ $(self.$field),+ ]
        }

        fn from_level_numbers(levels: &[i64]) -> Self {
            let mut iter = levels.iter().copied();
            $type::$ctor( $( { let _ = stringify!($field); iter.next().unwrap_or(0) } ),+ )
        }

        fn multiply(&self, multiplicand: f64) -> Self {
            $type::$ctor( $( (self.$field as f64 * multiplicand).round() as i64 ),+ )
        }

        fn divide(&self, divisor: f64) -> Self {
            $type::$ctor( $( (self.$field as f64 / divisor).round() as i64 ),+ )
        }

        fn abs(&self) -> Self {
            $type::$ctor( $( self.$field.abs() ),+ )
        }
    };
}

/// Generates `ParseableScore` for scores using the `"Xsuffix/Ysuffix"` format.
///
/// Each field maps to a suffix label (e.g., `hard => "hard"`, `soft => "soft"`).
macro_rules! impl_score_parse {
    ($type:ident { $($field:ident => $suffix:literal),+ } => $ctor:ident) => {
        impl $crate::score::traits::ParseableScore for $type {
            fn parse(s: &str) -> Result<Self, $crate::score::traits::ScoreParseError> {
                let s = s.trim();
                let parts: Vec<&str> = s.split('/').collect();
                let suffixes: &[&str] = &[ $($suffix),+ ];

                if parts.len() != suffixes.len() {
                    return Err($crate::score::traits::ScoreParseError {
                        message: format!(
                            "Invalid {} format '{}': expected {} parts separated by '/'",
                            stringify!($type), s, suffixes.len()
                        ),
                    });
                }

                let mut parts = parts.into_iter();
                $(
                    let $field = {
                        let part = parts.next().unwrap_or_default().trim();
                        let num_str = part.strip_suffix($suffix).ok_or_else(|| {
                            $crate::score::traits::ScoreParseError {
                                message: format!(
                                    "{} part '{}' must end with '{}'",
                                    stringify!($field), part, $suffix
                                ),
                            }
                        })?;
                        num_str.parse::<i64>().map_err(|e| {
                            $crate::score::traits::ScoreParseError {
                                message: format!("Invalid {} score '{}': {}", $suffix, num_str, e),
                            }
                        })?
                    };
                )+

                Ok($type::$ctor( $($field),+ ))
            }

            fn to_string_repr(&self) -> String {
                let parts: Vec<String> = vec![ $(format!("{}{}", self.$field, $suffix)),+ ];
                parts.join("/")
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&$crate::score::traits::ParseableScore::to_string_repr(self))
            }
        }
    };
}
