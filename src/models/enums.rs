//! models/enums.rs
//! Enums persistidos como INTEGER y expuestos por nombre en el JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Acepta tanto el nombre ("SMS", "sms") como el ordinal (0).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawEnumValue {
    Ordinal(i64),
    Name(String),
}

macro_rules! stored_enum {
    (
        $(#[$meta:meta])*
        $name:ident : $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_i64(self) -> i64 {
                match self {
                    $($name::$variant => $value),+
                }
            }

            pub fn from_i64(value: i64) -> Option<Self> {
                match value {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                let unknown = || UnknownVariant {
                    kind: $kind,
                    value: trimmed.to_string(),
                };

                if let Ok(ordinal) = trimmed.parse::<i64>() {
                    return Self::from_i64(ordinal).ok_or_else(unknown);
                }

                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(unknown)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                match RawEnumValue::deserialize(deserializer)? {
                    RawEnumValue::Ordinal(n) => Self::from_i64(n).ok_or_else(|| {
                        serde::de::Error::custom(UnknownVariant {
                            kind: $kind,
                            value: n.to_string(),
                        })
                    }),
                    RawEnumValue::Name(s) => s.parse().map_err(serde::de::Error::custom),
                }
            }
        }
    };
}

stored_enum! {
    /// Medio de envío.
    ChannelType: "channel" {
        Sms = 0 => "SMS",
        Mms = 1 => "MMS",
        Email = 2 => "Email",
    }
}

stored_enum! {
    /// Política para elegir proveedor dentro de un canal.
    #[derive(Default)]
    RoutingStrategy: "routing strategy" {
        #[default]
        Primary = 0 => "Primary",
        CostBased = 1 => "CostBased",
        RoundRobin = 2 => "RoundRobin",
    }
}

stored_enum! {
    #[derive(Default)]
    RetryStrategy: "retry strategy" {
        None = 0 => "None",
        Linear = 1 => "Linear",
        #[default]
        Exponential = 2 => "Exponential",
        Custom = 3 => "Custom",
    }
}

stored_enum! {
    /// Motivo por el que un intento se desvió del proveedor primario.
    FallbackReason: "fallback reason" {
        PrimaryFailed = 0 => "PrimaryFailed",
        RateLimitExceeded = 1 => "RateLimitExceeded",
        ProviderUnavailable = 2 => "ProviderUnavailable",
        CostThreshold = 3 => "CostThreshold",
    }
}
