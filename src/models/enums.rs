use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(UserRole {
    Patient => "patient",
    Doctor => "doctor",
    Admin => "admin",
});

str_enum!(RequestStatus {
    Pending => "Pending",
    Accepted => "Accepted",
    Closed => "Closed",
});

str_enum!(NotificationStatus {
    Unread => "unread",
    Read => "read",
});

str_enum!(RequestFlag {
    Normal => "N",
    Urgent => "Y",
});

impl RequestStatus {
    /// Pending → Accepted → Closed, plus Pending → Closed. Nothing leaves Closed.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Accepted)
                | (RequestStatus::Pending, RequestStatus::Closed)
                | (RequestStatus::Accepted, RequestStatus::Closed)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == RequestStatus::Closed
    }
}

impl Default for RequestFlag {
    fn default() -> Self {
        RequestFlag::Normal
    }
}
