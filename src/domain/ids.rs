// Platform identifiers - Integer ids assigned by the BI server
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

macro_rules! platform_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Accepts only JSON integers; strings and floats are rejected.
            pub fn from_value(value: &Value) -> Option<Self> {
                value.as_i64().map(Self)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for Value {
            fn from(id: $name) -> Self {
                Value::from(id.0)
            }
        }
    };
}

platform_id!(
    /// Numeric id of a dashboard
    DashboardId
);
platform_id!(
    /// Numeric id of a chart (slice)
    ChartId
);
platform_id!(
    /// Numeric id of a dataset
    DatasetId
);
