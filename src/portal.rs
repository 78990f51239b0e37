use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

/// Which login page a request or an issued OTP belongs to.
#[derive(ToSchema, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Portal {
    Hosteller,
    Warden,
}

impl Portal {
    pub const ALL: [Self; 2] = [Self::Hosteller, Self::Warden];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Hosteller => "hosteller",
            Self::Warden => "warden",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Hosteller => "Hosteller",
            Self::Warden => "Warden",
        }
    }

    #[must_use]
    pub const fn login_path(self) -> &'static str {
        match self {
            Self::Hosteller => "/hosteller/login",
            Self::Warden => "/warden/login",
        }
    }

    /// The portal each login page links across to.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Hosteller => Self::Warden,
            Self::Warden => Self::Hosteller,
        }
    }
}

impl fmt::Display for Portal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Portal {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "hosteller" => Ok(Self::Hosteller),
            "warden" => Ok(Self::Warden),
            other => Err(format!("unknown portal: {other}")),
        }
    }
}
