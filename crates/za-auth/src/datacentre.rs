//! Zoho data centres.

use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// A Zoho data centre. Each one has its own accounts and analytics hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataCentre {
    /// United States (`.com`).
    #[default]
    Us,
    /// Europe (`.eu`).
    Eu,
    /// India (`.in`).
    In,
    /// Australia (`.com.au`).
    Au,
    /// China (`.com.cn`).
    Cn,
    /// Japan (`.jp`).
    Jp,
}

impl DataCentre {
    /// Domain suffix after `zoho`.
    pub fn domain(&self) -> &'static str {
        match self {
            DataCentre::Us => ".com",
            DataCentre::Eu => ".eu",
            DataCentre::In => ".in",
            DataCentre::Au => ".com.au",
            DataCentre::Cn => ".com.cn",
            DataCentre::Jp => ".jp",
        }
    }

    /// Accounts (OAuth) server URL.
    pub fn accounts_url(&self) -> String {
        format!("https://accounts.zoho{}", self.domain())
    }

    /// Analytics API server URL.
    pub fn analytics_url(&self) -> String {
        format!("https://analyticsapi.zoho{}", self.domain())
    }
}

impl FromStr for DataCentre {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "us" | "com" => Ok(DataCentre::Us),
            "eu" => Ok(DataCentre::Eu),
            "in" => Ok(DataCentre::In),
            "au" | "com.au" => Ok(DataCentre::Au),
            "cn" | "com.cn" => Ok(DataCentre::Cn),
            "jp" => Ok(DataCentre::Jp),
            other => Err(Error::new(ErrorKind::Config(format!(
                "unknown data centre '{}'",
                other
            )))),
        }
    }
}
