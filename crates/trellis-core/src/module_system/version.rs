//! Module versions are plain [`semver::Version`]s; dependency constraints are
//! [`VersionRange`]s, which remember the text they were written as so error
//! messages and listings show the manifest's own spelling.
use std::fmt;
use std::str::FromStr;

use semver::{Version, VersionReq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("'{input}' is not a valid module version: {message}")]
    InvalidVersion { input: String, message: String },

    #[error("'{input}' is not a valid version constraint: {message}")]
    InvalidConstraint { input: String, message: String },
}

/// Parse a full `major.minor.patch` module version, ignoring surrounding whitespace
pub fn parse_version(input: &str) -> Result<Version, VersionError> {
    Version::parse(input.trim()).map_err(|e| VersionError::InvalidVersion {
        input: input.to_string(),
        message: e.to_string(),
    })
}

/// A semver requirement such as `^1.2`, `>=2.0, <3` or `~0.4.1`
#[derive(Debug, Clone)]
pub struct VersionRange {
    raw: String,
    req: VersionReq,
}

impl VersionRange {
    pub fn from_constraint(constraint: &str) -> Result<Self, VersionError> {
        let raw = constraint.trim();
        match VersionReq::parse(raw) {
            Ok(req) => Ok(Self {
                raw: raw.to_string(),
                req,
            }),
            Err(e) => Err(VersionError::InvalidConstraint {
                input: constraint.to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Whether `version` satisfies the requirement
    pub fn includes(&self, version: &Version) -> bool {
        self.req.matches(version)
    }

    pub fn semver_req(&self) -> &VersionReq {
        &self.req
    }

    /// The constraint as it was written
    pub fn constraint_string(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_constraint(s)
    }
}

/// Two ranges are equal when they accept the same requirement, however spelled
impl PartialEq for VersionRange {
    fn eq(&self, other: &Self) -> bool {
        self.req == other.req
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_constraint(&raw).map_err(serde::de::Error::custom)
    }
}
