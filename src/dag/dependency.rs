// src/dag/dependency.rs

use crate::unit::Status;

/// Whether a dependency needs its target to succeed or to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negated,
}

/// A parsed dependency reference such as `"Build"` or `"! Build"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub polarity: Polarity,
}

impl Dependency {
    /// Parse a raw reference. Surrounding whitespace is ignored, and a single
    /// leading `!` or `-` (itself optionally followed by whitespace) negates.
    pub fn parse(raw: &str) -> Self {
        let key = raw.trim();
        match key.strip_prefix('!').or_else(|| key.strip_prefix('-')) {
            Some(rest) => Self {
                name: rest.trim().to_string(),
                polarity: Polarity::Negated,
            },
            None => Self {
                name: key.to_string(),
                polarity: Polarity::Positive,
            },
        }
    }

    /// Status the target must reach for this dependency to be satisfied.
    pub fn wanted(&self) -> Status {
        match self.polarity {
            Polarity::Positive => Status::Succeeded,
            Polarity::Negated => Status::Failed,
        }
    }

    /// Status of the target that rules this dependency out for good.
    pub fn blocking(&self) -> Status {
        match self.polarity {
            Polarity::Positive => Status::Failed,
            Polarity::Negated => Status::Succeeded,
        }
    }
}
