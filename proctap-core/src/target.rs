//! Target process identifiers
//!
//! A target is either a process name or a numeric PID. Command-line input is
//! disambiguated the same way frida's own tooling does it: an argument made up
//! entirely of ASCII digits is a PID, anything else is a name.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The process to attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// Exact process name, resolved against the local process list at attach time.
    Name(String),
    /// Process ID, attached to directly.
    Pid(u32),
}

impl FromStr for Target {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(pid) = s.parse::<u32>() {
                return Ok(Target::Pid(pid));
            }
        }
        Ok(Target::Name(s.to_string()))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Name(name) => f.write_str(name),
            Target::Pid(pid) => write!(f, "{pid}"),
        }
    }
}
