//! Family roster configuration
//!
//! The roster maps family bubble slots to names and photo files. A default
//! roster is embedded at build time; a hosting page can override it with a
//! `<script type="application/json" id="roster">` element.

use serde::{Deserialize, Serialize};

/// Embedded default roster
const DEFAULT_ROSTER_JSON: &str = include_str!("../assets/roster.json");

/// One family member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    /// Photo file name, resolved relative to the `family/` asset directory
    pub file: String,
}

/// The full family roster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub members: Vec<Member>,
}

impl Roster {
    /// Parse a roster from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The embedded default roster. Falls back to an empty roster (no family
    /// bubbles) if the embedded JSON is malformed.
    pub fn embedded() -> Self {
        match Self::from_json(DEFAULT_ROSTER_JSON) {
            Ok(roster) => roster,
            Err(e) => {
                log::warn!("embedded roster is malformed ({e}), family bubbles disabled");
                Self::default()
            }
        }
    }

    /// Member names in roster order, for the simulation's name reveals
    pub fn names(&self) -> Vec<String> {
        self.members.iter().map(|m| m.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
