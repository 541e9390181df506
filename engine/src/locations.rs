use serde::{Deserialize, Serialize};

use crate::content::EraId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub era: EraId,
    pub discovered: bool,
    pub visited: bool,
    #[serde(default)]
    pub icon: String,
    /// 1 (safe) to 5 (deadly).
    pub danger_level: u8,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub connected_to: Vec<String>,
}

impl Location {
    /// Returns true when this call revealed the location.
    pub fn discover(&mut self) -> bool {
        !std::mem::replace(&mut self.discovered, true)
    }

    /// Visiting implies discovery. Returns `(newly_discovered, first_visit)`.
    pub fn visit(&mut self) -> (bool, bool) {
        let newly = self.discover();
        (newly, !std::mem::replace(&mut self.visited, true))
    }
}
