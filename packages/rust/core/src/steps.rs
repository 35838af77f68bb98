//! The eight fixed research steps.

use std::str::FromStr;

use minescout_shared::MineScoutError;
use serde::{Deserialize, Serialize};

/// One of the eight research questions, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Location,
    Coordinates,
    Commodity,
    Drilling,
    Stage,
    Resources,
    Competency,
    Process,
}

impl StepId {
    /// All steps in pipeline order.
    pub const ALL: [StepId; 8] = [
        Self::Location,
        Self::Coordinates,
        Self::Commodity,
        Self::Drilling,
        Self::Stage,
        Self::Resources,
        Self::Competency,
        Self::Process,
    ];

    /// Number of steps in a full research session.
    pub const COUNT: usize = Self::ALL.len();

    /// 1-based position in the pipeline.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    /// Stable identifier used in report columns and on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Coordinates => "coordinates",
            Self::Commodity => "commodity",
            Self::Drilling => "drilling",
            Self::Stage => "stage",
            Self::Resources => "resources",
            Self::Competency => "competency",
            Self::Process => "process",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Location => "Project Location",
            Self::Coordinates => "Geographic Coordinates",
            Self::Commodity => "Commodity Information",
            Self::Drilling => "Diamond Drilling Status",
            Self::Stage => "Project Development Stage",
            Self::Resources => "Resource Size and Grade",
            Self::Competency => "Ore Competency",
            Self::Process => "Process Flowsheet & HPGR",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Location => "Determine the location of the project (state in Australia or overseas)",
            Self::Coordinates => "Find longitude and latitude of the project",
            Self::Commodity => "Identify the commodity being explored or mined",
            Self::Drilling => "Check if the project has completed diamond drilling",
            Self::Stage => "Determine current stage: Exploration, Scoping Study, PFS, DFS",
            Self::Resources => "Find resource estimates in format: tonnage @ grade for ounces",
            Self::Competency => "Research UCS, BWI, AxB values or typical competency for the commodity",
            Self::Process => "Analyze process flowsheet and HPGR applicability",
        }
    }

    /// Prompt shown when asking the user for the fact they found.
    pub fn note_label(self) -> &'static str {
        match self {
            Self::Location => "Location found:",
            Self::Coordinates => "Coordinates found:",
            Self::Commodity => "Commodity found:",
            Self::Drilling => "Drilling status found:",
            Self::Stage => "Development stage found:",
            Self::Resources => "Resource estimate found:",
            Self::Competency => "Ore competency found:",
            Self::Process => "Process information found:",
        }
    }

    /// Example of a well-formed note.
    pub fn note_example(self) -> &'static str {
        match self {
            Self::Location => "Western Australia, Yilgarn Craton",
            Self::Coordinates => "Latitude: -31.234, Longitude: 121.567",
            Self::Commodity => "Gold, Copper, Iron Ore",
            Self::Drilling => "Diamond drilling completed - 50 holes, 15,000m",
            Self::Stage => "Pre-Feasibility Study (PFS) completed",
            Self::Resources => "118.7Mt @ 0.53g/t Au for 2.02 Moz",
            Self::Competency => "UCS: 150 MPa, BWI: 15 kWh/t",
            Self::Process => "Conventional crushing, grinding, CIL circuit",
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.number(), self.title())
    }
}

impl FromStr for StepId {
    type Err = MineScoutError;

    /// Accepts a step number (`3`) or slug (`commodity`, any case).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u8>() {
            return Self::from_number(n).ok_or_else(|| {
                MineScoutError::validation(format!("step number {n} is out of range 1..=8"))
            });
        }
        Self::ALL
            .into_iter()
            .find(|step| step.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| MineScoutError::validation(format!("unknown step '{s}'")))
    }
}
