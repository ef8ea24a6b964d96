use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use crate::error::ValidationError;

/// Largest legitimate party, also the ceiling for the swap bounds
pub const MAX_PARTY_SIZE: u8 = 6;

/// Slots per storage box
pub const BOX_CAPACITY: u32 = 30;

/// Number of boxes the storage grid can page through
pub const MAX_BOXES: u32 = 32;

/// Snapshot of a configuration, also the persisted record layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigRecord {
    pub party_size: u8,
    pub min: u8,
    pub max: u8,
    pub boxed: u32,
    pub swapins: bool,
    pub shifts: bool,
    pub diff_swaps: bool,
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self {
            party_size: 1,
            min: 1,
            max: 1,
            boxed: 0,
            swapins: false,
            shifts: false,
            diff_swaps: false,
        }
    }
}

impl ConfigRecord {
    /// Checks the invariants a record must satisfy to be loaded
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.party_size == 0 {
            return Err(ValidationError::NotAPartySize { field: Field::PartySize, value: 0 });
        }
        for (field, value) in [
            (Field::PartySize, self.party_size),
            (Field::Min, self.min),
            (Field::Max, self.max),
        ] {
            if value > MAX_PARTY_SIZE {
                return Err(ValidationError::NotAPartySize { field, value: value as i64 });
            }
        }
        if self.min > self.max {
            return Err(ValidationError::MinAboveMax { min: self.min, max: self.max });
        }
        Ok(())
    }

    /// Clears fewer swap-ins when swap-ins are off, as every load does
    pub fn normalized(mut self) -> Self {
        if !self.swapins {
            self.diff_swaps = false;
        }
        self
    }
}

/// Configuration fields that can be set one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    PartySize,
    Min,
    Max,
    Boxed,
    SwapIns,
    Shifts,
    DiffSwaps,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::PartySize,
        Field::Min,
        Field::Max,
        Field::Boxed,
        Field::SwapIns,
        Field::Shifts,
        Field::DiffSwaps,
    ];

    /// Record key for this field
    pub fn name(self) -> &'static str {
        match self {
            Field::PartySize => "party_size",
            Field::Min => "min",
            Field::Max => "max",
            Field::Boxed => "boxed",
            Field::SwapIns => "swapins",
            Field::Shifts => "shifts",
            Field::DiffSwaps => "diff_swaps",
        }
    }

    pub fn is_flag(self) -> bool {
        matches!(self, Field::SwapIns | Field::Shifts | Field::DiffSwaps)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| ValidationError::UnknownField(s.to_string()))
    }
}

/// Ordered pick groups: group 0 is the party, group N is storage box N
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwapPlan {
    pub groups: Vec<Vec<u8>>,
}

impl SwapPlan {
    /// Party slots to swap out
    pub fn party(&self) -> &[u8] {
        self.groups.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Picks for a 1-based storage box, empty when the plan has none
    pub fn box_picks(&self, box_number: usize) -> &[u8] {
        if box_number == 0 {
            return &[];
        }
        self.groups.get(box_number).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Result of asking for swaps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    Plan(SwapPlan),
    /// A lone party member with empty storage has nothing to swap with
    NothingToSwap,
}

impl SwapOutcome {
    pub fn into_plan(self) -> SwapPlan {
        match self {
            SwapOutcome::Plan(plan) => plan,
            SwapOutcome::NothingToSwap => SwapPlan::default(),
        }
    }
}
