use serde::{Deserialize, Serialize};

use crate::domain::errors::GuestRuleError;

pub const MIN_PASSES: u32 = 1;
pub const MAX_PASSES: u32 = 20;

// One invited party. `confirmed` is absent until the guest responds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub id: String,
    pub name: String,
    pub passes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<u32>,
}

impl Guest {
    /// Checks the record-level invariants: trimmed name is non-empty, passes
    /// within `MIN_PASSES..=MAX_PASSES`, and `confirmed` never above `passes`.
    pub fn check_invariants(&self) -> Result<(), GuestRuleError> {
        if self.id.trim().is_empty() {
            return Err(GuestRuleError::EmptyId);
        }
        check_name(&self.name)?;
        check_passes(self.passes)?;
        if let Some(confirmed) = self.confirmed {
            check_confirmed(confirmed, self.passes)?;
        }
        Ok(())
    }
}

// Admin input for creating a guest; the id is allocated by the directory.
#[derive(Clone, Debug, Deserialize)]
pub struct NewGuest {
    pub name: String,
    pub passes: u32,
}

// Admin input for editing a guest. Absent fields are left alone.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GuestChanges {
    pub name: Option<String>,
    pub passes: Option<u32>,
}

// Partial write sent to a store. Only present fields are merged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuestPatch {
    pub name: Option<String>,
    pub passes: Option<u32>,
    pub confirmed: Option<u32>,
}

impl GuestPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.passes.is_none() && self.confirmed.is_none()
    }

    // Apply the patch in place, mirroring the field-wise merge stores perform.
    pub fn apply_to(&self, guest: &mut Guest) {
        if let Some(name) = &self.name {
            guest.name = name.clone();
        }
        if let Some(passes) = self.passes {
            guest.passes = passes;
        }
        if let Some(confirmed) = self.confirmed {
            guest.confirmed = Some(confirmed);
        }
    }
}

// Aggregates derived from the current guest set; never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GuestSummary {
    pub total_guests: usize,
    pub total_passes: u32,
    pub total_confirmed_persons: u32,
    pub responded_count: usize,
}

impl GuestSummary {
    pub fn from_guests(guests: &[Guest]) -> Self {
        Self {
            total_guests: guests.len(),
            total_passes: total_passes(guests),
            total_confirmed_persons: total_confirmed_persons(guests),
            responded_count: responded_count(guests),
        }
    }
}

pub fn total_passes(guests: &[Guest]) -> u32 {
    guests.iter().map(|guest| guest.passes).sum()
}

pub fn total_confirmed_persons(guests: &[Guest]) -> u32 {
    guests.iter().filter_map(|guest| guest.confirmed).sum()
}

pub fn responded_count(guests: &[Guest]) -> usize {
    guests.iter().filter(|guest| guest.confirmed.is_some()).count()
}

pub(crate) fn check_name(name: &str) -> Result<(), GuestRuleError> {
    if name.trim().is_empty() {
        return Err(GuestRuleError::EmptyName);
    }
    Ok(())
}

pub(crate) fn check_passes(passes: u32) -> Result<(), GuestRuleError> {
    if !(MIN_PASSES..=MAX_PASSES).contains(&passes) {
        return Err(GuestRuleError::PassesOutOfRange(passes));
    }
    Ok(())
}

pub(crate) fn check_confirmed(confirmed: u32, passes: u32) -> Result<(), GuestRuleError> {
    if confirmed > passes {
        return Err(GuestRuleError::ConfirmedAbovePasses { confirmed, passes });
    }
    Ok(())
}
