//! Mode Selector
//!
//! Gates which destination field is live. Holds no transfer data.

use super::types::TransferMode;

/// Interactivity of the two destination inputs for a given mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldGate {
    pub destination_select_enabled: bool,
    pub destination_number_enabled: bool,
    pub destination_number_visible: bool,
}

impl FieldGate {
    pub fn for_mode(mode: TransferMode) -> Self {
        let by_number = mode == TransferMode::ByNumber;
        Self {
            destination_select_enabled: !by_number,
            destination_number_enabled: by_number,
            destination_number_visible: by_number,
        }
    }
}

/// Current destination mode; changes only on an explicit user toggle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeSelector {
    mode: TransferMode,
}

impl ModeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    pub fn gate(&self) -> FieldGate {
        FieldGate::for_mode(self.mode)
    }

    /// Flip between the two modes, returning the new one
    pub fn toggle(&mut self) -> TransferMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    /// Set the mode from a checkbox-style control. Returns true if it changed.
    pub fn set(&mut self, mode: TransferMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }
}
