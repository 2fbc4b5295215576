//! Repair outcome reporting.
//!
//! A repair session terminates in a [`FixReport`]: a status from the closed
//! [`RepairStatus`] set plus an ordered list of human-readable fix
//! descriptions. Reports are immutable; they are assembled through
//! [`FixReportBuilder`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal status of a repair pass.
///
/// This is the closed enumeration that crosses the engine's output boundary.
/// The upstream validator supplies one as the prior status of a session; the
/// session hands one back inside the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepairStatus {
    /// The input required no repair.
    NoAction,
    /// Repair was required and applied cleanly.
    Success,
    /// Repair was attempted and failed; the report lists descriptions.
    FixError,
    /// The document /ID array was cleared to satisfy validation.
    IdRemoved,
    /// Repair refused on policy grounds.
    WontFix,
}

impl RepairStatus {
    /// Status applied after a commit that actually wrote bytes: `NoAction`
    /// becomes `Success`, every other status is preserved verbatim.
    pub(crate) fn promoted(self) -> Self {
        match self {
            RepairStatus::NoAction => RepairStatus::Success,
            other => other,
        }
    }
}

impl fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepairStatus::NoAction => "no action",
            RepairStatus::Success => "success",
            RepairStatus::FixError => "fix error",
            RepairStatus::IdRemoved => "ID removed",
            RepairStatus::WontFix => "won't fix",
        };
        write!(f, "{}", name)
    }
}

/// Immutable record of a finished repair session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixReport {
    status: RepairStatus,
    fixes: Vec<String>,
}

impl FixReport {
    /// The terminal status.
    pub fn status(&self) -> RepairStatus {
        self.status
    }

    /// Fix descriptions in the order the fixes occurred.
    pub fn fixes(&self) -> &[String] {
        &self.fixes
    }
}

impl fmt::Display for FixReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        for fix in &self.fixes {
            write!(f, "; {}", fix)?;
        }
        Ok(())
    }
}

/// Accumulates a status and fix descriptions, then emits a [`FixReport`].
///
/// The status is last-write-wins. Descriptions keep insertion order and
/// duplicates are permitted.
#[derive(Debug)]
pub struct FixReportBuilder {
    status: RepairStatus,
    fixes: Vec<String>,
}

impl FixReportBuilder {
    /// Create a builder with status `NoAction` and no fixes.
    pub fn new() -> Self {
        Self {
            status: RepairStatus::NoAction,
            fixes: Vec::new(),
        }
    }

    /// Overwrite the status.
    pub fn set_status(&mut self, status: RepairStatus) -> &mut Self {
        self.status = status;
        self
    }

    /// Append one fix description.
    pub fn add_fix(&mut self, description: impl Into<String>) -> &mut Self {
        self.fixes.push(description.into());
        self
    }

    /// Finish and produce the immutable report.
    pub fn build(self) -> FixReport {
        FixReport {
            status: self.status,
            fixes: self.fixes,
        }
    }
}

impl Default for FixReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
