//! Requisition submission payload carrying the exported signature.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pre-submit check failures, as shown on the requisition form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Please sign the requisition before submitting")]
    MissingSignature,
    #[error("Please add at least one item")]
    NoItems,
    #[error("Please add a note for special requests")]
    MissingNote,
}

/// What the requisition is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Purpose {
    #[default]
    #[serde(rename = "OFFICE SUPPLIES")]
    OfficeSupplies,
    #[serde(rename = "SPECIAL REQUEST")]
    SpecialRequest,
}

/// One requested line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequisitionItem {
    pub qty: u32,
    pub unit: String,
    pub description: String,
    /// Unit price.
    pub uprice: f64,
    pub amount: f64,
}

impl RequisitionItem {
    pub fn new(qty: u32, unit: impl Into<String>, description: impl Into<String>, uprice: f64) -> Self {
        Self {
            qty,
            unit: unit.into(),
            description: description.into(),
            uprice,
            amount: qty as f64 * uprice,
        }
    }
}

/// The payload a branch user submits.
///
/// `signature_data` is the pad's exported PNG data URL. It is opaque to
/// everything downstream of the pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequisitionSubmission {
    pub branch: String,
    pub date: String,
    #[serde(default = "default_recipient")]
    pub to: String,
    pub purpose: Purpose,
    #[serde(default)]
    pub items: Vec<RequisitionItem>,
    #[serde(default)]
    pub note: String,
    pub requested_by: String,
    #[serde(default)]
    pub signature_data: String,
}

fn default_recipient() -> String {
    "PURCHASING OFFICE".to_string()
}

impl RequisitionSubmission {
    pub fn new(branch: impl Into<String>, date: impl Into<String>, requested_by: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            date: date.into(),
            to: default_recipient(),
            purpose: Purpose::default(),
            items: Vec::new(),
            note: String::new(),
            requested_by: requested_by.into(),
            signature_data: String::new(),
        }
    }

    pub fn with_purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = purpose;
        self
    }

    pub fn with_item(mut self, item: RequisitionItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Attach an exported signature image.
    pub fn with_signature(mut self, data_url: impl Into<String>) -> Self {
        self.signature_data = data_url.into();
        self
    }

    /// Sum of item amounts.
    pub fn total_amount(&self) -> f64 {
        self.items.iter().map(|i| i.amount).sum()
    }

    /// Checks the form runs before sending, in the form's order.
    pub fn check(&self) -> Result<(), SubmissionError> {
        if self.signature_data.is_empty() {
            return Err(SubmissionError::MissingSignature);
        }
        if self.items.is_empty() {
            return Err(SubmissionError::NoItems);
        }
        if self.purpose == Purpose::SpecialRequest && self.note.trim().is_empty() {
            return Err(SubmissionError::MissingNote);
        }
        Ok(())
    }
}
