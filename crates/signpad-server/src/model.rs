//! Stored requisitions and the JSON bodies the API exchanges.

use serde::{Deserialize, Serialize};
use signpad_core::{Purpose, RequisitionSubmission};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// A submission as persisted by the intake server.
///
/// `signature_data` is stored exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRequisition {
    pub id: String,
    pub request_number: String,
    pub total_amount: f64,
    /// Unix millis.
    pub created_at: u64,
    #[serde(flatten)]
    pub submission: RequisitionSubmission,
}

impl StoredRequisition {
    /// Accept a submission received at `now` (Unix millis).
    pub fn accept(submission: RequisitionSubmission, now: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            request_number: format!("REQ-{now}"),
            total_amount: submission.total_amount(),
            created_at: now,
            submission,
        }
    }

    pub fn summary(&self) -> RequisitionSummary {
        RequisitionSummary {
            id: self.id.clone(),
            request_number: self.request_number.clone(),
            branch: self.submission.branch.clone(),
            date: self.submission.date.clone(),
            purpose: self.submission.purpose,
            requested_by: self.submission.requested_by.clone(),
            item_count: self.submission.items.len(),
            total_amount: self.total_amount,
            created_at: self.created_at,
        }
    }
}

/// List entry; omits items and signature data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequisitionSummary {
    pub id: String,
    pub request_number: String,
    pub branch: String,
    pub date: String,
    pub purpose: Purpose,
    pub requested_by: String,
    pub item_count: usize,
    pub total_amount: f64,
    pub created_at: u64,
}

/// `?type=office|special` on the list route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurposeFilter {
    Office,
    Special,
}

impl PurposeFilter {
    pub fn matches(self, purpose: Purpose) -> bool {
        match self {
            PurposeFilter::Office => purpose == Purpose::OfficeSupplies,
            PurposeFilter::Special => purpose == Purpose::SpecialRequest,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub kind: Option<PurposeFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub message: String,
    pub id: String,
    pub request_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub success: bool,
    pub requisitions: Vec<RequisitionSummary>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailResponse {
    pub success: bool,
    pub requisition: StoredRequisition,
}

/// Current Unix time in milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use signpad_core::RequisitionItem;

    fn submission() -> RequisitionSubmission {
        RequisitionSubmission::new("Makati", "2026-10-18", "J. Cruz")
            .with_item(RequisitionItem::new(2, "ream", "Bond paper", 210.0))
            .with_item(RequisitionItem::new(1, "box", "Staples", 45.5))
            .with_signature("data:image/png;base64,AAAA")
    }

    #[test]
    fn test_accept_assigns_number_and_total() {
        let record = StoredRequisition::accept(submission(), 1_760_000_000_000);
        assert_eq!(record.request_number, "REQ-1760000000000");
        assert!((record.total_amount - 465.5).abs() < 1e-9);
        assert!(Uuid::parse_str(&record.id).is_ok());
    }

    #[test]
    fn test_flattened_wire_format() {
        let record = StoredRequisition::accept(submission(), 5);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["branch"], "Makati");
        assert_eq!(json["request_number"], "REQ-5");
        assert_eq!(json["signature_data"], "data:image/png;base64,AAAA");

        let parsed: StoredRequisition = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_summary_omits_signature() {
        let summary = StoredRequisition::accept(submission(), 5).summary();
        assert_eq!(summary.item_count, 2);
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("signature_data").is_none());
        assert_eq!(json["purpose"], "OFFICE SUPPLIES");
    }

    #[test]
    fn test_purpose_filter() {
        let query: ListQuery = serde_json::from_str(r#"{"type": "special"}"#).unwrap();
        let filter = query.kind.unwrap();
        assert!(filter.matches(Purpose::SpecialRequest));
        assert!(!filter.matches(Purpose::OfficeSupplies));
    }
}
