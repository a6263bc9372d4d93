//! Order reference value object
//!
//! Every dispatched booking carries two identifiers: a numeric job id shown
//! to passengers and staff, and an opaque hex order id required by the
//! upstream for state-changing calls. Responses do not reliably contain
//! both, so the reference keeps whichever ids are known and synthesizes the
//! missing one on access.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// The job-id / order-id pair identifying one dispatched booking
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderRef {
    /// Opaque hex id used for cancel/amend/status calls
    #[serde(skip_serializing_if = "Option::is_none")]
    order_id: Option<String>,
    /// Numeric id used for display and customer references
    #[serde(skip_serializing_if = "Option::is_none")]
    job_id: Option<u64>,
}

impl OrderRef {
    /// Create a reference from whichever identifiers are known
    ///
    /// # Errors
    ///
    /// Returns `MissingIdentifier` when neither id is present.
    pub fn new(order_id: Option<String>, job_id: Option<u64>) -> Result<Self, DomainError> {
        let order_id = order_id.filter(|id| !id.trim().is_empty());
        if order_id.is_none() && job_id.is_none() {
            return Err(DomainError::MissingIdentifier);
        }
        Ok(Self { order_id, job_id })
    }

    /// Create a reference from an order id alone
    #[must_use]
    pub fn from_order_id(order_id: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            job_id: None,
        }
    }

    /// Create a reference from a job id alone
    #[must_use]
    pub const fn from_job_id(job_id: u64) -> Self {
        Self {
            order_id: None,
            job_id: Some(job_id),
        }
    }

    /// The hex order id, when known
    #[must_use]
    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    /// The numeric job id, when known
    #[must_use]
    pub const fn job_id(&self) -> Option<u64> {
        self.job_id
    }

    /// Identifier to place in upstream URL paths
    ///
    /// Prefers the hex order id; falls back to the job id rendered decimal
    /// (the upstream resolves both in path position).
    #[must_use]
    pub fn api_id(&self) -> String {
        self.order_id
            .clone()
            .or_else(|| self.job_id.map(|id| id.to_string()))
            .unwrap_or_default()
    }

    /// Identifier to show passengers and staff
    ///
    /// Prefers the numeric job id; falls back to the hex order id when the
    /// upstream never reported a job number.
    #[must_use]
    pub fn display_id(&self) -> String {
        self.job_id
            .map(|id| id.to_string())
            .or_else(|| self.order_id.clone())
            .unwrap_or_default()
    }

    /// Merge in identifiers learned from a later upstream response
    #[must_use]
    pub fn merged_with(&self, other: &Self) -> Self {
        Self {
            order_id: self.order_id.clone().or_else(|| other.order_id.clone()),
            job_id: self.job_id.or(other.job_id),
        }
    }
}

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_at_least_one_identifier() {
        assert!(OrderRef::new(None, None).is_err());
        assert!(OrderRef::new(Some("  ".to_string()), None).is_err());
        assert!(OrderRef::new(Some("a3f9".to_string()), None).is_ok());
        assert!(OrderRef::new(None, Some(4521)).is_ok());
    }

    #[test]
    fn api_id_prefers_order_id() {
        let both = OrderRef::new(Some("a3f9c2".to_string()), Some(4521)).unwrap();
        assert_eq!(both.api_id(), "a3f9c2");
    }

    #[test]
    fn api_id_falls_back_to_job_id() {
        let job_only = OrderRef::from_job_id(4521);
        assert_eq!(job_only.api_id(), "4521");
    }

    #[test]
    fn display_id_prefers_job_id() {
        let both = OrderRef::new(Some("a3f9c2".to_string()), Some(4521)).unwrap();
        assert_eq!(both.display_id(), "4521");
    }

    #[test]
    fn display_id_falls_back_to_order_id() {
        let order_only = OrderRef::from_order_id("a3f9c2");
        assert_eq!(order_only.display_id(), "a3f9c2");
    }

    #[test]
    fn merged_with_fills_gaps() {
        let original = OrderRef::from_job_id(4521);
        let from_status = OrderRef::from_order_id("a3f9c2");
        let merged = original.merged_with(&from_status);
        assert_eq!(merged.job_id(), Some(4521));
        assert_eq!(merged.order_id(), Some("a3f9c2"));
    }

    #[test]
    fn merge_prefers_existing_values() {
        let original = OrderRef::from_order_id("original");
        let other = OrderRef::from_order_id("other");
        assert_eq!(original.merged_with(&other).order_id(), Some("original"));
    }

    #[test]
    fn display_uses_display_id() {
        let both = OrderRef::new(Some("a3f9c2".to_string()), Some(4521)).unwrap();
        assert_eq!(both.to_string(), "4521");
    }

    #[test]
    fn serialization_skips_absent_ids() {
        let job_only = OrderRef::from_job_id(7);
        let json = serde_json::to_string(&job_only).unwrap();
        assert_eq!(json, r#"{"job_id":7}"#);
    }
}
