//! Order amendment coordination
//!
//! The upstream has no reliable in-place edit, so amendments walk a fixed
//! escalation: try `PUT`, then `PATCH`, then cancel the original and book
//! the replacement as a new order. Each step runs exactly once. The one
//! genuinely dangerous window is after a successful cancel with a failed
//! rebook: the original is gone and nothing replaced it. That outcome is
//! [`BookerError::PartiallyFailed`] and is never reported as a plain
//! failure.

use std::fmt;

use domain::OrderRef;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::client::{OrderApi, UpdateMethod};
use crate::error::BookerError;
use crate::models::{OrderDocument, OrderUpdate, UpdateOutcome};

/// Cancellation reason recorded upstream when an amendment rebooks
pub const AMEND_CANCEL_REASON: &str = "Superseded by an amended booking";

/// How an amendment ultimately took effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmendmentMethod {
    /// The original order was edited in place; identifiers unchanged
    DirectUpdate,
    /// The original was cancelled and a replacement booked; identifiers
    /// changed
    CancelAndRebook,
}

impl fmt::Display for AmendmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DirectUpdate => "direct-update",
            Self::CancelAndRebook => "cancel-and-rebook",
        };
        write!(f, "{label}")
    }
}

/// Successful amendment outcome
#[derive(Debug, Clone, PartialEq)]
pub struct AmendmentResult {
    /// Correlation id for this attempt, present in every log line
    pub attempt_id: Uuid,
    /// How the amendment took effect
    pub method: AmendmentMethod,
    /// The live order after the amendment
    pub order_ref: OrderRef,
    /// The original order, when it was replaced rather than edited
    pub replaced: Option<OrderRef>,
}

/// The escalation steps, in order
///
/// `Init` exists so every attempt starts from one logged entry point;
/// identifier presence is guaranteed by [`OrderRef`] construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AmendState {
    Init,
    TryUpdate,
    TryPatch,
    CancelOriginal,
    RebookNew,
}

/// Walks an amendment through the update/patch/cancel/rebook escalation
pub struct AmendmentCoordinator<'a> {
    client: &'a dyn OrderApi,
}

impl fmt::Debug for AmendmentCoordinator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmendmentCoordinator").finish_non_exhaustive()
    }
}

impl<'a> AmendmentCoordinator<'a> {
    /// Create a coordinator over an order API client
    #[must_use]
    pub const fn new(client: &'a dyn OrderApi) -> Self {
        Self { client }
    }

    /// Amend an order, escalating until one approach sticks
    ///
    /// `update` is the partial payload for the in-place attempts;
    /// `replacement` is the complete order submitted if the original has
    /// to be rebooked. Dropping the returned future between steps aborts
    /// cleanly: a cancelled cancel never proceeds to the rebook.
    ///
    /// # Errors
    ///
    /// Returns the cancel error when the original could not be released
    /// (it is presumed still active), or
    /// [`BookerError::PartiallyFailed`] when the original was cancelled
    /// but the replacement could not be placed.
    #[instrument(skip(self, update, replacement), fields(target = %original.display_id()))]
    pub async fn amend(
        &self,
        original: &OrderRef,
        update: &OrderUpdate,
        replacement: &OrderDocument,
    ) -> Result<AmendmentResult, BookerError> {
        let attempt_id = Uuid::new_v4();
        let api_id = original.api_id();
        let mut state = AmendState::Init;

        loop {
            state = match state {
                AmendState::Init => {
                    debug!(%attempt_id, %api_id, "Starting amendment");
                    AmendState::TryUpdate
                }

                AmendState::TryUpdate => {
                    match self
                        .client
                        .update_order(&api_id, update, UpdateMethod::Put)
                        .await
                    {
                        Ok(UpdateOutcome::Applied) => {
                            info!(%attempt_id, "Amendment applied in place via PUT");
                            return Ok(AmendmentResult {
                                attempt_id,
                                method: AmendmentMethod::DirectUpdate,
                                order_ref: original.clone(),
                                replaced: None,
                            });
                        }
                        Ok(UpdateOutcome::Rejected { reason }) => {
                            debug!(%attempt_id, %reason, "PUT not applied, trying PATCH");
                            AmendState::TryPatch
                        }
                        Err(err) => {
                            debug!(%attempt_id, error = %err, "PUT failed, trying PATCH");
                            AmendState::TryPatch
                        }
                    }
                }

                AmendState::TryPatch => {
                    match self
                        .client
                        .update_order(&api_id, update, UpdateMethod::Patch)
                        .await
                    {
                        Ok(UpdateOutcome::Applied) => {
                            info!(%attempt_id, "Amendment applied in place via PATCH");
                            return Ok(AmendmentResult {
                                attempt_id,
                                method: AmendmentMethod::DirectUpdate,
                                order_ref: original.clone(),
                                replaced: None,
                            });
                        }
                        Ok(UpdateOutcome::Rejected { reason }) => {
                            debug!(%attempt_id, %reason, "PATCH not applied, falling back to cancel and rebook");
                            AmendState::CancelOriginal
                        }
                        Err(err) => {
                            debug!(%attempt_id, error = %err, "PATCH failed, falling back to cancel and rebook");
                            AmendState::CancelOriginal
                        }
                    }
                }

                AmendState::CancelOriginal => {
                    match self.client.cancel_order(&api_id, AMEND_CANCEL_REASON).await {
                        Ok(outcome) => {
                            debug!(%attempt_id, ?outcome, "Original order released");
                            AmendState::RebookNew
                        }
                        Err(err) => {
                            warn!(%attempt_id, error = %err, "Could not cancel the original order; it stays active");
                            return Err(err);
                        }
                    }
                }

                AmendState::RebookNew => match self.client.create_order(replacement).await {
                    Ok(new_ref) => {
                        info!(
                            %attempt_id,
                            old = %original.display_id(),
                            new = %new_ref.display_id(),
                            "Amendment completed by rebooking"
                        );
                        return Ok(AmendmentResult {
                            attempt_id,
                            method: AmendmentMethod::CancelAndRebook,
                            order_ref: new_ref,
                            replaced: Some(original.clone()),
                        });
                    }
                    Err(err) => {
                        warn!(%attempt_id, error = %err, "Original cancelled but rebooking failed");
                        return Err(BookerError::PartiallyFailed {
                            cancelled: original.display_id(),
                            reason: err.to_string(),
                        });
                    }
                },
            };
        }
    }
}
