use std::fmt;

use super::Validator;

/// Extrinsic hash returned once a batch is included on chain
pub type TxHash = subxt::utils::H256;

pub const TIMEOUT_OUTCOME_UNKNOWN: &str = "timeout, outcome unknown";
pub const TIMEOUT_NOT_ATTEMPTED: &str = "timeout, not attempted";

/// Terminal result of one validator's payout pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Every batch for the validator was included, hashes in submission order
    Success { tx_hashes: Vec<TxHash> },
    /// Nothing left to claim in the window
    NoOp,
    /// The chain returned no claimed-era data for the validator
    Inconclusive { detail: String },
    /// The claimed-era query itself failed
    QueryFailed { reason: String },
    /// A batch was rejected or could not be submitted. `included` holds
    /// earlier batches of the same validator that did land.
    Failure { reason: String, included: Vec<TxHash> },
}

impl SubmissionOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        SubmissionOutcome::Failure {
            reason: reason.into(),
            included: Vec::new(),
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            SubmissionOutcome::Success { .. } => OutcomeKind::Success,
            SubmissionOutcome::NoOp => OutcomeKind::NoOp,
            SubmissionOutcome::Inconclusive { .. } => OutcomeKind::Inconclusive,
            SubmissionOutcome::QueryFailed { .. } => OutcomeKind::QueryError,
            SubmissionOutcome::Failure { .. } => OutcomeKind::Failure,
        }
    }

    /// Transaction hashes for successes, error text for failures
    pub fn detail(&self) -> String {
        match self {
            SubmissionOutcome::Success { tx_hashes } => tx_hashes
                .iter()
                .map(format_tx_hash)
                .collect::<Vec<_>>()
                .join(","),
            SubmissionOutcome::NoOp => String::new(),
            SubmissionOutcome::Inconclusive { detail } => detail.clone(),
            SubmissionOutcome::QueryFailed { reason } => reason.clone(),
            SubmissionOutcome::Failure { reason, included } if included.is_empty() => {
                reason.clone()
            }
            SubmissionOutcome::Failure { reason, included } => format!(
                "{} (already included: {})",
                reason,
                included
                    .iter()
                    .map(format_tx_hash)
                    .collect::<Vec<_>>()
                    .join(",")
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    NoOp,
    Inconclusive,
    QueryError,
    Failure,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::NoOp => "noop",
            OutcomeKind::Inconclusive => "inconclusive",
            OutcomeKind::QueryError => "query_error",
            OutcomeKind::Failure => "failure",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full-length lowercase hex with `0x` prefix
pub fn format_tx_hash(hash: &TxHash) -> String {
    format!("0x{}", hex::encode(hash.as_bytes()))
}

/// `(validatorAddress, outcomeKind, detail)` row handed to the CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub validator: String,
    pub kind: OutcomeKind,
    pub detail: String,
}

/// Ordered outcomes of one payout run, one entry per configured validator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    entries: Vec<(Validator, SubmissionOutcome)>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, validator: Validator, outcome: SubmissionOutcome) {
        self.entries.push((validator, outcome));
    }

    pub fn entries(&self) -> &[(Validator, SubmissionOutcome)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn outcome_for(&self, address: &str) -> Option<&SubmissionOutcome> {
        self.entries
            .iter()
            .find(|(validator, _)| validator.address == address)
            .map(|(_, outcome)| outcome)
    }

    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.entries
            .iter()
            .filter(|(_, outcome)| outcome.kind() == kind)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(OutcomeKind::Failure) > 0
    }

    pub fn rows(&self) -> Vec<SummaryRow> {
        self.entries
            .iter()
            .map(|(validator, outcome)| SummaryRow {
                validator: validator.address.clone(),
                kind: outcome.kind(),
                detail: outcome.detail(),
            })
            .collect()
    }
}
