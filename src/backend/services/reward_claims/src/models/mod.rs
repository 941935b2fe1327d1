pub mod batch;
pub mod era;
pub mod outcome;
pub mod settings;
pub mod validator;

pub use batch::{BatchRequest, PayoutCall};
pub use era::{ClaimWindow, ClaimedEraSet, Era, UnclaimedEraSet};
pub use outcome::{OutcomeKind, RunSummary, SubmissionOutcome, SummaryRow, TxHash};
pub use settings::PayoutSettings;
pub use validator::{Balance, Validator};
