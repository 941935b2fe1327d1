pub mod api;
pub mod traits;

pub use api::{PayoutSigner, PeoChainApi};
pub use traits::{ChainQuery, ClaimedEraQuery, ExtrinsicSubmitter};
