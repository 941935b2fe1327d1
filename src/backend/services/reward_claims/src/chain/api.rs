use async_trait::async_trait;
use std::{fmt::Debug, str::FromStr};
use subxt::{
    dynamic::{self, Value},
    ext::scale_value::{At, ValueDef},
    utils::AccountId32,
    OnlineClient, PolkadotConfig,
};
use subxt_signer::sr25519::Keypair;
use tracing::debug;

use super::traits::{ChainQuery, ClaimedEraQuery, ExtrinsicSubmitter};
use crate::models::{Balance, BatchRequest, ClaimWindow, ClaimedEraSet, Era, PayoutCall, TxHash};
use crate::utils::errors::ChainError;

/// API client for reading staking state from a Substrate node
#[derive(Clone)]
pub struct PeoChainApi {
    client: OnlineClient<PolkadotConfig>,
}

impl PeoChainApi {
    /// Connect to the node at `node_url` and download its metadata
    pub async fn new(node_url: &str) -> Result<Self, ChainError> {
        let connecting = if node_url.starts_with("ws://") || node_url.starts_with("http://") {
            OnlineClient::<PolkadotConfig>::from_insecure_url(node_url).await
        } else {
            OnlineClient::<PolkadotConfig>::from_url(node_url).await
        };

        let client =
            connecting.map_err(|e| ChainError::Connection(format!("{}: {}", node_url, e)))?;

        Ok(Self { client })
    }

    /// Attach a signing keypair, producing a submitter for payout batches
    pub fn with_signer(&self, keypair: Keypair) -> PayoutSigner {
        PayoutSigner {
            api: self.clone(),
            keypair,
        }
    }

    async fn fetch(
        &self,
        pallet: &str,
        entry: &str,
        keys: Vec<Value>,
    ) -> Result<Option<Value<u32>>, ChainError> {
        let query = dynamic::storage(pallet, entry, keys);
        let fetched = self
            .client
            .storage()
            .at_latest()
            .await?
            .fetch(&query)
            .await?;

        match fetched {
            Some(thunk) => Ok(Some(thunk.to_value().map_err(subxt::Error::from)?)),
            None => Ok(None),
        }
    }
}

fn parse_account(address: &str) -> Result<AccountId32, ChainError> {
    AccountId32::from_str(address).map_err(|e| ChainError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

fn decode_era<T: Debug>(value: &Value<T>) -> Result<Era, ChainError> {
    value
        .as_u128()
        .and_then(|n| Era::try_from(n).ok())
        .ok_or_else(|| ChainError::Decode(format!("expected era index, got {:?}", value.value)))
}

// Claimed rewards arrive as a BoundedVec, i.e. a sequence possibly wrapped
// in a single-field composite.
fn collect_eras<T: Debug>(value: &Value<T>, eras: &mut ClaimedEraSet) -> Result<(), ChainError> {
    match &value.value {
        ValueDef::Composite(composite) => {
            for inner in composite.values() {
                collect_eras(inner, eras)?;
            }
            Ok(())
        }
        ValueDef::Primitive(_) => {
            eras.insert(decode_era(value)?);
            Ok(())
        }
        other => Err(ChainError::Decode(format!(
            "unexpected claimed rewards entry: {:?}",
            other
        ))),
    }
}

fn collect_bytes<T: Debug>(value: &Value<T>, bytes: &mut Vec<u8>) -> Result<(), ChainError> {
    match &value.value {
        ValueDef::Composite(composite) => {
            for inner in composite.values() {
                collect_bytes(inner, bytes)?;
            }
            Ok(())
        }
        _ => {
            let byte = value
                .as_u128()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| {
                    ChainError::Decode(format!("expected account byte, got {:?}", value.value))
                })?;
            bytes.push(byte);
            Ok(())
        }
    }
}

fn decode_account<T: Debug>(value: &Value<T>) -> Result<AccountId32, ChainError> {
    let mut bytes = Vec::with_capacity(32);
    collect_bytes(value, &mut bytes)?;
    let raw: [u8; 32] = bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| ChainError::Decode(format!("account of {} bytes", bytes.len())))?;
    Ok(AccountId32(raw))
}

/// Claimed eras recorded in a staking ledger
#[derive(Debug, Clone, PartialEq, Eq)]
enum LedgerClaims {
    /// `claimed_rewards`: the full claimed set
    Current(ClaimedEraSet),
    /// `legacy_claimed_rewards`: frozen at the paged-rewards migration,
    /// later claims live in `Staking.ClaimedRewards`
    Legacy(ClaimedEraSet),
    Missing,
}

fn ledger_claims<T: Debug>(ledger: &Value<T>) -> Result<LedgerClaims, ChainError> {
    if let Some(claimed) = ledger.at("claimed_rewards") {
        let mut eras = ClaimedEraSet::new();
        collect_eras(claimed, &mut eras)?;
        return Ok(LedgerClaims::Current(eras));
    }
    if let Some(claimed) = ledger.at("legacy_claimed_rewards") {
        let mut eras = ClaimedEraSet::new();
        collect_eras(claimed, &mut eras)?;
        return Ok(LedgerClaims::Legacy(eras));
    }
    Ok(LedgerClaims::Missing)
}

// Number of pages recorded in a `ClaimedRewards` entry
fn claimed_page_count<T: Debug>(pages: &Value<T>) -> Result<usize, ChainError> {
    let mut claimed = ClaimedEraSet::new();
    collect_eras(pages, &mut claimed)?;
    Ok(claimed.len())
}

/// An era is paid out once every exposure page is claimed. Without an
/// overview entry any claimed page counts as fully claimed.
fn era_fully_claimed(claimed_pages: usize, page_count: Option<u32>) -> bool {
    claimed_pages > 0 && page_count.map_or(true, |pages| claimed_pages >= pages as usize)
}

impl PeoChainApi {
    async fn era_claimed_paged(&self, stash: &AccountId32, era: Era) -> Result<bool, ChainError> {
        let keys = || vec![Value::u128(era as u128), Value::from_bytes(stash.0)];

        let claimed_pages = match self.fetch("Staking", "ClaimedRewards", keys()).await? {
            Some(pages) => claimed_page_count(&pages)?,
            None => 0,
        };
        if claimed_pages == 0 {
            return Ok(false);
        }

        let page_count = self
            .fetch("Staking", "ErasStakersOverview", keys())
            .await?
            .and_then(|overview| overview.at("page_count").and_then(|n| n.as_u128()))
            .and_then(|n| u32::try_from(n).ok());

        Ok(era_fully_claimed(claimed_pages, page_count))
    }
}

#[async_trait]
impl ChainQuery for PeoChainApi {
    async fn account_balance(&self, address: &str) -> Result<Balance, ChainError> {
        let account = parse_account(address)?;
        let info = self
            .fetch("System", "Account", vec![Value::from_bytes(account.0)])
            .await?;

        // Unknown accounts have no storage entry
        let Some(info) = info else {
            return Ok(0);
        };

        info.at("data")
            .at("free")
            .and_then(|free| free.as_u128())
            .ok_or_else(|| ChainError::Decode(format!("no free balance for {}", address)))
    }

    async fn active_era(&self) -> Result<Option<Era>, ChainError> {
        let Some(info) = self.fetch("Staking", "ActiveEra", vec![]).await? else {
            return Ok(None);
        };

        let index = info
            .at("index")
            .ok_or_else(|| ChainError::Decode("active era without index".to_string()))?;
        Ok(Some(decode_era(index)?))
    }

    async fn claimed_eras(
        &self,
        address: &str,
        window: ClaimWindow,
    ) -> Result<ClaimedEraQuery, ChainError> {
        let stash = parse_account(address)?;

        // Ledger is keyed by the controller, which may differ from the stash
        let Some(bonded) = self
            .fetch("Staking", "Bonded", vec![Value::from_bytes(stash.0)])
            .await?
        else {
            debug!(validator = address, "stash is not bonded");
            return Ok(ClaimedEraQuery::Absent);
        };
        let controller = decode_account(&bonded)?;

        let Some(ledger) = self
            .fetch("Staking", "Ledger", vec![Value::from_bytes(controller.0)])
            .await?
        else {
            debug!(validator = address, controller = %controller, "no staking ledger entry");
            return Ok(ClaimedEraQuery::Absent);
        };

        match ledger_claims(&ledger)? {
            LedgerClaims::Current(eras) => Ok(ClaimedEraQuery::Reported(eras)),
            LedgerClaims::Legacy(mut eras) => {
                let unknown: Vec<Era> = window.eras().filter(|era| !eras.contains(era)).collect();
                for era in unknown {
                    if self.era_claimed_paged(&stash, era).await? {
                        eras.insert(era);
                    }
                }
                Ok(ClaimedEraQuery::Reported(eras))
            }
            LedgerClaims::Missing => {
                debug!(validator = address, ledger = ?ledger, "ledger has no claimed rewards field");
                Ok(ClaimedEraQuery::Absent)
            }
        }
    }
}

// A dispatch error means the batch was included and reverted
fn submission_error(err: subxt::Error) -> ChainError {
    match err {
        subxt::Error::Runtime(dispatch) => ChainError::Submission(dispatch.to_string()),
        other => ChainError::Subxt(other),
    }
}

/// Submits payout batches signed by one sr25519 account
pub struct PayoutSigner {
    api: PeoChainApi,
    keypair: Keypair,
}

impl PayoutSigner {
    fn payout_call(call: &PayoutCall) -> Result<Value, ChainError> {
        let stash = parse_account(&call.validator_stash)?;
        let payout = dynamic::tx(
            "Staking",
            "payout_stakers",
            vec![Value::from_bytes(stash.0), Value::u128(call.era as u128)],
        );
        Ok(payout.into_value())
    }
}

#[async_trait]
impl ExtrinsicSubmitter for PayoutSigner {
    fn signer_address(&self) -> String {
        self.keypair.public_key().to_account_id().to_string()
    }

    async fn submit_batch(&self, batch: &BatchRequest) -> Result<TxHash, ChainError> {
        let calls = batch
            .calls
            .iter()
            .map(Self::payout_call)
            .collect::<Result<Vec<_>, _>>()?;

        // batch_all reverts every call if one of them fails
        let tx = dynamic::tx("Utility", "batch_all", vec![Value::unnamed_composite(calls)]);

        let events = self
            .api
            .client
            .tx()
            .sign_and_submit_then_watch_default(&tx, &self.keypair)
            .await?
            .wait_for_finalized_success()
            .await
            .map_err(submission_error)?;

        Ok(events.extrinsic_hash())
    }
}
