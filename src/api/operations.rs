//! Federex operations implemented with the ApiThing pattern
//!
//! Operations are synchronous entry points over the async coordinator. Each
//! resolves the target index through the context's registry, creating its
//! coordinator on first use, then runs on a shared runtime.
//!
//! - [`Search`]: federated search, echoing the query id and text
//! - [`GetSettings`]: read an index's settings
//! - [`UpdateSettings`]: change an index's threads-per-shard setting
//!
//! These entry points block the calling thread and must not be called from
//! inside a tokio runtime; async callers use the registry directly.

use crate::api::context::FederexContext;
use crate::api::parameters::{GetSettingsParams, SearchParams, UpdateSettingsParams};
use crate::error::FederexError;
use crate::settings::SearchSettings;
use crate::structures::ScoredCandidate;
use apithing::ApiOperation;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::debug;

/// Shared runtime for executing async operations synchronously
static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

fn shared_runtime() -> Result<&'static tokio::runtime::Runtime, FederexError> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("federex-api")
        .enable_all()
        .build()?;
    // A concurrent caller may have won the race; its runtime is kept
    Ok(RUNTIME.get_or_init(|| runtime))
}

/// Execute an async operation synchronously on the shared runtime
fn execute_sync<F, T>(future: F) -> Result<T, FederexError>
where
    F: std::future::Future<Output = Result<T, FederexError>>,
{
    shared_runtime()?.block_on(future)
}

fn tracked<T>(
    context: &mut FederexContext,
    operation: &'static str,
    run: impl FnOnce(&FederexContext) -> Result<T, FederexError>,
) -> Result<T, FederexError> {
    let start = Instant::now();
    let result = run(context);
    context.record(operation, start.elapsed(), result.is_ok());
    result
}

/// Query echoed back with search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEcho {
    pub qid: String,
    pub text: String,
}

/// Search result body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: QueryEcho,
    pub candidates: Vec<ScoredCandidate>,
}

/// Settings read result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub threads_per_shard: usize,
}

impl From<SearchSettings> for SettingsResponse {
    fn from(settings: SearchSettings) -> Self {
        Self {
            threads_per_shard: settings.threads_per_shard,
        }
    }
}

/// Settings update acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatus {
    pub status: String,
}

impl UpdateStatus {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Federated search operation
///
/// If the parameters carry `threads_per_shard`, the value is stored on the
/// index before the search runs.
///
/// # Errors
///
/// - `InvalidArgument` for invalid parameters
/// - `NotFound` for an index the catalog does not know
/// - `ProvisioningFailure` when the index's coordinator cannot be built
pub struct Search;

impl ApiOperation<FederexContext, SearchParams> for Search {
    type Output = SearchResponse;
    type Error = FederexError;

    fn execute(context: &mut FederexContext, parameters: &SearchParams) -> Result<Self::Output, Self::Error> {
        parameters.validate()?;

        tracked(context, "search", |context| {
            let registry = context.registry();
            let candidates = execute_sync(async {
                let coordinator = registry.get_or_create(&parameters.index).await?;
                if let Some(threads) = parameters.threads_per_shard {
                    coordinator.set_threads_per_shard(threads)?;
                }
                coordinator
                    .search(&parameters.query, parameters.hits, &parameters.options())
                    .await
            })?;

            debug!(index = %parameters.index, qid = %parameters.qid, returned = candidates.len(), "Search completed");
            Ok(SearchResponse {
                query: QueryEcho {
                    qid: parameters.qid.clone(),
                    text: parameters.query.clone(),
                },
                candidates,
            })
        })
    }
}

/// Read the settings of an index
pub struct GetSettings;

impl ApiOperation<FederexContext, GetSettingsParams> for GetSettings {
    type Output = SettingsResponse;
    type Error = FederexError;

    fn execute(context: &mut FederexContext, parameters: &GetSettingsParams) -> Result<Self::Output, Self::Error> {
        tracked(context, "get_settings", |context| {
            let registry = context.registry();
            let settings = execute_sync(async {
                let coordinator = registry.get_or_create(&parameters.index).await?;
                Ok(coordinator.settings())
            })?;
            Ok(settings.into())
        })
    }
}

/// Update the threads-per-shard setting of an index
///
/// The index's coordinator is created even when no value is given. An invalid
/// value fails with `InvalidArgument` and leaves the stored
/// setting unchanged.
pub struct UpdateSettings;

impl ApiOperation<FederexContext, UpdateSettingsParams> for UpdateSettings {
    type Output = UpdateStatus;
    type Error = FederexError;

    fn execute(context: &mut FederexContext, parameters: &UpdateSettingsParams) -> Result<Self::Output, Self::Error> {
        parameters.validate()?;

        tracked(context, "update_settings", |context| {
            let registry = context.registry();
            execute_sync(async {
                let coordinator = registry.get_or_create(&parameters.index).await?;
                match parameters.threads_per_shard {
                    Some(threads) => coordinator.set_threads_per_shard(threads),
                    None => Ok(()),
                }
            })?;
            Ok(UpdateStatus::success())
        })
    }
}
