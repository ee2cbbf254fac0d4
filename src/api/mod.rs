//! API module for Federex using the ApiThing pattern
//!
//! A single [`FederexContext`] plus one parameter object per operation.

pub mod context;
pub mod operations;
pub mod parameters;

pub use apithing::ApiOperation;
pub use context::{FederexContext, RequestTracker};
pub use operations::{
    GetSettings, QueryEcho, Search, SearchResponse, SettingsResponse, UpdateSettings, UpdateStatus,
};
pub use parameters::{GetSettingsParams, SearchParams, SearchParamsBuilder, UpdateSettingsParams};
