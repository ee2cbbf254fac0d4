//! Synchronous API operation tests
//!
//! Operations block on a shared runtime, so these are plain `#[test]`s.

mod common;

use apithing::ApiOperation;
use common::{index, write_shard, Fixture};
use federex::api::{
    FederexContext, GetSettings, GetSettingsParams, Search, SearchParams, UpdateSettings, UpdateSettingsParams,
};
use federex::{CoordinatorConfig, FederexError};
use std::sync::Arc;

fn fixture() -> Fixture {
    let fixture = Fixture::new(&["toy"], CoordinatorConfig::new().shard_count(2));
    write_shard(fixture.path(), "toy", 0, &[("d1", 0.9), ("d2", 0.5)]);
    write_shard(fixture.path(), "toy", 1, &[("d3", 0.8), ("d4", 0.1)]);
    fixture
}

#[test]
fn test_search_operation() {
    let fixture = fixture();
    let mut context = FederexContext::new(Arc::clone(&fixture.registry));

    let params = SearchParams::builder()
        .index("toy")
        .query("ocean tides")
        .qid("42")
        .hits(3)
        .build()
        .unwrap();
    let response = Search::execute(&mut context, &params).unwrap();

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["query"], serde_json::json!({ "qid": "42", "text": "ocean tides" }));
    let ids: Vec<&str> = response.candidates.iter().map(|c| c.docid.as_str()).collect();
    assert_eq!(ids, vec!["d1", "d3", "d2"]);
}

#[test]
fn test_default_hits_is_ten() {
    let fixture = fixture();
    let mut context = FederexContext::new(Arc::clone(&fixture.registry));

    let params = SearchParams::new(index("toy"), "q");
    let response = Search::execute(&mut context, &params).unwrap();
    assert_eq!(params.hits, 10);
    assert_eq!(response.candidates.len(), 4);
}

#[test]
fn test_settings_operations() {
    let fixture = fixture();
    let mut context = FederexContext::new(Arc::clone(&fixture.registry));

    let settings = GetSettings::execute(&mut context, &GetSettingsParams::new(index("toy"))).unwrap();
    assert_eq!(settings.threads_per_shard, 4);

    let err = UpdateSettings::execute(&mut context, &UpdateSettingsParams::new(index("toy"), 0)).unwrap_err();
    assert!(matches!(err, FederexError::InvalidArgument { .. }));

    let status = UpdateSettings::execute(&mut context, &UpdateSettingsParams::new(index("toy"), 8)).unwrap();
    assert_eq!(status.status, "success");

    let settings = GetSettings::execute(&mut context, &GetSettingsParams::new(index("toy"))).unwrap();
    assert_eq!(settings.threads_per_shard, 8);
    assert_eq!(context.tracker().requests("get_settings"), 2);
    assert_eq!(context.tracker().failures("update_settings"), 0);
}

#[test]
fn test_unknown_index_on_every_operation() {
    let fixture = fixture();
    let mut context = FederexContext::new(Arc::clone(&fixture.registry));
    let missing = index("missing");

    let search = Search::execute(&mut context, &SearchParams::new(missing.clone(), "q"));
    let get = GetSettings::execute(&mut context, &GetSettingsParams::new(missing.clone()));
    let update = UpdateSettings::execute(&mut context, &UpdateSettingsParams::new(missing, 2));

    assert!(matches!(search, Err(FederexError::NotFound { .. })));
    assert!(matches!(get, Err(FederexError::NotFound { .. })));
    assert!(matches!(update, Err(FederexError::NotFound { .. })));
}
