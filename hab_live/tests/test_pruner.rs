/*
 * Copyright © 2025, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use hab_common::datetime::{EpochMillis, minutes, format_packet_time};
use hab_live::{FeatureStore, StalenessPruner, features_from_collection, Feature};

fn station (id: &str, time: &str)->String {
    format!(r#"{{ "type": "Feature", "geometry": {{ "type": "Point", "coordinates": [-105.0,40.0] }},
        "properties": {{ "id": "{id}", "objecttype": "station", "time": "{time}" }} }}"#)
}

fn features (fs: &[String])->Vec<Feature> {
    let input = format!(r#"{{ "type": "FeatureCollection", "features": [ {} ] }}"#, fs.join(","));
    let fc: geojson::FeatureCollection = serde_json::from_str( &input).unwrap();
    features_from_collection( &fc)
}

#[test]
fn test_lookback_sweep() {
    let now = EpochMillis::now();
    let pruner = StalenessPruner::default();
    assert_eq!( pruner.lookback_minutes(), 180);

    let mut store = FeatureStore::new();
    store.reconcile( features( &[
        station( "old", &format_packet_time( now.minus( minutes(200)))),
        station( "recent", &format_packet_time( now.minus( minutes(10)))),
        r#"{ "type": "Feature", "geometry": { "type": "Point", "coordinates": [-105.0,40.0] }, "properties": { "id": "timeless", "objecttype": "station" } }"#.to_string(),
    ]), true);
    assert_eq!( store.len(), 3);

    let removed = pruner.sweep_at( &mut store, now);
    println!("removed: {:?}", removed.iter().map(|e| e.feature.id.as_str()).collect::<Vec<_>>());
    assert_eq!( removed.len(), 1);
    assert_eq!( removed[0].feature.id, "old");
    assert!( store.contains("recent"));
    assert!( store.contains("timeless"));
}

#[test]
fn test_cutoff_boundary() {
    let mut store = FeatureStore::new();
    store.reconcile( features( &[
        station( "before", "2024-06-01 11:59:59"),
        station( "at", "2024-06-01 12:00:00"),
        station( "after", "2024-06-01 12:00:01"),
    ]), true);

    let cutoff = hab_common::datetime::parse_packet_time("2024-06-01 12:00:00").unwrap();
    let removed = StalenessPruner::sweep( &mut store, cutoff);
    assert_eq!( removed.len(), 1);
    assert_eq!( removed[0].feature.id, "before");
    assert_eq!( store.len(), 2);
}

#[test]
fn test_empty_store() {
    let mut store = FeatureStore::new();
    let mut pruner = StalenessPruner::new(0);
    assert_eq!( pruner.lookback_minutes(), 1);
    assert!( pruner.sweep_at( &mut store, EpochMillis::now()).is_empty());

    pruner.set_lookback_minutes(30);
    let now = EpochMillis::new( 3_600_000);
    assert_eq!( pruner.cutoff(now), EpochMillis::new( 1_800_000));
}
