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

use hab_common::datetime::EpochMillis;
use hab_common::geo::GeoPoint;
use hab_kinematics::{KinematicsEngine, PositionReport, RejectReason, PacketHistory, IngestOutcome};

fn report (secs: i64, alt: f64, hash: &str)->PositionReport {
    PositionReport::new( "KC0D-11", EpochMillis::from_secs(1_717_243_200 + secs), GeoPoint::from_lon_lat_degrees( -96.0, 40.0), alt, hash)
}

fn report_at (secs: i64, lon: f64, lat: f64, hash: &str)->PositionReport {
    PositionReport::new( "KC0D-11", EpochMillis::from_secs(1_717_243_200 + secs), GeoPoint::from_lon_lat_degrees( lon, lat), 5000.0, hash)
}

// run with "cargo test test_vertical_rate -- --nocapture"

#[test]
fn test_vertical_rate() {
    let engine = KinematicsEngine::default();
    let history = vec![ report(0, 1000.0, "0"), report(60, 1500.0, "A") ];

    let sample = engine.compute_sample( &history, &report(120, 2000.0, "B")).unwrap();
    println!("sample: {sample}");
    assert_eq!( sample.vertical_rate_ft_per_min, 500);
    assert!( sample.speed_mph == 0.0);

    // rounding of non-integral rates: 100ft in 45s = 133.33 ft/min
    let sample = engine.compute_sample( &history, &report(105, 1600.0, "C")).unwrap();
    assert_eq!( sample.vertical_rate_ft_per_min, 133);

    // descent: -250ft in 90s = -166.67 ft/min
    let sample = engine.compute_sample( &history, &report(150, 1250.0, "D")).unwrap();
    assert_eq!( sample.vertical_rate_ft_per_min, -167);
}

#[test]
fn test_reference_is_last_report() {
    let engine = KinematicsEngine::default();
    let history = vec![ report(0, 1000.0, "0"), report(60, 1500.0, "A") ];

    assert_eq!( engine.compute_sample( &history[..0], &report(60, 1500.0, "A")), Err(RejectReason::NoReference));
    assert_eq!( engine.compute_sample( &history, &report(60, 1500.0, "A")), Err(RejectReason::DuplicateHash));
    // re-reception of an older transmission is still a duplicate
    assert_eq!( engine.compute_sample( &history, &report(90, 1000.0, "0")), Err(RejectReason::DuplicateHash));
}

#[test]
fn test_clock_anomaly() {
    let engine = KinematicsEngine::default();
    let history = vec![ report(60, 1500.0, "A") ];

    let res = engine.compute_sample( &history, &report(60, 1600.0, "B"));
    println!("same time: {res:?}");
    assert_eq!( res, Err(RejectReason::ClockAnomaly{ elapsed_millis: 0 }));

    let res = engine.compute_sample( &history, &report(30, 1600.0, "C"));
    assert_eq!( res, Err(RejectReason::ClockAnomaly{ elapsed_millis: -30_000 }));
}

#[test]
fn test_speed_and_bearing() {
    let engine = KinematicsEngine::default();
    // 0.1deg latitude north (~6.9mi) in 5min = ~82.9mph
    let history = vec![ report_at( 0, -96.0, 40.0, "A") ];
    let sample = engine.compute_sample( &history, &report_at( 300, -96.0, 40.1, "B")).unwrap();
    println!("sample: {sample}");
    assert!( (sample.speed_mph - 82.9).abs() < 0.1);
    assert_eq!( sample.bearing_deg.whole_degrees(), 0);

    // 1deg (~69mi) in 5min = ~829mph
    let res = engine.compute_sample( &history, &report_at( 300, -96.0, 41.0, "C"));
    println!("fast: {res:?}");
    assert!( matches!( res, Err(RejectReason::ImplausibleSpeed{speed_mph}) if speed_mph > 800.0));
}

#[test]
fn test_speed_threshold_is_inclusive() {
    let engine = KinematicsEngine::default();
    let p0 = report_at( 0, -96.0, 40.0, "A");
    let p1 = report_at( 3600, -96.0, 41.0, "B"); // ~69.09mi in 1h
    let miles = p0.position.haversine_distance( &p1.position).get::<uom::si::length::mile>();

    // pick a time so that the speed is exactly at the threshold
    let t = (miles / 310.0 * 3_600_000.0).floor() as i64;
    let p2 = PositionReport::new( "KC0D-11", EpochMillis::new( p0.time.millis() + t), p1.position, 5000.0, "C");
    let res = engine.compute_sample( std::slice::from_ref(&p0), &p2);
    println!("at threshold: {res:?}");
    assert!( matches!( res, Err(RejectReason::ImplausibleSpeed{..})));
}

#[test]
fn test_worked_example_history() {
    let engine = KinematicsEngine::default();
    let mut history = PacketHistory::new(8);

    assert_eq!( history.ingest( &engine, report(0, 1000.0, "0")), IngestOutcome::Baseline);
    assert!( history.ingest( &engine, report(60, 1500.0, "A")).sample().is_some());

    let outcome = history.ingest( &engine, report(120, 2000.0, "B"));
    assert_eq!( outcome.sample().map(|s| s.vertical_rate_ft_per_min), Some(500));

    let absurd = report(121, 50000.0, "C");
    let outcome = history.ingest( &engine, absurd.clone());
    println!("absurd climb: {outcome:?}");
    assert!( matches!( outcome, IngestOutcome::Rejected(RejectReason::ImplausibleVerticalRate{..})));

    let last_good = history.last_good("KC0D-11").unwrap();
    assert_eq!( last_good.hash, "B");
    assert_eq!( last_good.altitude_ft, 2000.0);

    // rejection is idempotent
    let again = history.ingest( &engine, absurd);
    assert_eq!( again, outcome);
    assert_eq!( history.last_good("KC0D-11").unwrap().hash, "B");
    assert_eq!( history.station("KC0D-11").unwrap().n_rejected(), 2);
    assert_eq!( history.last_sample("KC0D-11").unwrap().vertical_rate_ft_per_min, 500);
}

#[test]
fn test_duplicate_is_noop() {
    let engine = KinematicsEngine::default();
    let mut history = PacketHistory::new(8);
    history.ingest( &engine, report(0, 1000.0, "0"));
    history.ingest( &engine, report(60, 1500.0, "A"));

    let before = history.station("KC0D-11").unwrap().reports().to_vec();
    assert_eq!( history.ingest( &engine, report(60, 1500.0, "A")), IngestOutcome::Duplicate);
    assert_eq!( history.ingest( &engine, report(60, 1500.0, "A")), IngestOutcome::Duplicate);
    assert_eq!( history.station("KC0D-11").unwrap().reports().to_vec(), before);
    assert_eq!( history.station("KC0D-11").unwrap().n_duplicates(), 2);
}

#[test]
fn test_bounded_history() {
    let engine = KinematicsEngine::default();
    let mut history = PacketHistory::new(3);
    for i in 0..10 {
        history.ingest( &engine, report( i*60, 1000.0 + (i as f64)*100.0, &format!("h{i}")));
    }
    let st = history.station("KC0D-11").unwrap();
    println!("{st}");
    assert_eq!( st.reports().len(), 3);
    assert_eq!( st.last_good().unwrap().hash, "h9");
}
