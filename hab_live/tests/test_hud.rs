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

use hab_common::datetime::{EpochMillis, format_packet_time, secs};
use hab_live::{Feature, FlightHud, HudConfig, HudState, Freshness, classify_freshness};

fn marker (flight: &str, callsign: &str, time: EpochMillis, vr: f64)->Feature {
    let input = format!(r#"{{ "type": "Feature", "geometry": {{ "type": "Point", "coordinates": [-104.5,40.2] }},
        "properties": {{ "id": "{callsign}", "objecttype": "balloonmarker", "flightid": "{flight}", "callsign": "{callsign}",
                         "symbol": "/O", "time": "{}", "altitude": 62000, "vertical_rate": {vr} }} }}"#, format_packet_time(time));
    let gf: geojson::Feature = serde_json::from_str( &input).unwrap();
    Feature::from_geojson( &gf).unwrap()
}

fn tracking_hud (cutoff_minutes: u32)->FlightHud {
    let mut hud = FlightHud::new( HudConfig { cutoff_minutes, vertical_rate_threshold: 10_000 });
    hud.set_flight_id( Some("EOSS-300".to_string()));
    hud
}

// run with "cargo test test_sticky_alert -- --nocapture"

#[test]
fn test_sticky_alert() {
    let t0 = EpochMillis::from_secs(1_717_243_200);
    let mut hud = tracking_hud(180);
    assert_eq!( hud.state(), HudState::Idle);

    assert!( hud.observe( &marker( "EOSS-300", "KC0D-11", t0, 900.0), t0));
    assert_eq!( hud.state(), HudState::Tracking);
    assert!( !hud.is_alerting());

    assert!( hud.observe( &marker( "EOSS-300", "KC0D-11", t0.plus(secs(60)), -12_000.0), t0.plus(secs(60))));
    println!("{hud}");
    assert!( hud.is_alerting());

    // non breaching updates don't clear it
    assert!( hud.observe( &marker( "EOSS-300", "KC0D-11", t0.plus(secs(120)), -1_500.0), t0.plus(secs(120))));
    assert!( hud.is_alerting());

    // threshold change clears and re-evaluates against the last rate (-1500)
    hud.set_vertical_rate_threshold( 1_000);
    assert!( hud.is_alerting());
    hud.set_vertical_rate_threshold( 5_000);
    assert!( !hud.is_alerting());
}

#[test]
fn test_out_of_order_updates() {
    let t0 = EpochMillis::from_secs(1_717_243_200);
    let mut hud = tracking_hud(180);

    assert!( hud.observe( &marker( "EOSS-300", "KC0D-11", t0.plus(secs(30)), 500.0), t0.plus(secs(30))));
    assert!( !hud.observe( &marker( "EOSS-300", "KC0D-11", t0, -20_000.0), t0.plus(secs(31))));
    assert!( !hud.observe( &marker( "EOSS-300", "KC0D-11", t0.plus(secs(30)), -20_000.0), t0.plus(secs(31))));
    assert!( !hud.is_alerting());
    assert_eq!( hud.last_packet_time(), Some( t0.plus(secs(30))));
    assert_eq!( hud.display().unwrap().vertical_rate, Some(500.0));

    // other flights are ignored
    assert!( !hud.observe( &marker( "EOSS-301", "W0ZC-9", t0.plus(secs(60)), 500.0), t0.plus(secs(60))));
}

#[test]
fn test_stale_after_cutoff() {
    let t0 = EpochMillis::from_secs(1_717_243_200);
    let mut hud = tracking_hud(1);
    hud.observe( &marker( "EOSS-300", "KC0D-11", t0, -11_000.0), t0);
    assert!( hud.is_alerting());

    for _ in 0..60 { hud.tick(); }
    assert_eq!( hud.elapsed_secs(), 60);
    assert_eq!( hud.state(), HudState::Tracking);

    assert_eq!( hud.tick(), HudState::Stale);
    println!("{hud}");
    assert!( hud.display().is_none());
    assert!( hud.is_alerting());

    // a newer packet brings it back
    assert!( hud.observe( &marker( "EOSS-300", "KC0D-11", t0.plus(secs(90)), 100.0), t0.plus(secs(95))));
    assert_eq!( hud.state(), HudState::Tracking);
    assert_eq!( hud.elapsed_secs(), 5);
}

#[test]
fn test_flight_switch_resets() {
    let t0 = EpochMillis::from_secs(1_717_243_200);
    let mut hud = tracking_hud(180);
    hud.observe( &marker( "EOSS-300", "KC0D-11", t0, -15_000.0), t0);
    hud.observe( &marker( "EOSS-300", "AE0SS-12", t0, -15_000.0), t0);
    hud.tick();
    let generation = hud.generation();

    hud.set_flight_id( Some("EOSS-301".to_string()));
    assert_eq!( hud.generation(), generation + 1);
    assert_eq!( hud.state(), HudState::Idle);
    assert!( !hud.is_alerting());
    assert!( hud.display().is_none());
    assert!( hud.last_packet_time().is_none());
    assert_eq!( hud.elapsed_secs(), 0);
    assert!( hud.badge(t0).is_none());

    // ticks don't advance an idle HUD
    hud.tick();
    assert_eq!( hud.elapsed_secs(), 0);
}

#[test]
fn test_beacon_freshness() {
    assert_eq!( classify_freshness(0), Freshness::Normal);
    assert_eq!( classify_freshness(60), Freshness::Normal);
    assert_eq!( classify_freshness(61), Freshness::Warn);
    assert_eq!( classify_freshness(120), Freshness::Warn);
    assert_eq!( classify_freshness(121), Freshness::Critical);

    let now = EpochMillis::from_secs(1_717_243_200);
    let mut hud = tracking_hud(180);
    hud.note_beacon( "KC0D-11", now.minus( secs(10)));
    hud.note_beacon( "AE0SS-12", now.minus( secs(90)));
    hud.note_beacon( "AE0SS-12", now.minus( secs(200))); // older, ignored
    hud.note_beacon( "KD0FNR-9", now.minus( secs(30)));

    let badge = hud.badge(now).unwrap();
    println!("badge: {badge}");
    assert_eq!( badge.worst, Freshness::Warn);
    assert_eq!( badge.n_normal, 2);
    assert_eq!( badge.n_total, 3);

    let badge = hud.badge( now.plus( secs(60))).unwrap();
    assert_eq!( badge.worst, Freshness::Critical);
    assert_eq!( badge.n_normal, 0);
}
