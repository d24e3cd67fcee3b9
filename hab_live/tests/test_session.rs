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

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;

use hab_common::datetime::{EpochMillis, minutes, format_packet_time};
use hab_live::{
    CompletionOutcome, FeatureRenderer, FeatureSource, FetchPayload, FetchRequest, FlightConfig, FlightHud, HudState,
    LayerDelta, LayerKind, MapSession, MapSessionConfig, SessionCommand, SessionEvent
};
use hab_live::errors::{HabLiveError, Result};
use hab_live::layer::PayloadFormat;
use hab_live::live_connector::parse_payload;

fn point (id: &str, objecttype: &str, flight: &str, age_minutes: u64, vr: i64)->String {
    let time = format_packet_time( EpochMillis::now().minus( minutes(age_minutes)));
    format!(r#"{{ "type": "Feature", "geometry": {{ "type": "Point", "coordinates": [-104.9,40.1] }},
        "properties": {{ "id": "{id}", "objecttype": "{objecttype}", "flightid": "{flight}", "callsign": "{id}",
                         "symbol": "/O", "time": "{time}", "vertical_rate": {vr} }} }}"#)
}

fn collection (fs: &[String])->FetchPayload {
    let input = format!(r#"{{ "type": "FeatureCollection", "features": [ {} ] }}"#, fs.join(","));
    FetchPayload::Features( serde_json::from_str( &input).unwrap())
}

struct MockSource {}

#[async_trait]
impl FeatureSource for MockSource {
    async fn fetch (&self, request: &FetchRequest)->Result<FetchPayload> {
        match &request.layer {
            LayerKind::Stations => Ok( collection( &[
                point( "N0CALL", "station", "", 5, 0),
                point( "KC0D-11", "balloonmarker", "EOSS-300", 1, -800),
            ])),
            LayerKind::Predictions(_) => Err( HabLiveError::OpFailedError("503 Service Unavailable".to_string())),
            LayerKind::BeaconPath{..} => parse_payload( PayloadFormat::PacketRows, serde_json::json!([])),
            _ => parse_payload( PayloadFormat::GeoJson, serde_json::json!([])),
        }
    }
}

#[derive(Default)]
struct RecordingRenderer {
    deltas: Vec<(LayerKind,LayerDelta)>,
    hud_renders: usize,
}

impl FeatureRenderer for RecordingRenderer {
    fn render_delta (&mut self, layer: &LayerKind, delta: &LayerDelta) {
        println!("render {layer}: {delta}");
        self.deltas.push( (layer.clone(), delta.clone()));
    }
    fn render_hud (&mut self, hud: &FlightHud) {
        println!("render {hud}");
        self.hud_renders += 1;
    }
}

impl RecordingRenderer {
    fn entered (&self, layer: &LayerKind)->Vec<String> {
        self.deltas.iter().filter( |(k,_)| k == layer).flat_map( |(_,d)| d.enter.keys().cloned()).collect()
    }
    fn exited (&self, layer: &LayerKind)->Vec<String> {
        self.deltas.iter().filter( |(k,_)| k == layer).flat_map( |(_,d)| d.exit.keys().cloned()).collect()
    }
}

fn config ()->MapSessionConfig {
    MapSessionConfig {
        flight_id: Some("EOSS-300".to_string()),
        flights: vec![ FlightConfig { id: "EOSS-300".to_string(), beacons: vec!["KC0D-11".to_string()] } ],
        ..MapSessionConfig::default()
    }
}

#[test]
fn test_session_layers() {
    let session = MapSession::new( config(), Arc::new( MockSource{}));
    let kinds: Vec<String> = session.layer_kinds().map( |k| k.to_string()).collect();
    println!("layers: {kinds:?}");
    assert_eq!( kinds.len(), 5);
    assert!( session.layer( &LayerKind::Trackers("EOSS-300".to_string())).is_some());
    assert!( session.layer( &LayerKind::BeaconPath{ flight_id: "EOSS-300".to_string(), callsign: "KC0D-11".to_string() }).is_some());
    assert_eq!( session.hud().flight_id(), Some("EOSS-300"));
    assert_eq!( session.colors().get("EOSS-300"), Some("#1f77b4"));
}

#[test]
fn test_apply_fetch() {
    let mut session = MapSession::new( config(), Arc::new( MockSource{}));
    let mut renderer = RecordingRenderer::default();
    let kind = LayerKind::Predictions("EOSS-300".to_string());

    let old = session.force_request( &kind).unwrap();
    let req = session.force_request( &kind).unwrap();
    let payload = || collection( &[
        point( "EOSS-300_pred", "prediction", "EOSS-300", 2, 0),
        point( "EOSS-300_ancient", "prediction", "EOSS-300", 200, 0),
        point( "KC0D-11", "balloonmarker", "EOSS-300", 1, -12_000),
    ]);

    // superseded response is not rendered
    assert_eq!( session.apply_fetch( &kind, old.seq, Ok(payload()), &mut renderer), CompletionOutcome::Superseded);
    assert!( renderer.deltas.is_empty());

    let outcome = session.apply_fetch( &kind, req.seq, Ok(payload()), &mut renderer);
    assert!( matches!( outcome, CompletionOutcome::Applied(_)));

    // the 200min old prediction entered and got pruned in the same cycle, so it is never reported
    let mut entered = renderer.entered( &kind);
    entered.sort();
    assert_eq!( entered, vec!["EOSS-300_pred".to_string(), "KC0D-11".to_string()]);
    assert!( session.layer( &kind).unwrap().store().get("EOSS-300_ancient").is_none());

    let pred = &session.layer( &kind).unwrap().store().get("EOSS-300_pred").unwrap().feature;
    assert_eq!( pred.style.color.as_deref(), Some("#1f77b4"));
    assert_eq!( pred.style.icon_size, Some(24));

    assert_eq!( session.hud().state(), HudState::Tracking);
    assert!( session.hud().is_alerting());
    assert_eq!( renderer.hud_renders, 1);
}

#[test]
fn test_flight_switch_and_lookback() {
    let mut session = MapSession::new( config(), Arc::new( MockSource{}));
    let mut renderer = RecordingRenderer::default();
    let kind = LayerKind::Predictions("EOSS-300".to_string());

    let req = session.force_request( &kind).unwrap();
    session.apply_fetch( &kind, req.seq, Ok( collection( &[ point( "EOSS-300_pred", "prediction", "EOSS-300", 30, 0) ])), &mut renderer);
    assert_eq!( renderer.entered( &kind).len(), 1);

    // lookback of 10min ages out the 30min old prediction
    session.set_lookback( 10, &mut renderer);
    assert_eq!( session.lookback_minutes(), 10);
    assert_eq!( renderer.exited( &kind), vec!["EOSS-300_pred".to_string()]);

    session.set_lookback( 0, &mut renderer);
    assert_eq!( session.lookback_minutes(), 1);

    let generation = session.hud().generation();
    session.set_flight( Some("EOSS-301".to_string()), &mut renderer);
    assert_eq!( session.hud().generation(), generation + 1);
    assert_eq!( session.hud().flight_id(), Some("EOSS-301"));
    assert!( session.layer( &kind).is_none());
    assert!( session.layer( &LayerKind::Predictions("EOSS-301".to_string())).is_some());
    assert_eq!( session.colors().get("EOSS-301"), Some("#ff7f0e"));

    // a late response for the removed layer is dropped
    let outcome = session.apply_fetch( &kind, req.seq + 1, Ok( collection( &[])), &mut renderer);
    assert_eq!( outcome, CompletionOutcome::Superseded);

    session.set_icon_size( 150, &mut renderer);
    assert_eq!( session.icon_size(), 99);
}

#[test]
fn test_hud_tick_of_previous_flight_ignored() {
    let mut session = MapSession::new( config(), Arc::new( MockSource{}));
    let mut renderer = RecordingRenderer::default();
    let old_generation = session.hud().generation();

    session.set_flight( Some("EOSS-301".to_string()), &mut renderer);
    let generation = session.hud().generation();
    assert_eq!( generation, old_generation + 1);

    let kind = LayerKind::Trackers("EOSS-301".to_string());
    let req = session.force_request( &kind).unwrap();
    session.apply_fetch( &kind, req.seq, Ok( collection( &[ point( "W0ZC-9", "balloonmarker", "EOSS-301", 1, -500) ])), &mut renderer);
    assert_eq!( session.hud().state(), HudState::Tracking);
    let elapsed = session.hud().elapsed_secs();
    let n_renders = renderer.hud_renders;

    // a tick from the timer of the previous flight that was still queued
    assert!( session.handle_event( SessionEvent::HudTick( old_generation), &mut renderer));
    println!("after stale tick: {}", session.hud());
    assert_eq!( session.hud().elapsed_secs(), elapsed);
    assert_eq!( renderer.hud_renders, n_renders);

    assert!( session.handle_event( SessionEvent::HudTick( generation), &mut renderer));
    assert_eq!( session.hud().elapsed_secs(), elapsed + 1);
    assert_eq!( renderer.hud_renders, n_renders + 1);
}

#[tokio::test]
async fn test_run_session() {
    let mut session = MapSession::new( config(), Arc::new( MockSource{}));
    let handle = session.handle();
    let mut renderer = RecordingRenderer::default();

    let (res, sent) = tokio::join!(
        session.run( &mut renderer),
        async move {
            tokio::time::sleep( Duration::from_millis(300)).await;
            handle.send( SessionCommand::Shutdown)
        }
    );
    assert!( res.is_ok());
    assert!( sent.is_ok());

    let mut entered = renderer.entered( &LayerKind::Stations);
    entered.sort();
    assert_eq!( entered, vec!["KC0D-11".to_string(), "N0CALL".to_string()]);
    assert_eq!( session.hud().state(), HudState::Tracking);

    for (kind,status) in session.status() {
        println!("{kind}: {status}");
        match kind {
            LayerKind::Predictions(_) => {
                assert_eq!( status.consecutive_failures, 1);
                assert!( status.last_success.is_none());
            }
            _ => assert!( status.last_success.is_some())
        }
    }
}
