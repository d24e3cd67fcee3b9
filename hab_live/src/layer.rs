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

//! polled map layers.
//!
//! Each [PollingLayer] owns its timer, its [FeatureStore] and a [RequestCounter]. The counter enforces
//! that at most one scheduled request per layer is in flight and that only the response to the most
//! recently issued request is applied (stale responses are dropped). There is no retry - a failed fetch
//! leaves the store as it is and is superseded by the next tick.

use std::fmt;
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use hab_common::datetime::EpochMillis;
use hab_kinematics::{KinematicsEngine, PacketRow, derive_station_tracks, history::DEFAULT_MAX_HISTORY};
use crate::errors::Result;
use crate::feature::{Feature, features_from_collection};
use crate::store::{FeatureStore, LayerDelta, StoreEntry};
use crate::timer::repeat_timer;

#[derive(Debug,Clone,PartialEq,Eq,Hash,PartialOrd,Ord)]
pub enum LayerKind {
    /// all stations heard within the lookback period
    Stations,
    Trackers(String),
    Predictions(String),
    LandingPredictions(String),
    /// raw packets of one beacon of a flight, run through the kinematics engine
    BeaconPath { flight_id: String, callsign: String },
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum PayloadFormat { GeoJson, PacketRows }

impl LayerKind {
    pub fn endpoint (&self)->&'static str {
        match self {
            LayerKind::Stations => "getallstations",
            LayerKind::Trackers(_) => "gettrackerstations",
            LayerKind::Predictions(_) => "getpredictionpaths",
            LayerKind::LandingPredictions(_) => "getlandingpredictions",
            LayerKind::BeaconPath{..} => "getpackets",
        }
    }

    pub fn query (&self)->Vec<(String,String)> {
        match self {
            LayerKind::Stations => Vec::new(),
            LayerKind::Trackers(fid) | LayerKind::Predictions(fid) | LayerKind::LandingPredictions(fid) => {
                vec![ ("flightid".to_string(), fid.clone()) ]
            }
            LayerKind::BeaconPath{flight_id,callsign} => {
                vec![ ("flightid".to_string(), flight_id.clone()), ("callsign".to_string(), callsign.clone()) ]
            }
        }
    }

    /// all our endpoints return snapshots, i.e. absence means removal
    pub fn remove_missing (&self)->bool { true }

    pub fn format (&self)->PayloadFormat {
        if let LayerKind::BeaconPath{..} = self { PayloadFormat::PacketRows } else { PayloadFormat::GeoJson }
    }

    pub fn flight_id (&self)->Option<&str> {
        match self {
            LayerKind::Stations => None,
            LayerKind::Trackers(fid) | LayerKind::Predictions(fid) | LayerKind::LandingPredictions(fid) => Some(fid.as_str()),
            LayerKind::BeaconPath{flight_id,..} => Some(flight_id.as_str()),
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKind::Stations => write!(f, "stations"),
            LayerKind::Trackers(fid) => write!(f, "trackers/{fid}"),
            LayerKind::Predictions(fid) => write!(f, "predictions/{fid}"),
            LayerKind::LandingPredictions(fid) => write!(f, "landing/{fid}"),
            LayerKind::BeaconPath{flight_id,callsign} => write!(f, "path/{flight_id}/{callsign}"),
        }
    }
}

#[derive(Debug,Clone,PartialEq)]
pub struct FetchRequest {
    pub layer: LayerKind,
    pub seq: u64,
    pub lookback_minutes: u32,
}

impl FetchRequest {
    pub fn endpoint (&self)->&'static str { self.layer.endpoint() }
    pub fn format (&self)->PayloadFormat { self.layer.format() }

    /// the layer specific query plus the lookback period
    pub fn query (&self)->Vec<(String,String)> {
        let mut q = self.layer.query();
        q.push( ("lookbackperiod".to_string(), self.lookback_minutes.to_string()));
        q
    }
}

#[derive(Debug,Clone)]
pub enum FetchPayload {
    Features(geojson::FeatureCollection),
    Packets(Vec<PacketRow>),
}

/// per layer request sequencing
#[derive(Debug,Clone,Default)]
pub struct RequestCounter {
    issued: u64,
    in_flight: Option<u64>,
}

impl RequestCounter {
    /// a timer triggered request. Skipped if the previous one is still outstanding
    pub fn next_scheduled (&mut self)->Option<u64> {
        if self.in_flight.is_some() { None } else { Some( self.issue()) }
    }

    /// an explicitly requested fetch (e.g. changed lookback) that supersedes anything in flight
    pub fn force (&mut self)->u64 { self.issue() }

    pub fn latest (&self)->u64 { self.issued }
    pub fn in_flight (&self)->Option<u64> { self.in_flight }

    /// returns true if this response should be applied
    pub fn complete (&mut self, seq: u64)->bool {
        if seq == self.issued {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    fn issue (&mut self)->u64 {
        self.issued += 1;
        self.in_flight = Some(self.issued);
        self.issued
    }
}

/// what the operator status area shows per layer
#[derive(Debug,Clone,Default,PartialEq)]
pub struct LayerStatus {
    pub last_success: Option<EpochMillis>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    pub stale_responses: u64,
    pub n_features: usize,
}

impl fmt::Display for LayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} features", self.n_features)?;
        match self.last_success {
            Some(t) => write!(f, ", last success {t}")?,
            None => write!(f, ", no success yet")?
        }
        if self.consecutive_failures > 0 {
            write!(f, ", {} failures", self.consecutive_failures)?;
            if let Some(e) = &self.last_error { write!(f, " ({e})")?; }
        }
        Ok(())
    }
}

#[derive(Debug,Clone,PartialEq)]
pub enum CompletionOutcome {
    Applied(LayerDelta),
    Superseded,
    Failed(String),
}

#[derive(Debug)]
pub struct PollingLayer {
    kind: LayerKind,
    store: FeatureStore,
    counter: RequestCounter,
    status: LayerStatus,
    timer: Option<AbortHandle>,
}

impl PollingLayer {
    pub fn new (kind: LayerKind)->Self {
        PollingLayer { kind, store: FeatureStore::new(), counter: RequestCounter::default(), status: LayerStatus::default(), timer: None }
    }

    pub fn kind (&self)->&LayerKind { &self.kind }
    pub fn store (&self)->&FeatureStore { &self.store }
    pub fn status (&self)->&LayerStatus { &self.status }
    pub fn counter (&self)->&RequestCounter { &self.counter }

    pub fn on_tick (&mut self, lookback_minutes: u32)->Option<FetchRequest> {
        match self.counter.next_scheduled() {
            Some(seq) => Some( FetchRequest { layer: self.kind.clone(), seq, lookback_minutes }),
            None => {
                debug!("layer {} still waiting for request {:?}, skipping tick", self.kind, self.counter.in_flight());
                None
            }
        }
    }

    pub fn force_request (&mut self, lookback_minutes: u32)->FetchRequest {
        FetchRequest { layer: self.kind.clone(), seq: self.counter.force(), lookback_minutes }
    }

    /// apply the result of request `seq`. Superseded responses and failures leave the store untouched
    pub fn complete (&mut self, seq: u64, result: Result<FetchPayload>, engine: &KinematicsEngine,
                     decorate: &mut dyn FnMut(&mut Feature), now: EpochMillis)->CompletionOutcome
    {
        if !self.counter.complete( seq) {
            debug!("dropping stale response {} for layer {} (latest {})", seq, self.kind, self.counter.latest());
            self.status.stale_responses += 1;
            return CompletionOutcome::Superseded
        }

        match result {
            Ok(payload) => {
                let mut features = self.payload_features( payload, engine);
                for f in features.iter_mut() { decorate(f) }

                let delta = self.store.reconcile( features, self.kind.remove_missing());
                self.status.last_success = Some(now);
                self.status.last_error = None;
                self.status.consecutive_failures = 0;
                self.status.n_features = self.store.len();
                CompletionOutcome::Applied(delta)
            }
            Err(e) => {
                let msg = e.to_string();
                warn!("fetch for layer {} failed: {}", self.kind, msg);
                self.status.last_error = Some( msg.clone());
                self.status.consecutive_failures += 1;
                CompletionOutcome::Failed(msg)
            }
        }
    }

    pub fn sweep (&mut self, cutoff: EpochMillis)->Vec<StoreEntry> {
        let removed = crate::pruner::StalenessPruner::sweep( &mut self.store, cutoff);
        self.status.n_features = self.store.len();
        removed
    }

    pub fn restyle (&mut self, f: &mut dyn FnMut(&mut Feature))->LayerDelta {
        self.store.restyle( |feature| f(feature))
    }

    /// drop all features, e.g. when the layer is removed from the session
    pub fn clear (&mut self)->LayerDelta {
        let removed = self.store.clear();
        self.status.n_features = 0;
        LayerDelta::from_exit( removed)
    }

    /// start (or restart) the polling timer. `on_tick` returning false stops it
    pub fn start_timer<F> (&mut self, interval: Duration, on_tick: F) where F: FnMut()->bool + Send + 'static {
        self.stop_timer();
        self.timer = Some( repeat_timer( interval, false, on_tick));
    }

    pub fn stop_timer (&mut self) {
        if let Some(ah) = self.timer.take() {
            ah.abort();
        }
    }

    pub fn has_timer (&self)->bool { self.timer.is_some() }

    fn payload_features (&self, payload: FetchPayload, engine: &KinematicsEngine)->Vec<Feature> {
        match payload {
            FetchPayload::Features(fc) => features_from_collection( &fc),
            FetchPayload::Packets(rows) => {
                let flight_id = self.kind.flight_id();
                let tracks = derive_station_tracks( &rows, engine, DEFAULT_MAX_HISTORY);
                tracks.iter()
                    .flat_map( |t| [t.path_feature(flight_id), t.position_feature(flight_id)])
                    .flatten()
                    .filter_map( |gf| match Feature::from_geojson( &gf) {
                        Ok(f) => Some(f),
                        Err(e) => { warn!("derived feature rejected: {}", e); None }
                    })
                    .collect()
            }
        }
    }
}

impl Drop for PollingLayer {
    fn drop (&mut self) {
        self.stop_timer();
    }
}
