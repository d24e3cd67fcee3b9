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

//! the heads-up display state of the monitored flight.
//!
//! The HUD shows the latest balloon marker of the flight, a "seconds since last heard" counter that is
//! advanced by its own one-second timer (independent of fetches), the freshness of each beacon of the
//! flight and a latched descent alert. Switching the flight resets everything, and bumps the
//! `generation` so that ticks from the previous flight's timer can be recognized and ignored

use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize,Deserialize};
use tracing::{info, warn};

use hab_common::datetime::EpochMillis;
use crate::feature::{Feature, FeatureId, FeatureKind};

pub const DEFAULT_HUD_CUTOFF_MINUTES: u32 = 180;
pub const DEFAULT_VERTICAL_RATE_THRESHOLD: i64 = 10_000;

pub const FRESH_SECS: i64 = 60;
pub const WARN_SECS: i64 = 120;

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct HudConfig {
    pub cutoff_minutes: u32,
    /// ft/min, positive. Descent faster than this sets the alert
    pub vertical_rate_threshold: i64,
}

impl Default for HudConfig {
    fn default()->Self {
        HudConfig { cutoff_minutes: DEFAULT_HUD_CUTOFF_MINUTES, vertical_rate_threshold: DEFAULT_VERTICAL_RATE_THRESHOLD }
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum HudState { Idle, Tracking, Stale }

#[derive(Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub enum Freshness { Normal, Warn, Critical }

pub fn classify_freshness (secs_since: i64)->Freshness {
    if secs_since <= FRESH_SECS { Freshness::Normal }
    else if secs_since <= WARN_SECS { Freshness::Warn }
    else { Freshness::Critical }
}

/// what the HUD shows, copied from the last accepted feature of the flight
#[derive(Debug,Clone,PartialEq)]
pub struct HudDisplay {
    pub feature_id: FeatureId,
    pub callsign: Option<String>,
    pub time: EpochMillis,
    pub position: Option<(f64,f64)>,
    pub altitude: Option<f64>,
    pub speed_mph: Option<f64>,
    pub vertical_rate: Option<f64>,
}

/// the flight level beacon summary
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub struct HudBadge {
    pub worst: Freshness,
    pub n_normal: usize,
    pub n_total: usize,
}

impl fmt::Display for HudBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {}/{}", self.worst, self.n_normal, self.n_total)
    }
}

#[derive(Debug)]
pub struct FlightHud {
    config: HudConfig,
    flight_id: Option<String>,
    state: HudState,
    display: Option<HudDisplay>,
    last_packet_time: Option<EpochMillis>,
    elapsed_secs: u64,
    last_vertical_rate: Option<f64>,
    beacons: BTreeMap<String,EpochMillis>,
    alerting: bool,
    generation: u64,
}

impl FlightHud {
    pub fn new (config: HudConfig)->Self {
        FlightHud {
            config,
            flight_id: None,
            state: HudState::Idle,
            display: None,
            last_packet_time: None,
            elapsed_secs: 0,
            last_vertical_rate: None,
            beacons: BTreeMap::new(),
            alerting: false,
            generation: 0,
        }
    }

    pub fn config (&self)->&HudConfig { &self.config }
    pub fn flight_id (&self)->Option<&str> { self.flight_id.as_deref() }
    pub fn state (&self)->HudState { self.state }
    pub fn display (&self)->Option<&HudDisplay> { self.display.as_ref() }
    pub fn last_packet_time (&self)->Option<EpochMillis> { self.last_packet_time }
    pub fn elapsed_secs (&self)->u64 { self.elapsed_secs }
    pub fn is_alerting (&self)->bool { self.alerting }
    pub fn generation (&self)->u64 { self.generation }

    /// switch to another flight (or none). All state of the previous flight is dropped
    pub fn set_flight_id (&mut self, flight_id: Option<String>) {
        self.flight_id = flight_id;
        self.state = HudState::Idle;
        self.display = None;
        self.last_packet_time = None;
        self.elapsed_secs = 0;
        self.last_vertical_rate = None;
        self.beacons.clear();
        self.alerting = false;
        self.generation += 1;
    }

    /// changing the threshold acknowledges a pending alert, which is then re-evaluated against the last
    /// vertical rate we have seen
    pub fn set_vertical_rate_threshold (&mut self, threshold: i64) {
        self.config.vertical_rate_threshold = threshold.abs();
        self.alerting = false;
        if let Some(vr) = self.last_vertical_rate {
            self.check_descent( vr);
        }
    }

    /// feed a feature of any layer. Station and marker features of our flight refresh the beacon table,
    /// balloon markers drive the display. Returns true if the display was updated
    pub fn observe (&mut self, feature: &Feature, now: EpochMillis)->bool {
        let Some(flight_id) = &self.flight_id else { return false };
        if feature.flight_id() != Some( flight_id.as_str()) { return false }

        match feature.kind() {
            FeatureKind::Marker => {
                if let (Some(cs), Some(t)) = (feature.callsign(), feature.time) {
                    self.note_beacon( cs, t);
                }
                self.update( feature, now)
            }
            FeatureKind::Station => {
                if let (Some(cs), Some(t)) = (feature.callsign(), feature.time) {
                    self.note_beacon( cs, t);
                }
                false
            }
            _ => false
        }
    }

    /// take over display data from the flight's current marker, but only if it is strictly newer than what
    /// we show (deltas can arrive out of order)
    pub fn update (&mut self, feature: &Feature, now: EpochMillis)->bool {
        let Some(time) = feature.time else { return false };
        if let Some(last) = self.last_packet_time {
            if time <= last { return false }
        }

        let props = feature.station_props();
        self.display = Some( HudDisplay {
            feature_id: feature.id.clone(),
            callsign: feature.callsign().map( |s| s.to_string()),
            time,
            position: feature.point(),
            altitude: props.and_then( |p| p.altitude),
            speed_mph: props.and_then( |p| p.speed_mph),
            vertical_rate: props.and_then( |p| p.vertical_rate),
        });

        if self.state != HudState::Tracking {
            info!("HUD tracking flight {:?}", self.flight_id);
        }
        self.state = HudState::Tracking;
        self.last_packet_time = Some(time);
        self.elapsed_secs = now.secs_since(time).max(0) as u64;

        if let Some(vr) = feature.vertical_rate() {
            self.last_vertical_rate = Some(vr);
            self.check_descent( vr);
        }
        true
    }

    pub fn note_beacon (&mut self, callsign: &str, time: EpochMillis) {
        let t = self.beacons.entry( callsign.to_string()).or_insert( time);
        if time > *t { *t = time }
    }

    /// advance the "last heard" counter by one second. Going past the cutoff blanks the display but keeps
    /// the alert flag
    pub fn tick (&mut self)->HudState {
        if self.state == HudState::Tracking {
            self.elapsed_secs += 1;
            if self.elapsed_secs > (self.config.cutoff_minutes as u64) * 60 {
                info!("HUD flight {:?} went stale after {}s", self.flight_id, self.elapsed_secs);
                self.state = HudState::Stale;
                self.display = None;
            }
        }
        self.state
    }

    pub fn beacon_freshness (&self, now: EpochMillis)->Vec<(String,Freshness)> {
        self.beacons.iter().map( |(cs,t)| (cs.clone(), classify_freshness( now.secs_since(*t)))).collect()
    }

    pub fn badge (&self, now: EpochMillis)->Option<HudBadge> {
        let levels = self.beacon_freshness(now);
        let worst = levels.iter().map( |(_,f)| *f).max()?;
        let n_normal = levels.iter().filter( |(_,f)| *f == Freshness::Normal).count();
        Some( HudBadge { worst, n_normal, n_total: levels.len() })
    }

    fn check_descent (&mut self, vertical_rate: f64) {
        if vertical_rate < -(self.config.vertical_rate_threshold as f64) && !self.alerting {
            warn!("flight {:?} descending at {:.0} ft/min", self.flight_id, vertical_rate);
            self.alerting = true;
        }
    }
}

impl Default for FlightHud {
    fn default()->Self { FlightHud::new( HudConfig::default()) }
}

impl fmt::Display for FlightHud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HUD({:?} {:?}", self.flight_id, self.state)?;
        if let Some(d) = &self.display {
            write!(f, " {} {}", d.feature_id, d.time)?;
            if let Some(alt) = d.altitude { write!(f, " {alt:.0}ft")?; }
            if let Some(vr) = d.vertical_rate { write!(f, " {vr:.0}ft/min")?; }
        }
        write!(f, " +{}s", self.elapsed_secs)?;
        if self.alerting { write!(f, " ALERT")?; }
        write!(f, ")")
    }
}
