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

//! the live map session.
//!
//! A [MapSession] owns all [PollingLayer]s, the [FlightHud], the flight color assignment and the pruner.
//! Everything that happens - layer timer ticks, HUD ticks, fetch completions and operator commands - arrives
//! as a [SessionEvent] on one channel and is processed sequentially by [MapSession::run], so there is no
//! shared mutable state between tasks. Fetches run as spawned tasks that only send their result back.
//! Rendering is delegated to a [FeatureRenderer] that receives [LayerDelta]s

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use tokio::{sync::mpsc, task::{self, AbortHandle}};
use tracing::{debug, info, warn};

use hab_common::{clamp_config_value, datetime::EpochMillis};
use hab_kinematics::{KinematicsConfig, KinematicsEngine};
use crate::errors::{Result, op_failed};
use crate::colors::FlightColors;
use crate::feature::{Feature, FeatureKind};
use crate::hud::{FlightHud, HudConfig};
use crate::layer::{CompletionOutcome, FetchPayload, FetchRequest, LayerKind, LayerStatus, PollingLayer};
use crate::pruner::StalenessPruner;
use crate::store::LayerDelta;
use crate::timer::repeat_timer;
use crate::{MapSessionConfig, MIN_ICON_SIZE, MAX_ICON_SIZE, MIN_LOOKBACK, MAX_LOOKBACK};

pub const HUD_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// where layer data comes from
#[async_trait]
pub trait FeatureSource: Send + Sync + 'static {
    async fn fetch (&self, request: &FetchRequest)->Result<FetchPayload>;
}

/// where layer changes go to. Exits (including pruned features) are only reported through `render_delta`
pub trait FeatureRenderer {
    fn render_delta (&mut self, layer: &LayerKind, delta: &LayerDelta);

    fn render_hud (&mut self, _hud: &FlightHud) {}
}

#[derive(Debug,Clone,PartialEq)]
pub enum SessionCommand {
    SetFlight(Option<String>),
    AddBeaconPath(String),
    SetLookback(u32),
    SetVerticalRateThreshold(i64),
    SetIconSize(u32),
    Refresh,
    Shutdown,
}

#[derive(Debug)]
pub enum SessionEvent {
    Tick(LayerKind),
    HudTick(u64),
    Fetched { layer: LayerKind, seq: u64, result: Result<FetchPayload> },
    Command(SessionCommand),
}

/// the cloneable sender side of a session
#[derive(Debug,Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    pub fn send (&self, cmd: SessionCommand)->Result<()> {
        self.tx.send( SessionEvent::Command(cmd)).map_err( |_| op_failed!("session terminated"))
    }
}

pub struct MapSession {
    config: MapSessionConfig,
    source: Arc<dyn FeatureSource>,
    layers: BTreeMap<LayerKind,PollingLayer>,
    hud: FlightHud,
    hud_timer: Option<AbortHandle>,
    colors: FlightColors,
    pruner: StalenessPruner,
    engine: KinematicsEngine,
    icon_size: u32,
    running: bool,
    tx: mpsc::UnboundedSender<SessionEvent>,
    rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl MapSession {
    pub fn new (config: MapSessionConfig, source: Arc<dyn FeatureSource>)->Self {
        let config = config.clamped();
        let (tx,rx) = mpsc::unbounded_channel();

        let hud = FlightHud::new( HudConfig { cutoff_minutes: config.hud_cutoff_minutes, vertical_rate_threshold: config.vertical_rate_threshold });
        let colors = FlightColors::new( config.palette.clone());
        let pruner = StalenessPruner::new( config.lookback_period);
        let engine = KinematicsEngine::new( KinematicsConfig { max_speed_mph: config.max_speed_mph });
        let icon_size = config.icon_size;

        let mut layers = BTreeMap::new();
        layers.insert( LayerKind::Stations, PollingLayer::new( LayerKind::Stations));

        let mut session = MapSession { config, source, layers, hud, hud_timer: None, colors, pruner, engine, icon_size, running: false, tx, rx };
        if let Some(flight_id) = session.config.flight_id.clone() {
            session.add_flight_layers( &flight_id);
            session.hud.set_flight_id( Some(flight_id));
        }
        session
    }

    pub fn handle (&self)->SessionHandle { SessionHandle { tx: self.tx.clone() } }

    pub fn config (&self)->&MapSessionConfig { &self.config }
    pub fn hud (&self)->&FlightHud { &self.hud }
    pub fn colors (&self)->&FlightColors { &self.colors }
    pub fn icon_size (&self)->u32 { self.icon_size }
    pub fn lookback_minutes (&self)->u32 { self.pruner.lookback_minutes() }
    pub fn layer (&self, kind: &LayerKind)->Option<&PollingLayer> { self.layers.get(kind) }
    pub fn layer_kinds (&self)->impl Iterator<Item=&LayerKind> { self.layers.keys() }

    /// the operator status of all layers
    pub fn status (&self)->Vec<(LayerKind,LayerStatus)> {
        self.layers.iter().map( |(k,l)| (k.clone(), l.status().clone())).collect()
    }

    /// process events until we get a `Shutdown` command. Must be called from within a tokio runtime
    pub async fn run<R: FeatureRenderer> (&mut self, renderer: &mut R)->Result<()> {
        info!("starting map session with {} layers", self.layers.len());
        self.running = true;

        let kinds: Vec<LayerKind> = self.layers.keys().cloned().collect();
        for kind in kinds {
            self.start_layer( &kind);
        }
        self.start_hud_timer();

        loop {
            let event = match self.rx.recv().await {
                Some(event) => event,
                None => break // can't happen since we hold a sender ourselves
            };
            if !self.handle_event( event, renderer) {
                break
            }
        }

        self.stop();
        info!("map session terminated");
        Ok(())
    }

    /// returns false if the session should terminate
    pub fn handle_event<R: FeatureRenderer> (&mut self, event: SessionEvent, renderer: &mut R)->bool {
        match event {
            SessionEvent::Tick(kind) => self.on_layer_tick( &kind, renderer),
            SessionEvent::HudTick(generation) => {
                if generation == self.hud.generation() {
                    self.hud.tick();
                    renderer.render_hud( &self.hud);
                } else {
                    debug!("ignoring HUD tick of previous flight");
                }
            }
            SessionEvent::Fetched{layer, seq, result} => {
                self.apply_fetch( &layer, seq, result, renderer);
            }
            SessionEvent::Command(cmd) => return self.execute( cmd, renderer)
        }
        true
    }

    pub fn execute<R: FeatureRenderer> (&mut self, cmd: SessionCommand, renderer: &mut R)->bool {
        debug!("executing {:?}", cmd);
        match cmd {
            SessionCommand::SetFlight(flight_id) => self.set_flight( flight_id, renderer),
            SessionCommand::AddBeaconPath(callsign) => self.add_beacon_path( &callsign),
            SessionCommand::SetLookback(minutes) => self.set_lookback( minutes, renderer),
            SessionCommand::SetVerticalRateThreshold(threshold) => {
                self.hud.set_vertical_rate_threshold( threshold);
                renderer.render_hud( &self.hud);
            }
            SessionCommand::SetIconSize(px) => self.set_icon_size( px, renderer),
            SessionCommand::Refresh => self.refresh(),
            SessionCommand::Shutdown => return false,
        }
        true
    }

    /// switch the monitored flight. The layers of the previous flight are removed (reported as exits), the HUD
    /// is reset and gets a new tick timer
    pub fn set_flight<R: FeatureRenderer> (&mut self, flight_id: Option<String>, renderer: &mut R) {
        if flight_id.as_deref() == self.hud.flight_id() { return }
        info!("switching flight {:?} -> {:?}", self.hud.flight_id(), flight_id);

        let old: Vec<LayerKind> = self.layers.keys().filter( |k| k.flight_id().is_some()).cloned().collect();
        for kind in old {
            if let Some(mut layer) = self.layers.remove( &kind) {
                layer.stop_timer();
                let delta = layer.clear();
                if !delta.is_empty() { renderer.render_delta( &kind, &delta); }
            }
        }

        self.hud.set_flight_id( flight_id.clone());
        if self.running { self.start_hud_timer(); }
        renderer.render_hud( &self.hud);

        if let Some(fid) = flight_id {
            for kind in self.add_flight_layers( &fid) {
                if self.running { self.start_layer( &kind); }
            }
        }
        self.config.flight_id = self.hud.flight_id().map( |s| s.to_string());
    }

    /// add a packet derived path layer for a beacon of the current flight
    pub fn add_beacon_path (&mut self, callsign: &str) {
        let Some(flight_id) = self.hud.flight_id() else {
            warn!("no flight selected, ignoring beacon {}", callsign);
            return
        };
        let kind = LayerKind::BeaconPath { flight_id: flight_id.to_string(), callsign: callsign.to_string() };
        if !self.layers.contains_key( &kind) {
            self.layers.insert( kind.clone(), PollingLayer::new( kind.clone()));
            if self.running { self.start_layer( &kind); }
        }
    }

    /// changing the lookback prunes with the new cutoff and refetches everything
    pub fn set_lookback<R: FeatureRenderer> (&mut self, minutes: u32, renderer: &mut R) {
        let minutes = clamp_config_value( "lookback_period", minutes, MIN_LOOKBACK, MAX_LOOKBACK);
        self.pruner.set_lookback_minutes( minutes);
        self.config.lookback_period = minutes;
        self.sweep_all( EpochMillis::now(), renderer);
        self.refresh();
    }

    pub fn set_icon_size<R: FeatureRenderer> (&mut self, px: u32, renderer: &mut R) {
        self.icon_size = clamp_config_value( "icon_size", px, MIN_ICON_SIZE, MAX_ICON_SIZE);
        let colors = &mut self.colors;
        let icon_size = self.icon_size;
        for (kind,layer) in self.layers.iter_mut() {
            let delta = layer.restyle( &mut |f| decorate_feature( f, colors, icon_size));
            if !delta.is_empty() { renderer.render_delta( kind, &delta); }
        }
    }

    /// force a fetch of all layers, superseding outstanding requests
    pub fn refresh (&mut self) {
        if !self.running { return }
        let lookback = self.pruner.lookback_minutes();
        let requests: Vec<FetchRequest> = self.layers.values_mut().map( |l| l.force_request( lookback)).collect();
        for req in requests {
            self.dispatch( req);
        }
    }

    /// timer tick of a layer: age out what is too old and, unless the last request is still pending, poll
    pub fn on_layer_tick<R: FeatureRenderer> (&mut self, kind: &LayerKind, renderer: &mut R) {
        let cutoff = self.pruner.cutoff( EpochMillis::now());
        let lookback = self.pruner.lookback_minutes();
        let Some(layer) = self.layers.get_mut( kind) else { return };

        let removed = layer.sweep( cutoff);
        if !removed.is_empty() {
            renderer.render_delta( kind, &LayerDelta::from_exit( removed));
        }

        if let Some(req) = layer.on_tick( lookback) {
            self.dispatch( req);
        }
    }

    /// reconcile a fetch result into its layer, prune, feed the HUD and render
    pub fn apply_fetch<R: FeatureRenderer> (&mut self, kind: &LayerKind, seq: u64, result: Result<FetchPayload>, renderer: &mut R)->CompletionOutcome {
        let now = EpochMillis::now();
        let cutoff = self.pruner.cutoff( now);
        let icon_size = self.icon_size;
        let colors = &mut self.colors;
        let engine = &self.engine;

        let Some(layer) = self.layers.get_mut( kind) else {
            debug!("dropping response for removed layer {}", kind);
            return CompletionOutcome::Superseded
        };

        let mut outcome = layer.complete( seq, result, engine, &mut |f| decorate_feature( f, colors, icon_size), now);
        if let CompletionOutcome::Applied(delta) = &mut outcome {
            let removed = layer.sweep( cutoff);
            delta.absorb_removed( removed);

            let mut hud_changed = false;
            for entry in delta.enter.values().chain( delta.update.values()) {
                hud_changed |= self.hud.observe( &entry.feature, now);
            }

            debug!("layer {}: {}", kind, delta);
            if !delta.is_empty() { renderer.render_delta( kind, delta); }
            if hud_changed { renderer.render_hud( &self.hud); }
        }
        outcome
    }

    pub fn sweep_all<R: FeatureRenderer> (&mut self, now: EpochMillis, renderer: &mut R) {
        let cutoff = self.pruner.cutoff( now);
        for (kind,layer) in self.layers.iter_mut() {
            let removed = layer.sweep( cutoff);
            if !removed.is_empty() {
                renderer.render_delta( kind, &LayerDelta::from_exit( removed));
            }
        }
    }

    /// issue a scheduled request for a layer (used by the layer timer, or directly by tests)
    pub fn issue_tick (&mut self, kind: &LayerKind)->Option<FetchRequest> {
        let lookback = self.pruner.lookback_minutes();
        self.layers.get_mut( kind).and_then( |l| l.on_tick( lookback))
    }

    pub fn force_request (&mut self, kind: &LayerKind)->Option<FetchRequest> {
        let lookback = self.pruner.lookback_minutes();
        self.layers.get_mut( kind).map( |l| l.force_request( lookback))
    }

    fn add_flight_layers (&mut self, flight_id: &str)->Vec<LayerKind> {
        let mut kinds = vec![
            LayerKind::Trackers( flight_id.to_string()),
            LayerKind::Predictions( flight_id.to_string()),
            LayerKind::LandingPredictions( flight_id.to_string()),
        ];
        for callsign in self.config.beacons_of( flight_id) {
            kinds.push( LayerKind::BeaconPath { flight_id: flight_id.to_string(), callsign });
        }

        self.colors.color_for( flight_id); // make sure the monitored flight gets its color first
        for kind in &kinds {
            self.layers.entry( kind.clone()).or_insert_with( || PollingLayer::new( kind.clone()));
        }
        kinds
    }

    fn start_layer (&mut self, kind: &LayerKind) {
        let interval = self.config.update_interval;
        let lookback = self.pruner.lookback_minutes();
        let Some(layer) = self.layers.get_mut( kind) else { return };

        let tx = self.tx.clone();
        let k = kind.clone();
        layer.start_timer( interval, move || tx.send( SessionEvent::Tick( k.clone())).is_ok());

        let req = layer.force_request( lookback);
        self.dispatch( req);
    }

    fn start_hud_timer (&mut self) {
        if let Some(ah) = self.hud_timer.take() { ah.abort(); }

        let tx = self.tx.clone();
        let generation = self.hud.generation();
        self.hud_timer = Some( repeat_timer( HUD_TICK_INTERVAL, false, move || tx.send( SessionEvent::HudTick(generation)).is_ok()));
    }

    fn dispatch (&self, req: FetchRequest) {
        let source = self.source.clone();
        let tx = self.tx.clone();
        task::spawn( async move {
            let result = source.fetch( &req).await;
            let _ = tx.send( SessionEvent::Fetched { layer: req.layer, seq: req.seq, result });
        });
    }

    fn stop (&mut self) {
        for layer in self.layers.values_mut() {
            layer.stop_timer();
        }
        if let Some(ah) = self.hud_timer.take() { ah.abort(); }
        self.running = false;
    }
}

impl Drop for MapSession {
    fn drop (&mut self) {
        self.stop();
    }
}

/// per flight color for flight related line and prediction features, icon size for point features
pub fn decorate_feature (feature: &mut Feature, colors: &mut FlightColors, icon_size: u32) {
    let kind = feature.kind();
    if let Some(fid) = feature.flight_id() {
        if matches!( kind, FeatureKind::Path | FeatureKind::Prediction | FeatureKind::Landing | FeatureKind::Marker) {
            let color = colors.color_for( fid).to_string();
            feature.style.color = Some(color);
        }
    }
    if feature.point().is_some() {
        feature.style.icon_size = Some(icon_size);
    }
}
