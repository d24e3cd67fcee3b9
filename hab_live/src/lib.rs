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

//! live map state for balloon flights: polled feature layers with enter/update/exit reconciliation,
//! staleness pruning, per flight colors and the flight HUD

use std::time::Duration;
use serde::{Serialize,Deserialize};

use hab_common::clamp_config_value;
use hab_common::datetime::{deserialize_duration, serialize_duration, secs};

pub mod errors;
pub mod feature;
pub mod store;
pub mod pruner;
pub mod hud;
pub mod colors;
pub mod timer;
pub mod layer;
pub mod session;
pub mod live_connector;

pub use feature::{Feature, FeatureId, FeatureKind, FeatureProperties, FeatureStyle, features_from_collection};
pub use store::{FeatureStore, LayerDelta, RenderHandle, StoreEntry};
pub use pruner::StalenessPruner;
pub use hud::{FlightHud, HudConfig, HudState, Freshness, classify_freshness};
pub use colors::FlightColors;
pub use layer::{LayerKind, PollingLayer, FetchRequest, FetchPayload, LayerStatus, CompletionOutcome, RequestCounter};
pub use session::{MapSession, SessionCommand, SessionEvent, SessionHandle, FeatureSource, FeatureRenderer};
pub use live_connector::HttpFeatureSource;

pub const MIN_LOOKBACK: u32 = 1;
pub const MAX_LOOKBACK: u32 = 60 * 24 * 30;
pub const MIN_ICON_SIZE: u32 = 5;
pub const MAX_ICON_SIZE: u32 = 99;

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct FlightConfig {
    pub id: String,
    #[serde(default)]
    pub beacons: Vec<String>,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(default)]
pub struct MapSessionConfig {
    pub base_url: String,

    #[serde(serialize_with="serialize_duration", deserialize_with="deserialize_duration")]
    pub update_interval: Duration,

    #[serde(serialize_with="serialize_duration", deserialize_with="deserialize_duration")]
    pub request_timeout: Duration,

    /// minutes
    pub lookback_period: u32,
    /// pixels
    pub icon_size: u32,
    /// ft/min
    pub vertical_rate_threshold: i64,
    pub hud_cutoff_minutes: u32,
    pub max_speed_mph: f64,

    /// the monitored flight at startup
    pub flight_id: Option<String>,
    pub flights: Vec<FlightConfig>,
    pub palette: Vec<String>,
}

impl Default for MapSessionConfig {
    fn default()->Self {
        MapSessionConfig {
            base_url: "http://localhost/api".to_string(),
            update_interval: secs(5),
            request_timeout: secs(10),
            lookback_period: pruner::DEFAULT_LOOKBACK_MINUTES,
            icon_size: 24,
            vertical_rate_threshold: hud::DEFAULT_VERTICAL_RATE_THRESHOLD,
            hud_cutoff_minutes: hud::DEFAULT_HUD_CUTOFF_MINUTES,
            max_speed_mph: hab_kinematics::engine::DEFAULT_MAX_SPEED_MPH,
            flight_id: None,
            flights: Vec::new(),
            palette: colors::default_palette(),
        }
    }
}

impl MapSessionConfig {
    /// bring user adjustable values into their valid ranges
    pub fn clamped (mut self)->Self {
        self.lookback_period = clamp_config_value( "lookback_period", self.lookback_period, MIN_LOOKBACK, MAX_LOOKBACK);
        self.icon_size = clamp_config_value( "icon_size", self.icon_size, MIN_ICON_SIZE, MAX_ICON_SIZE);
        self
    }

    pub fn beacons_of (&self, flight_id: &str)->Vec<String> {
        self.flights.iter().find( |f| f.id == flight_id).map( |f| f.beacons.clone()).unwrap_or_default()
    }
}

/// load a session config from `$HAB_LOCAL/config/<name>.ron`
pub fn load_config (name: &str)->errors::Result<MapSessionConfig> {
    Ok( hab_common::config::config_from_local_file( name)?)
}
