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
use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hab_common::datetime::EpochMillis;
use hab_live::{
    load_config, FeatureRenderer, FlightHud, HttpFeatureSource, LayerDelta, LayerKind, MapSession, MapSessionConfig,
    SessionCommand
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "monitor a balloon flight from the tracker endpoints and log map changes")]
pub struct Args {
    /// name of config file in $HAB_LOCAL/config (without .ron extension)
    #[arg(short,long)]
    pub config: Option<String>,

    /// base URL of the tracker endpoints (overrides config)
    #[arg(long)]
    pub url: Option<String>,

    /// flight to monitor (overrides config)
    #[arg(long)]
    pub flight: Option<String>,

    /// beacon callsigns of the flight for which to derive paths from raw packets
    #[arg(long, num_args=1..)]
    pub beacons: Vec<String>,

    /// lookback period in minutes (overrides config)
    #[arg(long)]
    pub lookback: Option<u32>,
}

/// a renderer that just logs what would change on the map
struct LogRenderer {}

impl FeatureRenderer for LogRenderer {
    fn render_delta (&mut self, layer: &LayerKind, delta: &LayerDelta) {
        for e in delta.enter.values() {
            info!("{layer} + {} [{}]", e.feature, e.feature.tooltip().unwrap_or_default());
        }
        for e in delta.update.values() {
            info!("{layer} ~ {}", e.feature);
        }
        for e in delta.exit.values() {
            info!("{layer} - {}", e.feature);
        }
    }

    fn render_hud (&mut self, hud: &FlightHud) {
        let now = EpochMillis::now();
        match hud.badge(now) {
            Some(badge) => info!("{hud} beacons: {badge}"),
            None => info!("{hud}")
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main()->Result<()> {
    let _ = tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).try_init();

    let args = Args::parse();

    let mut config: MapSessionConfig = match &args.config {
        Some(name) => load_config( name)?,
        None => MapSessionConfig::default()
    };
    if let Some(url) = &args.url { config.base_url = url.clone(); }
    if let Some(lookback) = args.lookback { config.lookback_period = lookback; }
    if let Some(flight) = &args.flight { config.flight_id = Some(flight.clone()); }

    let source = Arc::new( HttpFeatureSource::new( &config)?);
    let mut session = MapSession::new( config, source);

    for callsign in &args.beacons {
        session.add_beacon_path( callsign);
    }

    let handle = session.handle();
    tokio::spawn( async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = handle.send( SessionCommand::Shutdown);
        }
    });

    let mut renderer = LogRenderer{};
    session.run( &mut renderer).await?;

    for (kind,status) in session.status() {
        println!("{kind}: {status}");
    }
    Ok(())
}
