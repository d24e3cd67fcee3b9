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

use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use hab_kinematics::{load_packet_rows, derive_station_tracks, KinematicsConfig, KinematicsEngine, history::DEFAULT_MAX_HISTORY};

#[derive(Parser, Debug)]
#[command(version, about, long_about = "derive speed, vertical rate and bearing for a JSON array of packet rows")]
pub struct Args {
    /// ground speed in mph at or above which fixes are rejected
    #[arg(long, default_value_t = 310.0)]
    pub max_speed: f64,

    /// emit GeoJSON features instead of derived rows
    #[arg(long)]
    pub geojson: bool,

    /// show rejected rows
    #[arg(short,long)]
    pub verbose: bool,

    /// path of the JSON input file
    pub rows: PathBuf,
}

fn main()->Result<()> {
    let _ = tracing_subscriber::fmt().with_env_filter( EnvFilter::from_default_env()).try_init();

    let args = Args::parse();
    let engine = KinematicsEngine::new( KinematicsConfig { max_speed_mph: args.max_speed });

    let rows = load_packet_rows( &args.rows)?;
    let tracks = derive_station_tracks( &rows, &engine, DEFAULT_MAX_HISTORY);

    if args.geojson {
        let features: Vec<geojson::Feature> = tracks.iter()
            .flat_map( |t| [t.path_feature(None), t.position_feature(None)])
            .flatten()
            .collect();
        let fc = geojson::FeatureCollection { bbox: None, features, foreign_members: None };
        println!("{}", serde_json::to_string_pretty(&fc)?);
        return Ok(())
    }

    for track in &tracks {
        println!("------- {}: {} packets, {} rejected, {} duplicates", track.callsign, track.packets.len(), track.rejected.len(), track.duplicates);
        for row in &track.packets {
            println!("{row}");
        }
        if args.verbose {
            for (row,reason) in &track.rejected {
                println!("  rejected {row}: {reason}");
            }
        }
    }

    Ok(())
}
