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

//! kinematics for tracked balloon payloads and ground stations.
//!
//! Position rows as they come from the packet query endpoints ([PacketRow]) are validated into
//! [PositionReport]s, which are fed per station into a bounded [PacketHistory]. The [KinematicsEngine]
//! derives ground speed, vertical rate and bearing between the last known good report and the incoming
//! one, rejecting re-received transmissions (same hash) and physically implausible fixes.

use std::{fs, path::Path};

pub mod errors;
use errors::{Result, HabKinematicsError, parse_error};

pub mod packet;
pub use packet::{PacketRow, PositionReport};

pub mod engine;
pub use engine::{KinematicsConfig, KinematicsEngine, KinematicSample, RejectReason};

pub mod history;
pub use history::{PacketHistory, StationHistory, IngestOutcome};

pub mod track;
pub use track::{StationTrack, derive_station_tracks, derived_rows};

/// parse a JSON array of packet rows
pub fn parse_packet_rows (input: &str)->Result<Vec<PacketRow>> {
    serde_json::from_str( input).map_err( |e| parse_error!("invalid packet rows: {}", e))
}

pub fn load_packet_rows (path: impl AsRef<Path>)->Result<Vec<PacketRow>> {
    let input = fs::read_to_string( path)?;
    parse_packet_rows( &input)
}
