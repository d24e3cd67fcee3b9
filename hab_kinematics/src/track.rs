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

//! turn packet query results into per-station tracks with derived speed, vertical rate and bearing

use std::collections::HashMap;
use geo::LineString;
use geojson::{Feature, Geometry, JsonObject, Value, feature::Id};
use serde_json::json;
use tracing::{debug, warn};

use hab_common::geo::GeoPoint;
use crate::engine::{KinematicsEngine, RejectReason};
use crate::history::{PacketHistory, IngestOutcome};
use crate::packet::{PacketRow, PositionReport};

#[derive(Debug,Clone)]
pub struct StationTrack {
    pub callsign: String,
    /// accepted rows, with derived fields attached
    pub packets: Vec<PacketRow>,
    /// one vertex per accepted row
    pub path: LineString<f64>,
    pub rejected: Vec<(PacketRow,RejectReason)>,
    pub duplicates: usize,
}

impl StationTrack {
    fn new (callsign: String)->Self {
        StationTrack { callsign, packets: Vec::new(), path: LineString::new(Vec::new()), rejected: Vec::new(), duplicates: 0 }
    }

    pub fn last_packet (&self)->Option<&PacketRow> { self.packets.last() }

    pub fn path_id (&self)->String { format!("{}_path", self.callsign) }

    /// the GeoJSON 'flightpath' line for this station. None if we have less than two vertices
    pub fn path_feature (&self, flight_id: Option<&str>)->Option<Feature> {
        if self.path.0.len() < 2 { return None }

        let coords: Vec<Vec<f64>> = self.path.coords().map( |c| vec![c.x, c.y]).collect();
        let mut props = JsonObject::new();
        props.insert( "id".into(), json!( self.path_id()));
        props.insert( "objecttype".into(), json!("flightpath"));
        props.insert( "callsign".into(), json!( self.callsign));
        if let Some(fid) = flight_id {
            props.insert( "flightid".into(), json!( fid));
        }
        if let Some(last) = self.last_packet() {
            props.insert( "time".into(), json!( last.time));
        }

        Some( Feature {
            bbox: None,
            geometry: Some( Geometry::new( Value::LineString(coords))),
            id: Some( Id::String( self.path_id())),
            properties: Some(props),
            foreign_members: None,
        })
    }

    /// the point feature at the last accepted position, carrying the derived fields. This is a 'station'
    /// unless the track belongs to a flight beacon, in which case it becomes the flight's 'balloonmarker'
    pub fn position_feature (&self, flight_id: Option<&str>)->Option<Feature> {
        let last = self.last_packet()?;

        let mut props = match serde_json::to_value(last) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => JsonObject::new()
        };
        props.insert( "id".into(), json!( self.callsign));
        match flight_id {
            Some(fid) => {
                props.insert( "objecttype".into(), json!("balloonmarker"));
                props.insert( "flightid".into(), json!( fid));
            }
            None => {
                props.insert( "objecttype".into(), json!("station"));
            }
        }

        Some( Feature {
            bbox: None,
            geometry: Some( Geometry::new( Value::Point( vec![last.longitude, last.latitude]))),
            id: Some( Id::String( self.callsign.clone())),
            properties: Some(props),
            foreign_members: None,
        })
    }

    fn push_row (&mut self, row: PacketRow) {
        self.path.0.push( geo::Coord { x: row.longitude, y: row.latitude });
        self.packets.push(row);
    }
}

/// group rows (ascending by time) per callsign and run them through a fresh [PacketHistory].
/// Rejected rows never make it into `packets` or `path`, which therefore only contain plausible fixes.
/// Rows without altitude are kept as positions but don't take part in the speed and vertical rate derivation.
/// Tracks are returned in order of first appearance
pub fn derive_station_tracks (rows: &[PacketRow], engine: &KinematicsEngine, max_history: usize)->Vec<StationTrack> {
    let mut history = PacketHistory::new( max_history);
    let mut tracks: Vec<StationTrack> = Vec::new();
    let mut index: HashMap<String,usize> = HashMap::new();

    for row in rows {
        let idx = *index.entry( row.callsign.clone()).or_insert_with( || {
            tracks.push( StationTrack::new( row.callsign.clone()));
            tracks.len() - 1
        });
        let track = &mut tracks[idx];

        let report = match PositionReport::from_row(row) {
            Ok(report) => report,
            Err(RejectReason::MissingAltitude) if GeoPoint::try_from_lon_lat_degrees( row.longitude, row.latitude).is_some() => {
                // still a valid fix for the map, just nothing to derive kinematics from
                if track.packets.iter().any( |p| p.hash == row.hash) {
                    track.duplicates += 1;
                } else {
                    debug!("no altitude in {}, keeping position only", row);
                    track.push_row( row.clone());
                }
                continue
            }
            Err(reason) => {
                warn!("skipping row {}: {}", row, reason);
                track.rejected.push( (row.clone(), reason));
                continue
            }
        };

        match history.ingest( engine, report) {
            IngestOutcome::Baseline => track.push_row( row.clone()),
            IngestOutcome::Accepted(sample) => {
                let mut row = row.clone();
                row.attach_sample( &sample);
                track.push_row( row);
            }
            IngestOutcome::Duplicate => track.duplicates += 1,
            IngestOutcome::Rejected(reason) => {
                debug!("dropping {} from track: {}", row, reason);
                track.rejected.push( (row.clone(), reason));
            }
        }
    }

    tracks
}

/// all rows of all tracks, in input order of their stations
pub fn derived_rows (tracks: &[StationTrack])->Vec<PacketRow> {
    tracks.iter().flat_map( |t| t.packets.iter().cloned()).collect()
}
