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

use std::fmt;
use serde::{Serialize,Deserialize};
use serde_with::{serde_as, PickFirst, DisplayFromStr};

use hab_common::datetime::{EpochMillis, parse_packet_time};
use hab_common::geo::GeoPoint;
use crate::engine::{KinematicSample, RejectReason};

/// a position row as returned by the packet query endpoints. Numeric fields are accepted both as JSON
/// numbers and as strings since the backend is not consistent about it
#[serde_as]
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct PacketRow {
    pub time: String,
    pub callsign: String,

    #[serde(default, skip_serializing_if="hab_common::is_none")]
    pub symbol: Option<String>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, skip_serializing_if="hab_common::is_none")]
    pub altitude: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, skip_serializing_if="hab_common::is_none")]
    pub speed_mph: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, skip_serializing_if="hab_common::is_none")]
    pub bearing: Option<f64>,

    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub latitude: f64,

    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub longitude: f64,

    #[serde(default, skip_serializing_if="hab_common::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if="hab_common::is_none")]
    pub ptype: Option<String>,

    pub hash: String,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default, skip_serializing_if="hab_common::is_none")]
    pub vertical_rate: Option<i64>,
}

impl PacketRow {
    /// set the derived fields from an accepted sample. Speed is reported in whole mph
    pub fn attach_sample (&mut self, sample: &KinematicSample) {
        self.speed_mph = Some( sample.speed_mph.round());
        self.vertical_rate = Some( sample.vertical_rate_ft_per_min);
        self.bearing = Some( sample.bearing_deg.whole_degrees() as f64);
    }

    pub fn parsed_time (&self)->Option<EpochMillis> {
        parse_packet_time( &self.time)
    }
}

impl fmt::Display for PacketRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{:.5},{:.5}]", self.time, self.callsign, self.latitude, self.longitude)?;
        if let Some(alt) = self.altitude { write!(f, " {alt:.0}ft")?; }
        if let Some(spd) = self.speed_mph { write!(f, " {spd:.0}mph")?; }
        if let Some(vr) = self.vertical_rate { write!(f, " {vr}ft/min")?; }
        if let Some(hdg) = self.bearing { write!(f, " {hdg:.0}°")?; }
        Ok(())
    }
}

/// a validated position report. Immutable once created
#[derive(Debug,Clone,PartialEq)]
pub struct PositionReport {
    pub station_id: String,
    pub time: EpochMillis,
    pub position: GeoPoint,
    pub altitude_ft: f64,
    pub hash: String,
}

impl PositionReport {
    pub fn new (station_id: impl ToString, time: EpochMillis, position: GeoPoint, altitude_ft: f64, hash: impl ToString)->Self {
        PositionReport { station_id: station_id.to_string(), time, position, altitude_ft, hash: hash.to_string() }
    }

    pub fn from_row (row: &PacketRow)->Result<Self,RejectReason> {
        let time = row.parsed_time().ok_or(RejectReason::MalformedTime)?;
        let altitude_ft = row.altitude.ok_or(RejectReason::MissingAltitude)?;
        let position = GeoPoint::try_from_lon_lat_degrees( row.longitude, row.latitude).ok_or(RejectReason::InvalidPosition)?;

        Ok( PositionReport { station_id: row.callsign.clone(), time, position, altitude_ft, hash: row.hash.clone() })
    }
}
