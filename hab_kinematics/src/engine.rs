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

//! derivation of ground speed, vertical rate and bearing from consecutive position reports.
//!
//! The engine is a pure function over a station history. It does not store anything, callers
//! (see [crate::history::PacketHistory]) decide if and how the history is advanced based on the result.
//! Physically implausible fixes (GPS glitches, digipeater echoes with a rewritten time) are reported
//! as [RejectReason] values, which are not errors - they just mean "don't use this report"

use std::fmt;
use serde::{Serialize,Deserialize};
use uom::si::length::mile;

use hab_common::angle::Angle360;
use hab_common::datetime::EpochMillis;
use hab_common::geo_constants::FT_PER_MIN_PER_MPH;
use crate::packet::PositionReport;

pub const DEFAULT_MAX_SPEED_MPH: f64 = 310.0;

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
pub struct KinematicsConfig {
    /// ground speed (and vertical speed equivalent) at or above which a fix is considered bogus
    #[serde(default="default_max_speed_mph")]
    pub max_speed_mph: f64,
}

fn default_max_speed_mph()->f64 { DEFAULT_MAX_SPEED_MPH }

impl Default for KinematicsConfig {
    fn default()->Self { KinematicsConfig { max_speed_mph: DEFAULT_MAX_SPEED_MPH } }
}

#[derive(Serialize,Debug,Clone,PartialEq)]
pub struct KinematicSample {
    pub station_id: String,
    pub time: EpochMillis,
    pub speed_mph: f64,
    pub vertical_rate_ft_per_min: i64,
    pub bearing_deg: Angle360,
}

impl fmt::Display for KinematicSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}: {:.1}mph {}ft/min {}", self.station_id, self.time, self.speed_mph, self.vertical_rate_ft_per_min, self.bearing_deg)
    }
}

#[derive(Serialize,Debug,Clone,PartialEq)]
pub enum RejectReason {
    /// nothing to compute a delta against
    NoReference,
    /// same transmission heard again
    DuplicateHash,
    /// incoming report is not strictly newer than the reference
    ClockAnomaly { elapsed_millis: i64 },
    ImplausibleSpeed { speed_mph: f64 },
    ImplausibleVerticalRate { vertical_rate_ft_per_min: i64 },
    MalformedTime,
    MissingAltitude,
    InvalidPosition,
}

impl RejectReason {
    /// is this a fix error, i.e. something that has to be retracted from derived paths
    pub fn is_anomaly (&self)->bool {
        matches!( self, RejectReason::ClockAnomaly{..} | RejectReason::ImplausibleSpeed{..} | RejectReason::ImplausibleVerticalRate{..})
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NoReference => write!(f, "no reference report"),
            RejectReason::DuplicateHash => write!(f, "duplicate transmission"),
            RejectReason::ClockAnomaly{elapsed_millis} => write!(f, "clock anomaly ({elapsed_millis}ms)"),
            RejectReason::ImplausibleSpeed{speed_mph} => write!(f, "implausible ground speed {speed_mph:.0}mph"),
            RejectReason::ImplausibleVerticalRate{vertical_rate_ft_per_min} => write!(f, "implausible vertical rate {vertical_rate_ft_per_min}ft/min"),
            RejectReason::MalformedTime => write!(f, "malformed time"),
            RejectReason::MissingAltitude => write!(f, "missing altitude"),
            RejectReason::InvalidPosition => write!(f, "invalid position"),
        }
    }
}

#[derive(Debug,Clone,Default)]
pub struct KinematicsEngine {
    config: KinematicsConfig,
}

impl KinematicsEngine {
    pub fn new (config: KinematicsConfig)->Self { KinematicsEngine { config } }

    pub fn config (&self)->&KinematicsConfig { &self.config }

    pub fn max_vertical_rate_ft_per_min (&self)->f64 { self.config.max_speed_mph * FT_PER_MIN_PER_MPH }

    /// compute the sample for `incoming` against the most recent report of `history` (ordered oldest to newest,
    /// one station). A hash that already occurs in the history is a re-reception and yields `DuplicateHash`
    pub fn compute_sample<'a,I> (&self, history: I, incoming: &PositionReport)->Result<KinematicSample,RejectReason>
        where I: IntoIterator<Item=&'a PositionReport>, I::IntoIter: DoubleEndedIterator
    {
        let mut prev: Option<&PositionReport> = None;
        for r in history.into_iter().rev() {
            if r.hash == incoming.hash { return Err(RejectReason::DuplicateHash) }
            if prev.is_none() { prev = Some(r) }
        }
        let prev = prev.ok_or(RejectReason::NoReference)?;

        let elapsed_millis = incoming.time.millis_since( prev.time);
        if elapsed_millis <= 0 {
            return Err( RejectReason::ClockAnomaly { elapsed_millis })
        }

        let dt_min = elapsed_millis as f64 / 60_000.0;
        let vertical_rate_ft_per_min = ((incoming.altitude_ft - prev.altitude_ft) / dt_min).round() as i64;

        let dist_miles = prev.position.haversine_distance( &incoming.position).get::<mile>();
        let speed_mph = dist_miles / (dt_min / 60.0);

        if speed_mph >= self.config.max_speed_mph {
            return Err( RejectReason::ImplausibleSpeed { speed_mph })
        }
        if (vertical_rate_ft_per_min.abs() as f64) >= self.max_vertical_rate_ft_per_min() {
            return Err( RejectReason::ImplausibleVerticalRate { vertical_rate_ft_per_min })
        }

        Ok( KinematicSample {
            station_id: incoming.station_id.clone(),
            time: incoming.time,
            speed_mph,
            vertical_rate_ft_per_min,
            bearing_deg: prev.position.bearing_to( &incoming.position),
        })
    }
}
