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

use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

use hab_common::collections::RingBuffer;
use crate::engine::{KinematicsEngine, KinematicSample, RejectReason};
use crate::packet::PositionReport;

pub const DEFAULT_MAX_HISTORY: usize = 32;

#[derive(Debug,Clone,PartialEq)]
pub enum IngestOutcome {
    /// first report of a station, nothing to derive from
    Baseline,
    Accepted(KinematicSample),
    /// re-reception of a known transmission, history unchanged
    Duplicate,
    /// anomalous report, history unchanged
    Rejected(RejectReason),
}

impl IngestOutcome {
    pub fn sample (&self)->Option<&KinematicSample> {
        if let IngestOutcome::Accepted(sample) = self { Some(sample) } else { None }
    }
    pub fn advanced (&self)->bool {
        matches!( self, IngestOutcome::Baseline | IngestOutcome::Accepted(_))
    }
}

/// the per-station state. The ringbuffer only ever holds accepted reports, its last element is the
/// "last known good" reference for the next sample
#[derive(Debug)]
pub struct StationHistory {
    pub station_id: String,
    reports: RingBuffer<PositionReport>,
    last_sample: Option<KinematicSample>,
    n_rejected: usize,
    n_duplicates: usize,
}

impl StationHistory {
    fn new (station_id: String, max_len: usize)->Self {
        StationHistory { station_id, reports: RingBuffer::new(max_len), last_sample: None, n_rejected: 0, n_duplicates: 0 }
    }

    pub fn last_good (&self)->Option<&PositionReport> { self.reports.back() }
    pub fn last_sample (&self)->Option<&KinematicSample> { self.last_sample.as_ref() }
    pub fn reports (&self)->&RingBuffer<PositionReport> { &self.reports }
    pub fn n_rejected (&self)->usize { self.n_rejected }
    pub fn n_duplicates (&self)->usize { self.n_duplicates }
}

impl fmt::Display for StationHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "StationHistory( {}, n_reports: {}", self.station_id, self.reports.len())?;
        if let Some(r) = self.last_good() { write!( f, ", last: {} {:.0}ft", r.position, r.altitude_ft)?; }
        if let Some(s) = &self.last_sample { write!( f, ", spd: {:.1}, vr: {}", s.speed_mph, s.vertical_rate_ft_per_min)?; }
        write!( f, ", rejected: {}, duplicates: {})", self.n_rejected, self.n_duplicates)
    }
}

/// bounded per-station report history, keyed by station id
#[derive(Debug)]
pub struct PacketHistory {
    max_len: usize,
    stations: HashMap<String,StationHistory>,
}

impl PacketHistory {
    pub fn new (max_len: usize)->Self {
        PacketHistory { max_len, stations: HashMap::new() }
    }

    pub fn len (&self)->usize { self.stations.len() }
    pub fn is_empty (&self)->bool { self.stations.is_empty() }

    pub fn station (&self, station_id: &str)->Option<&StationHistory> { self.stations.get(station_id) }

    pub fn last_good (&self, station_id: &str)->Option<&PositionReport> {
        self.stations.get(station_id).and_then( |s| s.last_good())
    }

    pub fn last_sample (&self, station_id: &str)->Option<&KinematicSample> {
        self.stations.get(station_id).and_then( |s| s.last_sample())
    }

    /// run the report through the engine and only append it if it was accepted (or is the first one).
    /// Duplicates and anomalies leave the station history untouched, hence ingesting the same report
    /// twice yields the same outcome
    pub fn ingest (&mut self, engine: &KinematicsEngine, report: PositionReport)->IngestOutcome {
        let max_len = self.max_len;
        let station = self.stations.entry( report.station_id.clone())
            .or_insert_with( || StationHistory::new( report.station_id.clone(), max_len));

        match engine.compute_sample( station.reports.iter(), &report) {
            Ok(sample) => {
                trace!("accepted {}", sample);
                station.reports.push( report);
                station.last_sample = Some( sample.clone());
                IngestOutcome::Accepted(sample)
            }
            Err(RejectReason::NoReference) => {
                station.reports.push( report);
                IngestOutcome::Baseline
            }
            Err(RejectReason::DuplicateHash) => {
                station.n_duplicates += 1;
                IngestOutcome::Duplicate
            }
            Err(reason) => {
                debug!("rejected report of {} at {}: {}", report.station_id, report.time, reason);
                station.n_rejected += 1;
                IngestOutcome::Rejected(reason)
            }
        }
    }
}

impl Default for PacketHistory {
    fn default()->Self { PacketHistory::new( DEFAULT_MAX_HISTORY) }
}
