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

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Serialize,Deserialize,Serializer,Deserializer};
use std::time::Duration;
use std::fmt;
use parse_duration::parse;

/// milliseconds since the unix epoch. This is our time currency - packet times, feature times and cutoffs
/// are all compared as EpochMillis
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct EpochMillis(i64);

impl EpochMillis {
    pub fn now ()->Self { EpochMillis( Utc::now().timestamp_millis()) }

    pub const fn new (millis:i64)->Self { EpochMillis(millis) }

    pub const fn from_secs (secs: i64)->Self { EpochMillis(secs*1000) }

    pub fn millis (&self)->i64 { self.0 }

    pub fn minus (&self, dur: Duration)->Self { EpochMillis( self.0 - dur.as_millis() as i64) }
    pub fn plus (&self, dur: Duration)->Self { EpochMillis( self.0 + dur.as_millis() as i64) }

    /// signed difference in milliseconds (negative if `earlier` is actually later)
    pub fn millis_since (&self, earlier: EpochMillis)->i64 { self.0 - earlier.0 }

    /// signed difference in whole seconds, rounded towards negative infinity
    pub fn secs_since (&self, earlier: EpochMillis)->i64 { (self.0 - earlier.0).div_euclid(1000) }
}

impl fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::<Utc>::from_timestamp_millis(self.0) {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            None => write!(f, "EpochMillis({})", self.0)
        }
    }
}

impl<Tz> From<DateTime<Tz>> for EpochMillis where Tz: TimeZone {
    fn from (date: DateTime<Tz>)->Self { EpochMillis( date.timestamp_millis()) }
}

#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub fn minutes (n: u64)->Duration { Duration::from_secs(n * 60) }

/* #region packet time parsing *****************************************************************************/

// the packet and map endpoints send "2024-01-01 12:34:56" or "2024-01-01 12:34:56.123-06", newer ones RFC3339
const ZONED_FORMATS: [&str;2] = [ "%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z" ];
const NAIVE_FORMATS: [&str;2] = [ "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f" ];

/// parse a packet or feature time string. Strings without offset are taken as UTC.
/// Unparsable input yields None - callers treat that as "no time" and never fail on it
pub fn parse_packet_time (s: &str)->Option<EpochMillis> {
    let s = s.trim();
    if s.is_empty() { return None }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.into())
    }
    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) { return Some(dt.into()) }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) { return Some(ndt.and_utc().into()) }
    }
    None
}

/// the inverse of [`parse_packet_time`] for naive UTC output
pub fn format_packet_time (t: EpochMillis)->String {
    t.to_string()
}

/* #endregion packet time parsing */

//--- support for serde

pub fn deserialize_duration <'a,D>(deserializer: D) -> Result<Duration,D::Error>
    where D: Deserializer<'a>
{
    String::deserialize(deserializer).and_then( |string| {
        parse(string.as_str())
            .map_err( |e| serde::de::Error::custom(format!("{:?}",e)))
    })
}

pub fn serialize_duration<S: Serializer> (dur: &Duration, s: S) -> Result<S::Ok, S::Error>  {
    let dfm = format!("{:?}", dur);
    s.serialize_str(&dfm)
}
