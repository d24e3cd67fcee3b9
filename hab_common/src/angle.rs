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

#[inline]
pub fn normalize_90 (d:f64) -> f64 {
    let x = d % 360.0;

    if x < -90.0 { -180.0 - x }
    else if x > 90.0 { 180.0 - x }
    else { x }
}

#[inline]
pub fn normalize_180 (d: f64) -> f64 {
    let x = d % 360.0;

    if x < -180.0 { 360.0 + x }
    else if x > 180.0 { x - 360.0 }
    else { x }
}

#[inline]
pub fn normalize_360 (d: f64) -> f64 {
    let x = d % 360.0;
    if x < 0.0 { 360.0 + x } else { x }
}

/// a direction in degrees, always normalized to [0..360)
#[derive(Debug,Clone,Copy,PartialEq,PartialOrd,Serialize,Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Angle360(f64);

impl Angle360 {
    pub fn from_degrees (deg: f64)->Self { Angle360( normalize_360(deg)) }

    #[inline] pub fn degrees (&self)->f64 { self.0 }

    /// rounded to whole degrees, which is what we report for tracks
    pub fn whole_degrees (&self)->u16 { (self.0.round() as u16) % 360 }
}

impl From<f64> for Angle360 {
    fn from (deg: f64)->Self { Angle360::from_degrees(deg) }
}

impl From<Angle360> for f64 {
    fn from (a: Angle360)->f64 { a.0 }
}

impl fmt::Display for Angle360 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:.0}°", self.0) }
}
