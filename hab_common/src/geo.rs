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

//! spherical earth geometry for tracked positions.
//!
//! We keep positions as [geo::Point] (x = longitude, y = latitude, both in degrees) so that they can be
//! collected into [geo::LineString] paths without conversion. Distances are returned as
//! [uom](https://docs.rs/uom/latest/uom/) lengths to avoid mixing up meters, feet and miles.

use std::fmt;
use geo::{Bearing, Distance, Haversine, HaversineMeasure, Point};
use uom::si::f64::Length;
use uom::si::length::meter;

use crate::angle::{Angle360, normalize_90, normalize_180};
use crate::geo_constants::MEAN_EARTH_RADIUS;

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct GeoPoint(Point<f64>);

impl GeoPoint {
    pub fn from_lon_lat_degrees (lon: f64, lat: f64)->Self {
        GeoPoint( Point::new( normalize_180(lon), normalize_90(lat)))
    }

    /// checked constructor for untrusted input (NaN or out of range coordinates yield None)
    pub fn try_from_lon_lat_degrees (lon: f64, lat: f64)->Option<Self> {
        if lon.is_finite() && lat.is_finite() && (-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat) {
            Some( GeoPoint( Point::new(lon,lat)))
        } else {
            None
        }
    }

    #[inline] pub fn longitude_degrees (&self)->f64 { self.0.x() }
    #[inline] pub fn latitude_degrees (&self)->f64 { self.0.y() }

    /// great circle distance on a sphere with [MEAN_EARTH_RADIUS]
    pub fn haversine_distance (&self, other: &GeoPoint)->Length {
        let dist = HaversineMeasure::new( MEAN_EARTH_RADIUS).distance( self.0, other.0);
        Length::new::<meter>(dist)
    }

    /// initial great circle bearing from self towards other (0 = north, clockwise)
    pub fn bearing_to (&self, other: &GeoPoint)->Angle360 {
        Angle360::from_degrees( Haversine.bearing( self.0, other.0))
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude_degrees(), self.longitude_degrees())
    }
}
