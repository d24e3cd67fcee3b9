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

//! common types and functions shared by the balloon tracking crates: time stamps, spherical
//! earth geometry, bounded histories and RON configuration lookup

pub mod errors;
pub mod collections;
pub mod datetime;
pub mod angle;
pub mod geo_constants;
pub mod geo;
pub mod config;

// a global fn that can be used with serde(skip_serializing_if="hab_common::is_none")
#[inline] pub fn is_none<T> (opt: &Option<T>)->bool { opt.is_none() }

/// clamp a configured value into its valid range, logging if we had to change it
pub fn clamp_config_value<T> (name: &str, v: T, min: T, max: T)->T where T: PartialOrd + Copy + std::fmt::Display {
    if v < min {
        tracing::warn!("configured {name} {v} below minimum, using {min}");
        min
    } else if v > max {
        tracing::warn!("configured {name} {v} above maximum, using {max}");
        max
    } else {
        v
    }
}
