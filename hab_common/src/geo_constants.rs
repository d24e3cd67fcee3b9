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

/// mean earth radius in meters, as used for great circle (haversine) computations
pub const MEAN_EARTH_RADIUS: f64 = 6371000.0;

pub const FEET_PER_MILE: f64 = 5280.0;

/// 1 mph expressed in feet per minute (5280 / 60)
pub const FT_PER_MIN_PER_MPH: f64 = FEET_PER_MILE / 60.0;
