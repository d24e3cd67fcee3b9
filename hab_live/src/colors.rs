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

pub fn default_palette ()->Vec<String> {
    [ "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#17becf", "#bcbd22", "#7f7f7f" ]
        .iter().map( |s| s.to_string()).collect()
}

/// assigns palette colors to flights in order of first appearance. Assignments are stable for the lifetime
/// of the session, the palette wraps around if there are more flights than colors
#[derive(Debug,Clone)]
pub struct FlightColors {
    palette: Vec<String>,
    assigned: HashMap<String,usize>,
}

impl FlightColors {
    pub fn new (palette: Vec<String>)->Self {
        let palette = if palette.is_empty() { default_palette() } else { palette };
        FlightColors { palette, assigned: HashMap::new() }
    }

    pub fn color_for (&mut self, flight_id: &str)->&str {
        let next = self.assigned.len();
        let idx = *self.assigned.entry( flight_id.to_string()).or_insert( next);
        &self.palette[ idx % self.palette.len()]
    }

    pub fn get (&self, flight_id: &str)->Option<&str> {
        self.assigned.get(flight_id).map( |idx| self.palette[ idx % self.palette.len()].as_str())
    }

    pub fn len (&self)->usize { self.assigned.len() }
    pub fn is_empty (&self)->bool { self.assigned.is_empty() }
}

impl Default for FlightColors {
    fn default()->Self { FlightColors::new( default_palette()) }
}
