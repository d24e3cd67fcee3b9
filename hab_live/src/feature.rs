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

//! the typed map feature model.
//!
//! Map endpoints deliver GeoJSON features whose `properties` are free-form JSON objects. We validate them
//! once at ingestion into a [Feature] with a closed [FeatureProperties] variant per `objecttype`, so that
//! the rest of the system never has to guess which fields are present

use std::fmt;
use serde::{Serialize,Deserialize};
use serde_json::Value as JsonValue;
use serde_with::{serde_as, PickFirst, DisplayFromStr};
use geojson::{Geometry, JsonObject, Value, feature::Id};
use tracing::warn;

use hab_common::datetime::{EpochMillis, parse_packet_time};
use crate::errors::{Result, parse_error};

pub type FeatureId = String;

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum FeatureKind { Station, Marker, Prediction, Landing, Path }

impl FeatureKind {
    pub fn from_objecttype (s: &str)->Option<Self> {
        match s {
            "station" => Some(FeatureKind::Station),
            "balloonmarker" => Some(FeatureKind::Marker),
            "prediction" => Some(FeatureKind::Prediction),
            "landingprediction" => Some(FeatureKind::Landing),
            "flightpath" => Some(FeatureKind::Path),
            _ => None
        }
    }

    pub fn objecttype (&self)->&'static str {
        match self {
            FeatureKind::Station => "station",
            FeatureKind::Marker => "balloonmarker",
            FeatureKind::Prediction => "prediction",
            FeatureKind::Landing => "landingprediction",
            FeatureKind::Path => "flightpath",
        }
    }
}

/// properties of stations and balloon markers
#[serde_as]
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq,Default)]
pub struct StationProps {
    #[serde(default)]
    pub callsign: Option<String>,

    #[serde(default, rename="flightid")]
    pub flight_id: Option<String>,

    #[serde(default)]
    pub symbol: Option<String>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub altitude: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub speed_mph: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub bearing: Option<f64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub vertical_rate: Option<f64>,

    #[serde(default)]
    pub comment: Option<String>,
}

/// properties of predicted flight paths and landing locations
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq,Default)]
pub struct PredictionProps {
    #[serde(default)]
    pub callsign: Option<String>,

    #[serde(default, rename="flightid")]
    pub flight_id: Option<String>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub tooltip: Option<String>,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq,Default)]
pub struct PathProps {
    #[serde(default)]
    pub callsign: Option<String>,

    #[serde(default, rename="flightid")]
    pub flight_id: Option<String>,
}

#[derive(Debug,Clone,PartialEq)]
pub enum FeatureProperties {
    Station(StationProps),
    Marker(StationProps),
    Prediction(PredictionProps),
    Landing(PredictionProps),
    Path(PathProps),
}

impl FeatureProperties {
    fn from_json (kind: FeatureKind, props: &JsonObject)->Result<Self> {
        let v = JsonValue::Object( props.clone());
        let fp = match kind {
            FeatureKind::Station => FeatureProperties::Station( serde_json::from_value(v)?),
            FeatureKind::Marker => FeatureProperties::Marker( serde_json::from_value(v)?),
            FeatureKind::Prediction => FeatureProperties::Prediction( serde_json::from_value(v)?),
            FeatureKind::Landing => FeatureProperties::Landing( serde_json::from_value(v)?),
            FeatureKind::Path => FeatureProperties::Path( serde_json::from_value(v)?),
        };
        Ok(fp)
    }

    pub fn kind (&self)->FeatureKind {
        match self {
            FeatureProperties::Station(_) => FeatureKind::Station,
            FeatureProperties::Marker(_) => FeatureKind::Marker,
            FeatureProperties::Prediction(_) => FeatureKind::Prediction,
            FeatureProperties::Landing(_) => FeatureKind::Landing,
            FeatureProperties::Path(_) => FeatureKind::Path,
        }
    }
}

/// rendering attributes we add to features (they are not part of the feed)
#[derive(Debug,Clone,PartialEq,Default)]
pub struct FeatureStyle {
    pub color: Option<String>,
    pub icon_size: Option<u32>,
}

#[derive(Debug,Clone,PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Geometry,
    pub properties: FeatureProperties,
    /// the authority for staleness. None if the feature has no (parsable) time
    pub time: Option<EpochMillis>,
    pub style: FeatureStyle,
}

impl Feature {
    /// validate a GeoJSON feature. Features without id, geometry or a known objecttype are rejected,
    /// a missing or unparsable time is not an error (the feature just can't be aged out or tooltipped)
    pub fn from_geojson (gf: &geojson::Feature)->Result<Self> {
        let props = gf.properties.as_ref().ok_or_else( || parse_error!("feature without properties"))?;

        let id = match props.get("id") {
            Some(JsonValue::String(s)) => Some(s.clone()),
            Some(JsonValue::Number(n)) => Some(n.to_string()),
            _ => match &gf.id {
                Some(Id::String(s)) => Some(s.clone()),
                Some(Id::Number(n)) => Some(n.to_string()),
                None => None
            }
        }.ok_or_else( || parse_error!("feature without id"))?;

        let geometry = gf.geometry.clone().ok_or_else( || parse_error!("feature {} without geometry", id))?;

        let objecttype = props.get("objecttype").and_then( |v| v.as_str()).unwrap_or("");
        let kind = FeatureKind::from_objecttype( objecttype)
            .ok_or_else( || parse_error!("feature {} has unknown objecttype '{}'", id, objecttype))?;

        let properties = FeatureProperties::from_json( kind, props)
            .map_err( |e| parse_error!("feature {} has invalid properties: {}", id, e))?;

        let time = props.get("time").and_then( |v| v.as_str()).and_then( parse_packet_time);

        Ok( Feature { id, geometry, properties, time, style: FeatureStyle::default() })
    }

    pub fn kind (&self)->FeatureKind { self.properties.kind() }

    /// in-place update that keeps our identity. Point geometries only get their position replaced.
    /// Returns true if anything changed
    pub fn update_from (&mut self, other: Feature)->bool {
        let Feature { geometry, properties, time, style, .. } = other;
        let changed = self.geometry != geometry || self.properties != properties || self.time != time || self.style != style;

        match geometry.value {
            Value::Point(new_pos) if matches!( self.geometry.value, Value::Point(_)) => {
                if let Value::Point(pos) = &mut self.geometry.value { *pos = new_pos }
            }
            value => self.geometry.value = value
        }
        self.properties = properties;
        self.time = time;
        self.style = style;

        changed
    }

    /// (lon,lat) in degrees if this is a point feature
    pub fn point (&self)->Option<(f64,f64)> {
        match &self.geometry.value {
            Value::Point(pos) if pos.len() >= 2 => Some( (pos[0],pos[1])),
            _ => None
        }
    }

    pub fn flight_id (&self)->Option<&str> {
        match &self.properties {
            FeatureProperties::Station(p) | FeatureProperties::Marker(p) => p.flight_id.as_deref(),
            FeatureProperties::Prediction(p) | FeatureProperties::Landing(p) => p.flight_id.as_deref(),
            FeatureProperties::Path(p) => p.flight_id.as_deref(),
        }
    }

    pub fn callsign (&self)->Option<&str> {
        match &self.properties {
            FeatureProperties::Station(p) | FeatureProperties::Marker(p) => p.callsign.as_deref(),
            FeatureProperties::Prediction(p) | FeatureProperties::Landing(p) => p.callsign.as_deref(),
            FeatureProperties::Path(p) => p.callsign.as_deref(),
        }
    }

    pub fn station_props (&self)->Option<&StationProps> {
        match &self.properties {
            FeatureProperties::Station(p) | FeatureProperties::Marker(p) => Some(p),
            _ => None
        }
    }

    pub fn vertical_rate (&self)->Option<f64> {
        self.station_props().and_then( |p| p.vertical_rate)
    }

    /// the hover text. None if the feature lacks what the text needs (time and coordinates, plus the symbol
    /// for stations)
    pub fn tooltip (&self)->Option<String> {
        let time = self.time?;
        let (lon,lat) = self.point()?;

        match &self.properties {
            FeatureProperties::Station(p) | FeatureProperties::Marker(p) => {
                p.symbol.as_ref()?;
                let name = p.callsign.as_deref().unwrap_or( self.id.as_str());
                let mut s = format!("{name} {time}");
                if let Some(alt) = p.altitude { s.push_str( &format!(" {alt:.0}ft")); }
                if let Some(spd) = p.speed_mph { s.push_str( &format!(" {spd:.0}mph")); }
                if let Some(vr) = p.vertical_rate { s.push_str( &format!(" {vr:.0}ft/min")); }
                s.push_str( &format!(" ({lat:.4},{lon:.4})"));
                Some(s)
            }
            FeatureProperties::Prediction(p) | FeatureProperties::Landing(p) => {
                let text = p.tooltip.as_deref().or( p.label.as_deref()).unwrap_or( self.id.as_str());
                Some( format!("{text} {time} ({lat:.4},{lon:.4})"))
            }
            FeatureProperties::Path(_) => None
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}", self.kind().objecttype(), self.id)?;
        if let Some((lon,lat)) = self.point() { write!(f, " {lat:.4},{lon:.4}")?; }
        if let Some(t) = self.time { write!(f, " {t}")?; }
        write!(f, ")")
    }
}

/// validate all features of a collection, skipping the ones we can't use
pub fn features_from_collection (fc: &geojson::FeatureCollection)->Vec<Feature> {
    fc.features.iter().filter_map( |gf| {
        match Feature::from_geojson(gf) {
            Ok(f) => Some(f),
            Err(e) => { warn!("skipping malformed feature: {}", e); None }
        }
    }).collect()
}
