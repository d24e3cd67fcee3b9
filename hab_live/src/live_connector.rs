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

use async_trait::async_trait;
use reqwest::{Client, header::{ACCEPT, HeaderValue}};
use serde_json::Value as JsonValue;
use tracing::trace;

use hab_kinematics::PacketRow;
use crate::errors::{Result, parse_error};
use crate::layer::{FetchPayload, FetchRequest, PayloadFormat};
use crate::session::FeatureSource;
use crate::MapSessionConfig;

/// a [FeatureSource] that retrieves layer snapshots from the tracker web endpoints
#[derive(Debug,Clone)]
pub struct HttpFeatureSource {
    client: Client,
    base_url: String,
}

impl HttpFeatureSource {
    pub fn new (config: &MapSessionConfig)->Result<Self> {
        let client = Client::builder().timeout( config.request_timeout).build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok( HttpFeatureSource { client, base_url })
    }

    pub fn url (&self, request: &FetchRequest)->String {
        format!("{}/{}", self.base_url, request.endpoint())
    }
}

#[async_trait]
impl FeatureSource for HttpFeatureSource {
    async fn fetch (&self, request: &FetchRequest)->Result<FetchPayload> {
        let url = self.url( request);
        trace!("GET {} {:?}", url, request.query());

        let response = self.client.get( url.as_str())
            .header( ACCEPT, HeaderValue::from_static("application/json"))
            .query( &request.query())
            .send()
            .await?
            .error_for_status()?;

        let value: JsonValue = response.json().await?;
        parse_payload( request.format(), value)
    }
}

/// the endpoints answer with an empty JSON array if there is nothing to report
pub fn parse_payload (format: PayloadFormat, value: JsonValue)->Result<FetchPayload> {
    match format {
        PayloadFormat::GeoJson => {
            if let JsonValue::Array(a) = &value {
                if a.is_empty() {
                    return Ok( FetchPayload::Features( geojson::FeatureCollection { bbox: None, features: Vec::new(), foreign_members: None }))
                }
                return Err( parse_error!("expected FeatureCollection, got array"))
            }
            Ok( FetchPayload::Features( serde_json::from_value( value)?))
        }
        PayloadFormat::PacketRows => {
            let rows: Vec<PacketRow> = serde_json::from_value( value)?;
            Ok( FetchPayload::Packets(rows))
        }
    }
}
