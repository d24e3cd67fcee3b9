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

use tracing::debug;

use hab_common::datetime::{EpochMillis, minutes};
use crate::store::{FeatureStore, StoreEntry};

pub const DEFAULT_LOOKBACK_MINUTES: u32 = 180;

/// ages out features whose time is older than the configured lookback period
#[derive(Debug,Clone)]
pub struct StalenessPruner {
    lookback_minutes: u32,
}

impl StalenessPruner {
    pub fn new (lookback_minutes: u32)->Self {
        StalenessPruner { lookback_minutes: lookback_minutes.max(1) }
    }

    pub fn lookback_minutes (&self)->u32 { self.lookback_minutes }

    pub fn set_lookback_minutes (&mut self, lookback_minutes: u32) {
        self.lookback_minutes = lookback_minutes.max(1);
    }

    pub fn cutoff (&self, now: EpochMillis)->EpochMillis {
        now.minus( minutes( self.lookback_minutes as u64))
    }

    /// remove every feature with a time before `cutoff`. Features without time are never aged out
    pub fn sweep (store: &mut FeatureStore, cutoff: EpochMillis)->Vec<StoreEntry> {
        let removed = store.remove_where( |f| f.time.map( |t| t < cutoff).unwrap_or(false));
        if !removed.is_empty() {
            debug!("pruned {} features older than {}", removed.len(), cutoff);
        }
        removed
    }

    pub fn sweep_at (&self, store: &mut FeatureStore, now: EpochMillis)->Vec<StoreEntry> {
        StalenessPruner::sweep( store, self.cutoff(now))
    }
}

impl Default for StalenessPruner {
    fn default()->Self { StalenessPruner::new( DEFAULT_LOOKBACK_MINUTES) }
}
