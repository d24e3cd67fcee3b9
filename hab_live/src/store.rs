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

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use tracing::trace;

use crate::feature::{Feature, FeatureId};

/// opaque token a renderer can associate with its own object for a feature. Handles are created on `enter`
/// and stay the same for the lifetime of the store entry
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,PartialOrd,Ord)]
pub struct RenderHandle(u64);

impl RenderHandle {
    pub fn value (&self)->u64 { self.0 }
}

#[derive(Debug,Clone,PartialEq)]
pub struct StoreEntry {
    pub feature: Feature,
    pub handle: RenderHandle,
}

/// the result of reconciling a layer store, keyed by feature id
#[derive(Debug,Clone,Default,PartialEq)]
pub struct LayerDelta {
    pub enter: BTreeMap<FeatureId,StoreEntry>,
    pub update: BTreeMap<FeatureId,StoreEntry>,
    pub exit: BTreeMap<FeatureId,StoreEntry>,
}

impl LayerDelta {
    pub fn from_exit (removed: Vec<StoreEntry>)->Self {
        let mut delta = LayerDelta::default();
        for e in removed {
            delta.exit.insert( e.feature.id.clone(), e);
        }
        delta
    }

    pub fn is_empty (&self)->bool {
        self.enter.is_empty() && self.update.is_empty() && self.exit.is_empty()
    }

    pub fn len (&self)->usize { self.enter.len() + self.update.len() + self.exit.len() }

    /// fold entries that were removed after reconciliation (e.g. by the pruner) into this delta.
    /// Something that entered and got removed in the same cycle is never reported
    pub fn absorb_removed (&mut self, removed: Vec<StoreEntry>) {
        for e in removed {
            let id = e.feature.id.clone();
            if self.enter.remove(&id).is_none() {
                self.update.remove(&id);
                self.exit.insert( id, e);
            }
        }
    }
}

impl fmt::Display for LayerDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enter: {:?}, update: {:?}, exit: {:?}",
            self.enter.keys().collect::<Vec<_>>(), self.update.keys().collect::<Vec<_>>(), self.exit.keys().collect::<Vec<_>>())
    }
}

/// the features of one layer, keyed by id
#[derive(Debug,Default)]
pub struct FeatureStore {
    entries: HashMap<FeatureId,StoreEntry>,
    next_handle: u64,
}

impl FeatureStore {
    pub fn new ()->Self { FeatureStore::default() }

    pub fn len (&self)->usize { self.entries.len() }
    pub fn is_empty (&self)->bool { self.entries.is_empty() }

    pub fn get (&self, id: &str)->Option<&StoreEntry> { self.entries.get(id) }
    pub fn contains (&self, id: &str)->bool { self.entries.contains_key(id) }

    pub fn iter (&self)->impl Iterator<Item=&StoreEntry> { self.entries.values() }

    /// diff the incoming features against what we have. Known features are updated in place (keeping
    /// their handle), new ones get a handle and, if `remove_missing` is set, known features that are not
    /// in `incoming` are removed. Reconciling the same input twice yields only updates the second time
    pub fn reconcile (&mut self, incoming: Vec<Feature>, remove_missing: bool)->LayerDelta {
        let mut delta = LayerDelta::default();
        let mut seen: HashSet<FeatureId> = HashSet::with_capacity( incoming.len());

        for feature in incoming {
            let id = feature.id.clone();
            seen.insert( id.clone());

            if let Some(entry) = self.entries.get_mut(&id) {
                entry.feature.update_from( feature);
                let entry = entry.clone();
                if delta.enter.contains_key(&id) { // same id twice in one fetch
                    delta.enter.insert( id, entry);
                } else {
                    delta.update.insert( id, entry);
                }
            } else {
                let handle = self.new_handle();
                let entry = StoreEntry { feature, handle };
                trace!("enter {}", entry.feature);
                self.entries.insert( id.clone(), entry.clone());
                delta.enter.insert( id, entry);
            }
        }

        if remove_missing {
            let missing: Vec<FeatureId> = self.entries.keys().filter( |id| !seen.contains(*id)).cloned().collect();
            for id in missing {
                if let Some(entry) = self.remove( &id) {
                    delta.exit.insert( id, entry);
                }
            }
        }

        delta
    }

    /// the only way features leave the store
    pub fn remove (&mut self, id: &str)->Option<StoreEntry> {
        let entry = self.entries.remove(id);
        if let Some(e) = &entry { trace!("exit {}", e.feature); }
        entry
    }

    /// remove all entries matching the predicate
    pub fn remove_where<F> (&mut self, pred: F)->Vec<StoreEntry> where F: Fn(&Feature)->bool {
        let ids: Vec<FeatureId> = self.entries.values().filter( |e| pred(&e.feature)).map( |e| e.feature.id.clone()).collect();
        ids.iter().filter_map( |id| self.remove(id)).collect()
    }

    pub fn clear (&mut self)->Vec<StoreEntry> {
        self.remove_where( |_| true)
    }

    /// apply a style change to all features, reported as updates
    pub fn restyle<F> (&mut self, mut f: F)->LayerDelta where F: FnMut(&mut Feature) {
        let mut delta = LayerDelta::default();
        for (id,entry) in self.entries.iter_mut() {
            f( &mut entry.feature);
            delta.update.insert( id.clone(), entry.clone());
        }
        delta
    }

    fn new_handle (&mut self)->RenderHandle {
        self.next_handle += 1;
        RenderHandle( self.next_handle)
    }
}
