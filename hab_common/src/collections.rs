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

use std::collections::{VecDeque, vec_deque};

/// a VecDeque based ringbuffer with an explicit max length.
/// We don't rely on `VecDeque::capacity()` since the allocator is free to round that up, which would
/// silently grow the history we keep per station
#[derive(Debug,Clone)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    max_len: usize,
}

impl<T> RingBuffer<T> {
    pub fn new (max_len: usize)->Self {
        let max_len = max_len.max(1);
        RingBuffer { items: VecDeque::with_capacity(max_len), max_len }
    }

    pub fn max_len (&self)->usize { self.max_len }
    pub fn len (&self)->usize { self.items.len() }
    pub fn is_empty (&self)->bool { self.items.is_empty() }
    pub fn is_full (&self)->bool { self.items.len() >= self.max_len }

    pub fn front (&self)->Option<&T> { self.items.front() }
    pub fn back (&self)->Option<&T> { self.items.back() }

    pub fn iter (&self)->vec_deque::Iter<'_,T> { self.items.iter() }

    /// push a new element to the end, returning the oldest element if we had to drop it
    pub fn push (&mut self, t: T)->Option<T> {
        let dropped = if self.items.len() >= self.max_len { self.items.pop_front() } else { None };
        self.items.push_back(t);
        dropped
    }

    pub fn to_vec (&self)->Vec<T> where T: Clone { self.items.iter().cloned().collect() }
}

impl<'a,T> IntoIterator for &'a RingBuffer<T> {
    type Item = &'a T;
    type IntoIter = vec_deque::Iter<'a,T>;
    fn into_iter (self)->Self::IntoIter { self.items.iter() }
}
