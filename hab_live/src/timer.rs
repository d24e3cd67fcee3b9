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

use std::time::Duration;
use tokio::{task::{self, AbortHandle}, time::{interval, MissedTickBehavior}};

/// spawn a task that calls `on_tick` every `timer_interval` until it returns false or the returned handle
/// is aborted. The first call happens after one interval unless `instantly` is set
pub fn repeat_timer<F> (timer_interval: Duration, instantly: bool, mut on_tick: F)->AbortHandle
    where F: FnMut()->bool + Send + 'static
{
    let mut interval = interval(timer_interval);
    interval.set_missed_tick_behavior( MissedTickBehavior::Delay);
    let mut send_tick = instantly;

    let jh = task::spawn( async move {
        loop {
            interval.tick().await; // the first tick completes immediately
            if send_tick {
                if !on_tick() { break }
            } else {
                send_tick = true;
            }
        }
    });
    jh.abort_handle()
}
