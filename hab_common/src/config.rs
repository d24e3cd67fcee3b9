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

//! RON configuration lookup. Applications look for `<name>.ron` in `$HAB_LOCAL/config/` and fall back
//! to `./local/config/` if HAB_LOCAL is not set

use std::{env, fs, path::{Path,PathBuf}};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::{Result, HabCommonError, file_not_found};

pub const LOCAL_ENV_VAR: &str = "HAB_LOCAL";

pub fn local_dir ()->PathBuf {
    match env::var(LOCAL_ENV_VAR) {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => PathBuf::from("local")
    }
}

pub fn local_config_path (name: &str)->PathBuf {
    let mut path = local_dir();
    path.push("config");
    path.push( format!("{name}.ron"));
    path
}

/// parse a RON config from a string
pub fn config_from_str<C: DeserializeOwned> (input: &str)->Result<C> {
    ron::from_str(input).map_err( |e| HabCommonError::ConfigParseError( e.to_string()))
}

pub fn load_config<C: DeserializeOwned> (path: impl AsRef<Path>)->Result<C> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err( file_not_found( path.display()))
    }
    debug!("loading config {:?}", path);
    let input = fs::read_to_string(path)?;
    config_from_str(&input)
}

pub fn config_from_local_file<C: DeserializeOwned> (name: &str)->Result<C> {
    load_config( local_config_path(name))
}
