/*
 * Copyright © 2025, the VisuSat authors. All rights reserved.
 *
 * The “VisuSat” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::path::{Path,PathBuf};
use crate::*;
use crate::errors::*;

pub const CONFIGS: &'static str = "configs";

pub fn find_config_file (ctx: &Option<&BinContext>, resource_crate: &str, filename: &str) -> Option<PathBuf> {
    find_resource_file( CONFIGS, ctx, resource_crate, filename)
}

/// runtime part of config management for crate `resource_crate`.
/// If `filename` refers to an existing file it is loaded directly, otherwise it is looked up in the
/// config dirs (see [`find_config_file`])
pub fn load_crate_config<C> (resource_crate: &str, filename: &str) -> Result<C> where C: for <'a> serde::Deserialize<'a> {
    let path = Path::new(filename);
    if path.is_file() {
        return load_config_path( path)
    }

    let bin_ctx = get_bin_context();
    if let Some(path) = find_config_file( &bin_ctx, resource_crate, filename) {
        load_config_path( &path)
    } else {
        Err( VisuSatBuildError::ResourceNotFoundError(filename.to_string()) )
    }
}

/// this is the main macro that needs to be expanded at the top of crates (lib.rs) that define configs.
/// Config users call the defined `load_config(..)` function to instantiate config structs
#[macro_export]
macro_rules! define_load_config {
    // visusat_build is already imported in the target or otherwise this macro wouldn't be visible
    () => {
        mod configs {
            /// load config using visusat_build - based lookup mechanism
            pub fn load_config<C> (filename: &str) -> visusat_build::Result<C> where C: for <'a> serde::Deserialize<'a> {
                visusat_build::load_crate_config( env!("CARGO_PKG_NAME"), filename)
            }
        }
        pub use configs::*; // make load_config() visible at the crate level
    }
}
