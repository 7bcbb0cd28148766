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

//! runtime resource support for VisuSat crates: root dir resolution, RON config lookup/loading and
//! the global context of the running binary

use std::{path::{Path,PathBuf}, sync::OnceLock, env};

mod configs;
pub use configs::*;

mod utils;
pub use utils::*;

mod errors;
pub use errors::*;

/* #region bin globals *******************************************************************/

#[derive(Debug)]
pub struct BinContext {
    pub bin_name: String,
    pub bin_crate: String,
    pub proc_id: Option<u32>,
}

impl BinContext {
    /// note this is a no-op if the context is already set
    pub fn set (bin_name: &str, bin_crate: &str, proc_id: Option<u32>) {
        let _ = BIN_CONTEXT.set( Self{ bin_name: bin_name.to_string(), bin_crate: bin_crate.to_string(), proc_id });
    }
}

pub static BIN_CONTEXT: OnceLock<BinContext> = OnceLock::new();

/// this has to be called (once) from the bin source
#[macro_export]
macro_rules! set_bin_context {
    () => {
        {
            // Note that env! looks up the value at compile time
            visusat_build::BinContext::set(env!("CARGO_BIN_NAME"),
                 env!("CARGO_PKG_NAME"),
                 Some(std::process::id()));
        }
    }
}

pub fn get_bin_context()->Option<&'static BinContext> {
    BIN_CONTEXT.get()
}

/// this is mostly for tools and tests that want to load a config from an explicit path
pub fn load_config_path<C,P> (path: P) -> Result<C> where C: for <'a> serde::Deserialize<'a>, P: AsRef<Path> {
    let data = file_contents_as_bytes(path.as_ref())?;
    Ok( ron::de::from_bytes( data.as_slice())? )
}

// the global root dir of the application, which is invariant after init
static ROOT_DIR: OnceLock<PathBuf> = OnceLock::new();

/// the global root dir: `VISUSAT_ROOT`
/// this will try to create the directory if it does not exist and panics if that fails
pub fn root_dir()->&'static PathBuf {
    ROOT_DIR.get_or_init(|| get_or_create_root_dir().expect("failed to locate VisuSat root"))
}

/* #endregion bin globals */

/* #region resource lookup ***************************************************************/

/// locate a resource file and return its PathBuf. Lookup order is
///
/// 1. `$VISUSAT_HOME/<resource_dir>/..`
/// 2. `<workspace-parent>/<resource_dir>/..`
/// 3. `~/.visusat/<resource_dir>/..`
/// 4. in-repo `<resource_crate>/<resource_dir>/..`
///
/// with bin specific paths taking precedence over crate global paths in each location
fn find_resource_file (resource_dir: &str, ctx: &Option<&BinContext>, resource_crate: &str, filename: &str) -> Option<PathBuf> {
    if let Ok(home) = env::var("VISUSAT_HOME") {
        let mut path = Path::new( home.as_str()).to_path_buf();
        if find_external_resource( &mut path, resource_dir, ctx, resource_crate, filename) { return Some(path) }
    }

    // try the parent of the workspace dir next - this is the first dir outside the source repo
    if let Some(mut path) = get_workspace_parent() {
        if find_external_resource( &mut path, resource_dir, ctx, resource_crate, filename) { return Some(path) }
    }

    if let Some(mut path) = default_visusat_root() {
        if find_external_resource( &mut path, resource_dir, ctx, resource_crate, filename) { return Some(path) }
    }

    if let Some(mut path) = get_workspace_dir() {
        if find_internal_resource( &mut path, resource_dir, ctx, resource_crate, filename) { return Some(path) }
    }

    None
}

fn find_external_resource (path: &mut PathBuf, resource_dir: &str, bin_ctx: &Option<&BinContext>, resource_crate: &str, filename: &str)->bool {
    if let Some(ctx) = bin_ctx {
        let bin_crate = ctx.bin_crate.as_str();
        let bin_name = ctx.bin_name.as_str();
        if path_cond!( is_file, path, resource_dir, bin_crate, bin_name, resource_crate, filename) { return true }
    }

    path_cond!( is_file, path, resource_dir, resource_crate, filename)
}

fn find_internal_resource (path: &mut PathBuf, resource_dir: &str, bin_ctx: &Option<&BinContext>, resource_crate: &str, filename: &str)->bool {
    if let Some(ctx) = bin_ctx {
        let bin_crate = ctx.bin_crate.as_str();
        let bin_name = ctx.bin_name.as_str();
        if path_cond!( is_file, path, bin_crate, resource_dir, bin_name, resource_crate, filename) { return true }
    }

    path_cond!( is_file, path, resource_crate, resource_dir, filename)
}

/* #endregion resource lookup */
