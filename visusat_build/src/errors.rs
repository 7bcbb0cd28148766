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

use thiserror::Error;
use ron;

pub type Result<T> = std::result::Result<T, VisuSatBuildError>;

#[derive(Error,Debug)]
pub enum VisuSatBuildError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("config serialize/deserialize RON error {0}")]
    RonSerdeError( #[from] ron::error::SpannedError),

    #[error("env var error: {0}")]
    VarError( #[from] std::env::VarError),

    #[error("resource not found {0}")]
    ResourceNotFoundError(String),
}
