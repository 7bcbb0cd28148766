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

use std::fs::{self,File};
use std::io::{self,Read,Error as IOError,ErrorKind};
use std::env;
use std::path::{Path,PathBuf};
use io::ErrorKind::*;

use crate::macros::io_error;

type Result<T> = std::result::Result<T,std::io::Error>;

pub fn filename<'a,T: AsRef<Path>> (path: &'a T)->Option<&'a str> {
    path.as_ref().file_name().and_then(|ostr| ostr.to_str())
}

pub fn extension<'a,T: AsRef<Path>> (path: &'a T)->Option<&'a str> {
    path.as_ref().extension().and_then(|ostr| ostr.to_str())
}

/// check if dir pathname exists and is writable, try to create dir otherwise
pub fn ensure_writable_dir (path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        let md = fs::metadata(&path)?;
        if md.permissions().readonly() {
            Err(io_error!(PermissionDenied, "output_dir {:?} not writable", &path))
        } else {
            Ok(())
        }

    } else {
        fs::create_dir_all(path)
    }
}

/// the parent dir of a file path, with an empty parent (relative filename) mapped to "."
pub fn parent_dir (path: impl AsRef<Path>)->PathBuf {
    match path.as_ref().parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from(".")
    }
}

pub fn path_to_lossy_string (path: impl AsRef<Path>) -> String {
    path.as_ref().to_string_lossy().as_ref().to_string()
}

pub fn filepath_contents <P: AsRef<Path>> (path: &P) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let md = file.metadata()?;
    let len = md.len();
    if len > 0 {
        let mut contents: Vec<u8> = Vec::with_capacity(len as usize);
        file.read_to_end(&mut contents)?;
        Ok(contents)

    } else { Err(io_error!(Other, "file empty: {:?}", file)) }
}

/// all regular files in `dir` (non-recursive). Fails with `NotFound` if `dir` is not a directory.
/// Note the returned list is in filesystem order
pub fn files_in_dir<P: AsRef<Path>> (dir: &P) -> Result<Vec<PathBuf>> {
    let dir: &Path = dir.as_ref();
    if !dir.is_dir() {
        return Err( io_error!(NotFound, "not a directory: {:?}", dir))
    }

    let mut list: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            list.push( entry.path())
        }
    }

    Ok(list)
}

/// are both paths referring to the same file. This does not require `b` to exist
pub fn is_same_file (a: impl AsRef<Path>, b: impl AsRef<Path>)->bool {
    let (a,b) = (a.as_ref(), b.as_ref());
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(ca), Ok(cb)) => ca == cb,
        (Ok(ca), Err(_)) => {
            // b does not exist (yet) - compare canonical parent and filename
            match (fs::canonicalize(parent_dir(b)), b.file_name()) {
                (Ok(pb), Some(fname)) => pb.join(fname) == ca,
                _ => false
            }
        }
        _ => false
    }
}

/// replace '~/' and '$<name>' path elements
pub fn replace_env_var_path (path: impl AsRef<Path>)->Result<PathBuf> {
    let mut p = PathBuf::new();
    let mut n = 0;

    for c in path.as_ref().iter() {
        let e = c.to_str().ok_or( IOError::new(ErrorKind::Other, format!("invalid path: {:?}", path.as_ref())))?;

        if e == "~" && n == 0 {
            p.push( env::var("HOME").map_err( |_| IOError::new(ErrorKind::Other, "HOME not set"))?)
        } else if e.starts_with('$') && e.len() > 1 {
            if e == "$VISUSAT_ROOT" { // this we set automatically
                p.push( visusat_build::root_dir())
            } else { // all others have to be set in the environment
                p.push( env::var( &e[1..]).map_err( |_| IOError::new(ErrorKind::Other, format!("{e} not set")))?)
            }
        } else {
            p.push(e)
        }

        n += 1;
    }

    Ok(p)
}

/* #region EnvPathBuf *******************************************************************************/

use serde::ser::{Serialize as SerializeTrait, Serializer};
use serde::de::{Deserialize as DeserializeTrait, Deserializer};
use std::{fmt::Debug,ops::Deref};

/// a PathBuf that can use env vars as path elements
#[derive(Clone,PartialEq)]
pub struct EnvPathBuf(PathBuf);

impl EnvPathBuf {
    pub fn new (path: impl AsRef<Path>)->Result<Self> {
        Ok( EnvPathBuf( replace_env_var_path(path)?) )
    }
}

impl Debug for EnvPathBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl Deref for EnvPathBuf {
    type Target = PathBuf;

    fn deref (&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for EnvPathBuf {
    #[inline]
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

// note this means we serialize the expanded pathbuf
impl SerializeTrait for EnvPathBuf {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> where S: Serializer {
        self.0.serialize( serializer)
    }
}

impl<'de> DeserializeTrait<'de> for EnvPathBuf {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error> where D: Deserializer<'de> {
        let a = String::deserialize(deserializer)?;
        let ep = PathBuf::from(a);
        let p = replace_env_var_path(&ep).map_err(|_| serde::de::Error::custom(&format!("failed to expand path {ep:?}")))?;

        Ok( EnvPathBuf(p) )
    }
}

/* #endregion EnvPathBuf */
