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

/// macro to flatten deeply nested "if let .." trees into a construct akin to Scala for-comprehensions
/// (or Haskell do-notation) with the extension that we can (optionally) specify side effects and/or
/// return values for failed matches.
///
/// Constraints:
///   - if there is an `else` clause both the match expression and the else clause have to be blocks
///     (this is a declarative macro constraint)
///   - to keep the syntax consistent we always require a ',' separator between non-terminal `if_let` arms,
///     even if they end in blocks
///
/// Example:
/// ```ignore
/// if_let! {
///     Some(cap) = FILENAME_RE.captures(name),
///     Some(start) = parse_compact_dtg( &cap[2]),
///     Some(end) = parse_compact_dtg( &cap[3]) => {
///         return Some( (start,end) )
///     }
/// }
/// ```
/// which gets expanded into:
/// ```ignore
/// if let Some(cap) = FILENAME_RE.captures(name) {
///     if let Some(start) = parse_compact_dtg( &cap[2]) {
///         if let Some(end) = parse_compact_dtg( &cap[3]) {
///             return Some( (start,end) )
///         }
///     }
/// }
/// ```
/// fail clauses are either blocks or closures (which get the failed match value):
/// ```ignore
/// let res = if_let! {
///     Some(a) = { p } else { -1 },
///     Ok(b)   = { q } else |e| { println!("no b: {e:?}"); -2 } => {
///         a + b
///     }
/// };
/// ```
#[macro_export]
macro_rules! if_let {
    //--- the leafs
    { $p:pat = $x:block else $e:block => $r:expr } => {
        if let $p = $x { $r } else $e
    };
    { $p:pat = $x:block else $closure:expr => $r:expr } => {
        match $x {
            $p => { $r }
            other => { $closure( other) }
        }
    };
    { $p:pat = $x:expr => $r:expr } => {
        if let $p = $x { $r }
    };

    //--- the recursive tt munchers
    { $p:pat = $x:block else $e:block , $($ts:tt)+ } => {
        if let $p = $x { $crate::if_let! { $($ts)+ } } else $e
    };
    { $p:pat = $x:block else $closure:expr , $($ts:tt)+ } => { // expr covers closures
        match $x {
            $p => { $crate::if_let! { $($ts)+ } }
            other => { $closure( other) } // watch out - 'other' type is not Error but Result
        }
    };
    { $p:pat = $x:expr , $($ts:tt)+ } => {
        if let $p = $x {
            $crate::if_let! { $($ts)+ }
        }
    };
}
pub use if_let; // preserve 'macros' module across crates

#[macro_export]
macro_rules! io_error {
    ( $kind:expr, $fmt:literal $(, $($arg:expr),* )? ) =>
    {
        std::io::Error::new( $kind, format!($fmt, $( $($arg),* )?).as_str())
    }
}
pub use io_error;

/* #region define_cli  ****************************************************************************************/

/// syntactic sugar macro for clap based command line interface definition
/// ```ignore
/// define_cli! { ARGS [about="my silly prog"] =
///   verbose: bool        [help="run verbose", short],
///   config: String       [help="pathname of config", long, default_value="blah"]
/// }
///
/// fn main () {
///    let config = &ARGS.config;
///    ...
/// }
/// ```
/// expands into:
/// ```ignore
/// use clap::Parser;
/// use lazy_static::lazy_static;
///
/// #[derive(Parser)]
/// #[command(about = "my silly prog")]
/// struct CliOpts {
///     #[arg(help = "run verbose", short)]
///     verbose: bool,
///
///     #[arg(help = "pathname of config", long, default_value = "blah")]
///     config: String,
/// }
/// lazy_static! { static ref ARGS: CliOpts = CliOpts::parse(); }
/// ```
#[macro_export]
macro_rules! define_cli {
    ($name:ident [ $( $sopt:ident $(= $sx:expr)? ),* ] = $( $( #[$meta:meta] )? $fname:ident : $ftype:ty [ $( $fopt:ident $(= $fx:expr)?),* ] ),* ) => {
        use clap::Parser;
        use lazy_static::lazy_static;

        #[derive(Parser)]
        #[command( $( $sopt $(=$sx)? ),* )]
        struct CliOpts {
            $(
                #[arg( $( $fopt $(=$fx)? ),* )]
                $(#[$meta])?
                $fname : $ftype,
            )*
        }
        lazy_static! { static ref $name: CliOpts = CliOpts::parse(); }
    }
}

/* #endregion define_cli */

/// syntactic sugar macro to define thiserror Error enums:
/// ```ignore
/// define_error!{ pub VisuSatNetError =
///   IOError( #[from] std::io::Error ) : "IO error: {0}",
///   OpFailed(String) : "operation failed: {0}"
/// }
/// ```
/// will get expanded into
/// ```ignore
/// #[derive(thiserror::Error,Debug)]
/// pub enum VisuSatNetError {
///     #[error("IO error: {0}")]
///     IOError(#[from] std::io::Error),
///
///     #[error("operation failed: {0}")]
///     OpFailed(String),
/// }
/// ```
#[macro_export]
macro_rules! define_error {
    ($vis:vis $name:ident = $( $err_variant:ident ( $( $( #[$meta:meta] )? $field_type:ty),* ) : $msg_lit:literal ),*) => {
        #[derive(thiserror::Error,Debug)]
        $vis enum $name {
            $(
                #[error($msg_lit)]
                $err_variant ( $( $(#[$meta])? $field_type ),*  )
            ),*
        }
    }
}
