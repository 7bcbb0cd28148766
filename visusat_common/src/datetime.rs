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

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use crate::if_let;

lazy_static! {
    static ref COMPACT_DTG_RE: Regex = Regex::new(r#"^(\d{4})(\d{2})(\d{2})(\d{2})(\d{2})(\d{2})$"#).unwrap();
    static ref COMPACT_DATE_RE: Regex = Regex::new(r#"^(\d{4})(\d{2})(\d{2})$"#).unwrap();
}

/// parse compact UTC date-time-groups of the form `YYYYMMDDhhmmss`, e.g. "20251022120006"
pub fn parse_compact_dtg (s: &str)->Option<DateTime<Utc>> {
    if_let! {
        Some(cap) = COMPACT_DTG_RE.captures(s),
        Ok(year) = cap[1].parse::<i32>(),
        Ok(month) = cap[2].parse::<u32>(),
        Ok(day) = cap[3].parse::<u32>(),
        Ok(hour) = cap[4].parse::<u32>(),
        Ok(min) = cap[5].parse::<u32>(),
        Ok(sec) = cap[6].parse::<u32>(),
        Some(nd) = NaiveDate::from_ymd_opt( year, month, day),
        Some(nt) = NaiveTime::from_hms_opt( hour, min, sec) => {
            return Some( NaiveDateTime::new( nd, nt).and_utc() )
        }
    }
    None
}

/// parse compact UTC dates of the form `YYYYMMDD` (time is 00:00:00)
pub fn parse_compact_date (s: &str)->Option<DateTime<Utc>> {
    if_let! {
        Some(cap) = COMPACT_DATE_RE.captures(s),
        Ok(year) = cap[1].parse::<i32>(),
        Ok(month) = cap[2].parse::<u32>(),
        Ok(day) = cap[3].parse::<u32>(),
        Some(nd) = NaiveDate::from_ymd_opt( year, month, day),
        Some(ndt) = nd.and_hms_opt( 0, 0, 0) => {
            return Some( ndt.and_utc() )
        }
    }
    None
}

/// parse the date formats we get from file names and command lines:
///   - RFC 3339 / ISO 8601 with offset, e.g. "2025-10-22T12:00:00Z"
///   - ISO 8601 without offset (taken as UTC), e.g. "2025-10-22T12:00:00"
///   - compact "YYYYMMDDhhmmss" or "YYYYMMDD"
pub fn parse_datetime_spec (s: &str)->Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.to_utc())
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(ndt.and_utc())
    }
    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return nd.and_hms_opt( 0, 0, 0).map( |ndt| ndt.and_utc())
    }

    parse_compact_dtg(s).or_else(|| parse_compact_date(s))
}

/// ISO 8601 representation without offset, e.g. "2025-10-22T12:00:06"
pub fn iso_string (dt: &DateTime<Utc>) -> String {
    format!("{}", dt.format("%Y-%m-%dT%H:%M:%S"))
}

//--- support for serde

pub fn deserialize_optional_datetime_spec <'a,D>(deserializer: D) -> Result<Option<DateTime<Utc>>,D::Error>
    where D: Deserializer<'a>
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    if let Some(s) = s {
        let dt = parse_datetime_spec( s.as_str()).ok_or_else( || serde::de::Error::custom(format!("invalid date spec: {s}")))?;
        return Ok( Some(dt) )
    }

    Ok(None)
}

//--- support for clap value parsers

pub fn parse_utc_datetime_arg (s: &str) -> Result<DateTime<Utc>,String> {
    parse_datetime_spec(s).ok_or_else( || format!("not a valid date: {s}"))
}
