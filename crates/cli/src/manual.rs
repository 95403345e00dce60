// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Manual capacity edits given as command-line options.
//!
//! Overrides are written as `WEEKS=VALUE`, where `WEEKS` is a single week
//! (`10`) or an inclusive range (`10-14`), optionally prefixed by a
//! sub-department name (`Tops:10-14=500`).

use capacity_portal::{CapacityState, OverrideTarget};
use capacity_portal_domain::{
    DomainError, SubDepartment, parse_capacity_value, parse_dollar_limit, parse_week_number,
};
use clap::Args;

/// One `--override` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideSpec {
    pub target: OverrideTarget,
    pub sub_dept: Option<SubDepartment>,
    pub value: u32,
}

/// Edits applied to a freshly loaded workspace before submitting it.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualEdits {
    /// New vendor-level default capacity
    #[arg(long, value_parser = parse_capacity)]
    pub default_capacity: Option<u32>,

    /// Baseline for one sub-department as NAME=VALUE; repeatable
    #[arg(long = "subdept-capacity", value_parser = parse_sub_dept_capacity)]
    pub sub_dept_capacities: Vec<(SubDepartment, u32)>,

    /// New dollar limit
    #[arg(long, value_parser = parse_limit)]
    pub dollar_limit: Option<u64>,

    /// Override as WEEK=VALUE, START-END=VALUE or NAME:START-END=VALUE; repeatable
    #[arg(long = "override", value_parser = parse_override)]
    pub overrides: Vec<OverrideSpec>,
}

impl ManualEdits {
    /// Applies the edits in order: baselines, dollar limit, then overrides.
    ///
    /// # Returns
    ///
    /// The number of override weeks written.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is zero, a range is reversed, or an
    /// override's sub-department does not fit the vendor's mode.
    pub fn apply(&self, state: &mut CapacityState) -> Result<usize, DomainError> {
        if let Some(value) = self.default_capacity {
            state.set_default_capacity(value)?;
        }
        for (sub_dept, value) in &self.sub_dept_capacities {
            state.set_sub_dept_capacity(*sub_dept, *value)?;
        }
        if let Some(limit) = self.dollar_limit {
            state.set_dollar_limit(limit)?;
        }

        let mut written: usize = 0;
        for spec in &self.overrides {
            written += state.apply_override(spec.target, spec.sub_dept, spec.value)?;
        }
        Ok(written)
    }
}

fn parse_capacity(raw: &str) -> Result<u32, String> {
    parse_capacity_value(raw).map_err(|e| e.to_string())
}

fn parse_limit(raw: &str) -> Result<u64, String> {
    parse_dollar_limit(raw).map_err(|e| e.to_string())
}

fn split_assignment(raw: &str) -> Result<(&str, &str), String> {
    raw.split_once('=')
        .ok_or_else(|| format!("Expected NAME=VALUE, got '{raw}'"))
}

fn parse_sub_dept_capacity(raw: &str) -> Result<(SubDepartment, u32), String> {
    let (name, value): (&str, &str) = split_assignment(raw)?;
    let sub_dept: SubDepartment = SubDepartment::parse_exact(name).map_err(|e| e.to_string())?;
    Ok((sub_dept, parse_capacity(value)?))
}

fn parse_override(raw: &str) -> Result<OverrideSpec, String> {
    let (weeks, value): (&str, &str) = split_assignment(raw)?;
    let (sub_dept, weeks): (Option<&str>, &str) = weeks
        .split_once(':')
        .map_or((None, weeks), |(name, weeks)| (Some(name), weeks));
    let sub_dept: Option<SubDepartment> = sub_dept
        .map(SubDepartment::parse_exact)
        .transpose()
        .map_err(|e| e.to_string())?;

    let week = |raw: &str| parse_week_number(raw).map_err(|e| e.to_string());
    let target: OverrideTarget = weeks.split_once('-').map_or_else(
        || week(weeks).map(OverrideTarget::Single),
        |(start, end)| {
            Ok(OverrideTarget::Range {
                start: week(start)?,
                end: week(end)?,
            })
        },
    )?;

    Ok(OverrideSpec {
        target,
        sub_dept,
        value: parse_capacity(value)?,
    })
}
