// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

/// Method codes a driver passes to an external-function entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum XfMethod {
    Initialize = 0,
    Calculate = 1,
    ReportVersion = 2,
    ReportArguments = 3,
    Cleanup = 99,
}

impl TryFrom<i32> for XfMethod {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(XfMethod::Initialize),
            1 => Ok(XfMethod::Calculate),
            2 => Ok(XfMethod::ReportVersion),
            3 => Ok(XfMethod::ReportArguments),
            99 => Ok(XfMethod::Cleanup),
            other => Err(other),
        }
    }
}

impl fmt::Display for XfMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            XfMethod::Initialize => "XF_INITIALIZE",
            XfMethod::Calculate => "XF_CALCULATE",
            XfMethod::ReportVersion => "XF_REP_VERSION",
            XfMethod::ReportArguments => "XF_REP_ARGUMENTS",
            XfMethod::Cleanup => "XF_CLEANUP",
        };
        f.write_str(name)
    }
}

/// Status codes written back through the status pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum XfStatus {
    Success = 0,
    Failure = 1,
    CleanupNow = 99,
    /// The address of a NUL-terminated message is stored in `outargs[0]`.
    FailureWithMessage = -1,
    /// The required output size is stored in `outargs[0]`.
    IncreaseMemory = -2,
}

impl From<XfStatus> for i32 {
    fn from(status: XfStatus) -> i32 {
        status as i32
    }
}

impl XfStatus {
    pub fn is_success(self) -> bool {
        matches!(self, XfStatus::Success | XfStatus::CleanupNow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off,
    Error,
    Info,
    Debug,
}

impl FromStr for LogLevel {
    type Err = String;

    /// Accepts `OFF`, `NONE`, `ERROR`, `INFO` and `DEBUG` in any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OFF" | "NONE" => Ok(LogLevel::Off),
            "ERROR" => Ok(LogLevel::Error),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Off => "OFF",
            LogLevel::Error => "ERROR",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        };
        f.write_str(name)
    }
}
