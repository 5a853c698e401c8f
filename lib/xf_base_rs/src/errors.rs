// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use crate::types::XfMethod;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum XfError {
    #[error("{0} called before XF_INITIALIZE")]
    InvalidCallingOrder(XfMethod),
    #[error("Unknown XFMethod ID: {0}")]
    UnknownMethod(i32),
    #[error("{0}")]
    ModuleError(String),
}
