// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Step-by-step driver for external-function entry points.

pub mod driver;
pub mod profile;
