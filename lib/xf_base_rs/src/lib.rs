// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

pub mod errors;
pub mod types;
