// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Model file fingerprints.

use std::fs;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

pub fn file_sha256(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);

    Ok(format!("{:x}", hasher.finalize()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashCheck {
    Match,
    Mismatch { actual: String },
    /// The expected value is not a SHA-256 hex digest (e.g. a legacy MD5).
    Unverifiable,
}

pub fn check_file_hash(path: &Path, expected: &str) -> io::Result<HashCheck> {
    if expected.len() != 64 || !expected.chars().all(|c| c.is_ascii_hexdigit()) {
        return Ok(HashCheck::Unverifiable);
    }

    let actual = file_sha256(path)?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(HashCheck::Match)
    } else {
        Ok(HashCheck::Mismatch { actual })
    }
}
