// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use xf_base::errors::XfError;

/// A module driven through the external-function protocol.
///
/// Implementors hold all session data themselves; phase ordering
/// (nothing is calculated before a successful initialize) is enforced by
/// [`crate::XfSession`].
pub trait XfIf: Send {
    fn version(&self) -> f64;

    fn initialize(&mut self) -> Result<(), XfError>;

    fn calculate(&mut self, inargs: &[f64], outargs: &mut [f64]) -> Result<(), XfError>;

    /// Number of (inputs, outputs) the driver has to provide.
    fn argument_counts(&mut self) -> Result<(usize, usize), XfError>;

    fn cleanup(&mut self);

    /// Argument counts of the live session, used to size the raw arrays of
    /// a calculate call. `None` while no session is active.
    fn live_argument_counts(&self) -> Option<(usize, usize)> {
        None
    }
}
