// SPDX-License-Identifier: Apache-2.0, MIT

use std::collections::HashSet;

use cid::Cid;

use crate::peer::PeerId;
use crate::policy::ReplicationPolicy;

/// A single allocation call's parameters, bundled for convenience.
#[derive(Clone, Debug)]
pub struct AllocationRequest {
    pub cid: Cid,
    pub policy: ReplicationPolicy,
    pub blacklist: HashSet<PeerId>,
}

impl AllocationRequest {
    pub fn new(cid: Cid, policy: ReplicationPolicy, blacklist: HashSet<PeerId>) -> Self {
        Self {
            cid,
            policy,
            blacklist,
        }
    }
}
