// SPDX-License-Identifier: Apache-2.0, MIT

//! Peer identity.
//!
//! A cluster peer is identified by its libp2p [`PeerId`]: a multihash of its
//! public key, printed in canonical base58. It is already equality-comparable,
//! hashable and round-trip stable, so the allocation core reuses it directly
//! rather than minting a parallel identifier type.

/// Stable, printable, hashable identifier for a cluster peer.
pub use libp2p_identity::PeerId;
