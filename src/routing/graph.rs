// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! The network map the router searches lives here.
//!
//! [`NetworkGraph`] is a plain in-memory store of nodes, channels and their per-direction
//! forwarding policies. How it gets filled is up to the caller (a gossip layer, a database, a
//! test fixture), as this module performs no message validation or signature checking. Searches
//! read the graph through a [`ReadOnlyNetworkGraph`] snapshot so concurrent updates never tear
//! a path out from under a walk in progress.

use bitcoin::secp256k1::constants::PUBLIC_KEY_SIZE;
use bitcoin::secp256k1::PublicKey;

use crate::routing::router::{RouterError, RouterErrorKind};

use core::{cmp, fmt};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard};

/// Represents the compressed public key of a node
#[derive(Clone, Copy)]
pub struct NodeId([u8; PUBLIC_KEY_SIZE]);

impl NodeId {
	/// Create a new NodeId from a public key
	pub fn from_pubkey(pubkey: &PublicKey) -> Self {
		NodeId(pubkey.serialize())
	}
}

impl fmt::Debug for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "NodeId({})", log_bytes!(self.0))
	}
}
impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", log_bytes!(self.0))
	}
}

impl core::hash::Hash for NodeId {
	fn hash<H: core::hash::Hasher>(&self, hasher: &mut H) {
		self.0.hash(hasher);
	}
}

impl Eq for NodeId {}

impl PartialEq for NodeId {
	fn eq(&self, other: &Self) -> bool {
		self.0[..] == other.0[..]
	}
}

impl cmp::PartialOrd for NodeId {
	fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for NodeId {
	fn cmp(&self, other: &Self) -> cmp::Ordering {
		self.0[..].cmp(&other.0[..])
	}
}

/// Fees for routing via a given channel or a node
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub struct RoutingFees {
	/// Flat routing fee in millisatoshis.
	pub base_msat: u32,
	/// Liquidity-based rates in millionths of a routed amount.
	/// In other words, 10000 is 1%.
	pub proportional_millionths: u32,
}

/// Details about one direction of a channel: the forwarding policy the node at its near end
/// advertises for payments flowing towards [`EdgePolicy::node`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgePolicy {
	/// The unique identifier of the channel this policy belongs to.
	pub short_channel_id: u64,
	/// The node at the far end: the one this edge leads to.
	pub node: NodeId,
	/// Fees the near end charges for forwarding over this channel.
	pub fees: RoutingFees,
	/// The difference in CLTV values that the near end reserves when forwarding.
	pub cltv_expiry_delta: u16,
	/// The minimum value, which must be relayed to the next hop via the channel
	pub htlc_minimum_msat: u64,
	/// Whether the channel can be currently used for payments (in this one direction).
	pub enabled: bool,
	/// The direction bit distinguishing this policy from its channel's opposite one: 0 when
	/// [`EdgePolicy::node`] is the lexicographically larger endpoint, 1 otherwise.
	pub direction: u8,
}

/// Canonical hashable identifier of one direction of a channel, pairing the channel id with the
/// [`EdgePolicy::direction`] bit. The two policies of the same channel map to distinct locators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeLocator {
	/// The unique identifier of the channel.
	pub short_channel_id: u64,
	/// The direction bit of the policy within its channel.
	pub direction: u8,
}

impl EdgeLocator {
	/// Returns the locator of the given policy's directed edge.
	pub fn from_edge(edge: &EdgePolicy) -> Self {
		EdgeLocator { short_channel_id: edge.short_channel_id, direction: edge.direction }
	}
}

/// Details about a channel (both directions).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelInfo {
	/// The lexicographically smaller of the two endpoints.
	pub node_one: NodeId,
	/// Details about the direction from `node_one` to `node_two`, if known.
	pub one_to_two: Option<EdgePolicy>,
	/// The lexicographically larger of the two endpoints.
	pub node_two: NodeId,
	/// Details about the direction from `node_two` to `node_one`, if known.
	pub two_to_one: Option<EdgePolicy>,
	/// Upper bound on in-flight millisatoshis across the channel.
	pub capacity_msat: u64,
}

impl ChannelInfo {
	/// Returns the endpoint opposite the given `node`, or `None` if `node` is not one of the
	/// channel's counterparties.
	pub fn other_node(&self, node: &NodeId) -> Option<&NodeId> {
		if *node == self.node_one {
			Some(&self.node_two)
		} else if *node == self.node_two {
			Some(&self.node_one)
		} else {
			None
		}
	}

	/// Returns the policy for the direction whose destination is `target`, i.e. the forwarding
	/// terms advertised by the opposite endpoint, or `None` if `target` is not a counterparty
	/// or no policy is known for that direction.
	pub fn policy_towards(&self, target: &NodeId) -> Option<&EdgePolicy> {
		if *target == self.node_two {
			self.one_to_two.as_ref()
		} else if *target == self.node_one {
			self.two_to_one.as_ref()
		} else {
			None
		}
	}
}

impl fmt::Display for ChannelInfo {
	fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
		write!(f, "node_one: {}, one_to_two: {:?}, node_two: {}, two_to_one: {:?}, capacity_msat: {}",
		   self.node_one, self.one_to_two, self.node_two, self.two_to_one, self.capacity_msat)?;
		Ok(())
	}
}

/// Details about a node in the graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeInfo {
	/// All valid channels a node has announced
	pub channels: Vec<u64>,
}

/// An unsigned update to the forwarding policy of one direction of a channel.
///
/// Flags bit 0 selects the direction: 0 updates the policy from the lexicographically smaller
/// endpoint, 1 the opposite one. Flags bit 1, when set, marks the direction disabled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelUpdate {
	/// The unique identifier of the channel being updated.
	pub short_channel_id: u64,
	/// Direction and disabled bits, as above.
	pub flags: u8,
	/// The CLTV delta the advertising node reserves when forwarding.
	pub cltv_expiry_delta: u16,
	/// The smallest amount the advertising node will forward.
	pub htlc_minimum_msat: u64,
	/// The fees the advertising node charges.
	pub fees: RoutingFees,
}

/// Represents the network as nodes and channels between them
pub struct NetworkGraph {
	// Lock order: channels -> nodes
	channels: RwLock<BTreeMap<u64, ChannelInfo>>,
	nodes: RwLock<BTreeMap<NodeId, NodeInfo>>,
}

/// A read-only view of [`NetworkGraph`].
pub struct ReadOnlyNetworkGraph<'a> {
	channels: RwLockReadGuard<'a, BTreeMap<u64, ChannelInfo>>,
	nodes: RwLockReadGuard<'a, BTreeMap<NodeId, NodeInfo>>,
}

impl NetworkGraph {
	/// Creates a new, empty network graph.
	pub fn new() -> Self {
		NetworkGraph {
			channels: RwLock::new(BTreeMap::new()),
			nodes: RwLock::new(BTreeMap::new()),
		}
	}

	/// Returns a read-only view of the graph. Searches run entirely within one view, so they
	/// observe a consistent snapshot; updates block until outstanding views are dropped.
	pub fn read_only(&self) -> ReadOnlyNetworkGraph {
		let channels = self.channels.read().unwrap();
		let nodes = self.nodes.read().unwrap();
		ReadOnlyNetworkGraph { channels, nodes }
	}

	/// Records a channel between `node_a` and `node_b` with the given capacity, replacing any
	/// prior channel under the same id. Both endpoints are created as needed and the channel is
	/// registered in their adjacency lists. Policies start out unknown; see
	/// [`NetworkGraph::update_channel`].
	pub fn add_channel(&self, short_channel_id: u64, node_a: NodeId, node_b: NodeId, capacity_msat: u64) {
		let (node_one, node_two) = if node_a < node_b { (node_a, node_b) } else { (node_b, node_a) };

		let mut channels = self.channels.write().unwrap();
		let mut nodes = self.nodes.write().unwrap();
		channels.insert(short_channel_id, ChannelInfo {
			node_one,
			one_to_two: None,
			node_two,
			two_to_one: None,
			capacity_msat,
		});
		for node in [node_one, node_two].iter() {
			let info = nodes.entry(*node).or_insert_with(NodeInfo::default);
			if !info.channels.contains(&short_channel_id) {
				info.channels.push(short_channel_id);
			}
		}
	}

	/// Applies an unsigned policy update to one direction of a known channel.
	pub fn update_channel(&self, update: &ChannelUpdate) -> Result<(), RouterError> {
		let mut channels = self.channels.write().unwrap();
		let chan = match channels.get_mut(&update.short_channel_id) {
			Some(chan) => chan,
			None => return Err(RouterError {
				kind: RouterErrorKind::GraphIo,
				err: format!("couldn't find channel {} for update", update.short_channel_id),
			}),
		};

		let direction = update.flags & 1;
		let destination = if direction == 0 { chan.node_two } else { chan.node_one };
		let policy = EdgePolicy {
			short_channel_id: update.short_channel_id,
			node: destination,
			fees: update.fees,
			cltv_expiry_delta: update.cltv_expiry_delta,
			htlc_minimum_msat: update.htlc_minimum_msat,
			enabled: update.flags & 2 == 0,
			direction,
		};
		if direction == 0 {
			chan.one_to_two = Some(policy);
		} else {
			chan.two_to_one = Some(policy);
		}
		Ok(())
	}
}

impl Default for NetworkGraph {
	fn default() -> Self {
		Self::new()
	}
}

impl<'a> ReadOnlyNetworkGraph<'a> {
	/// Returns all known valid channels
	pub fn channels(&self) -> &BTreeMap<u64, ChannelInfo> {
		&*self.channels
	}

	/// Returns information on a channel with the given id.
	pub fn channel(&self, short_channel_id: u64) -> Option<&ChannelInfo> {
		self.channels.get(&short_channel_id)
	}

	/// Returns all known nodes
	pub fn nodes(&self) -> &BTreeMap<NodeId, NodeInfo> {
		&*self.nodes
	}

	/// Returns information on a node with the given id.
	pub fn node(&self, node_id: &NodeId) -> Option<&NodeInfo> {
		self.nodes.get(node_id)
	}
}
