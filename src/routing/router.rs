// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

//! The top-level routing logic lives here.
//!
//! [`find_paths`] turns a [`NetworkGraph`], a payer, a payee, an amount and a fee budget into up
//! to K candidate paths, optionally forced through pegged waypoints. [`new_route`] turns the
//! winning path into a [`Route`] carrying the per-hop amounts and expiries an onion packet needs.
//!
//! The single-path search underneath runs *backwards*, from the payee towards the payer: each
//! node's forwarding fee depends on the amount it must forward, which is only known once all the
//! fees downstream of it are settled. Walking payee-to-payer makes that amount available exactly
//! when a candidate predecessor is considered, and lets bandwidth checks use the true amount that
//! would cross each edge.

use crate::routing::graph::{EdgeLocator, EdgePolicy, NetworkGraph, NodeId, ReadOnlyNetworkGraph, RoutingFees};
use crate::util::logger::Logger;

use core::cmp;
use core::fmt;
use core::ops::Deref;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// The maximum number of hops that is permissible in a route. Any potential path found above
/// this limit is rejected: the fixed-size onion packet downstream cannot encode more.
pub const HOP_LIMIT: usize = 20;

/// Controls the influence of the time lock delta of a channel on route selection. It is
/// expressed as billionths of msat per msat sent through the channel per time lock delta block.
/// See [`edge_weight`] for how it is applied.
pub const RISK_FACTOR_BILLIONTHS: u64 = 15;

/// The maximum fee, in millisatoshi, a payment could ever be charged. Passing this as a fee
/// limit signals that there is no fee limit.
pub const NO_FEE_LIMIT: u64 = u32::MAX as u64;

/// The starting distance of every node in the shortest path search.
pub const INFINITY: u64 = (1 << 63) - 1;

/// The kinds of failure the router reports. Callers match on the kind; the message that
/// accompanies it in [`RouterError`] is free-form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouterErrorKind {
	/// The search exhausted the target's connected component without reaching the source.
	NoPathFound,
	/// The cheapest stitched path exceeds the caller's fee limit.
	NoRouteFound,
	/// The shortest path spans more than [`HOP_LIMIT`] hops and no alternative below the limit
	/// exists.
	MaxHopsExceeded,
	/// The finished route's total fee exceeds the caller's fee limit.
	FeeLimitExceeded,
	/// A pegged hop names the source, or a channel the graph does not contain.
	PegNotInNetwork,
	/// A route cannot be built from an empty hop list.
	NoRouteHopsProvided,
	/// An underlying graph lookup failed.
	GraphIo,
}

/// An Err type for failures the router can produce, carrying a [`RouterErrorKind`] callers can
/// match on and a human-readable message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouterError {
	/// What failed.
	pub kind: RouterErrorKind,
	/// A human-readable message describing the error
	pub err: String,
}

impl fmt::Display for RouterError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.err)
	}
}

impl std::error::Error for RouterError {}

/// A routing hint for a channel not present in the graph, typically a private channel into the
/// destination taken from an invoice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HopHint {
	/// The node at the start of the hinted channel.
	pub src_node_id: NodeId,
	/// The unique identifier of the hinted channel.
	pub short_channel_id: u64,
	/// The fees `src_node_id` charges for forwarding over the hinted channel.
	pub fees: RoutingFees,
	/// The CLTV delta `src_node_id` reserves when forwarding over the hinted channel.
	pub cltv_expiry_delta: u16,
}

impl HopHint {
	/// Materializes the hint as the additional edge the search consumes, leading to the given
	/// `destination`. Collect these per source node into
	/// [`GraphParams::additional_edges`].
	pub fn edge_policy(&self, destination: NodeId) -> EdgePolicy {
		EdgePolicy {
			short_channel_id: self.short_channel_id,
			node: destination,
			fees: self.fees,
			cltv_expiry_delta: self.cltv_expiry_delta,
			htlc_minimum_msat: 0,
			enabled: true,
			direction: 0,
		}
	}
}

/// A waypoint the route must pass through, in order. With `short_channel_id == 0` any channel
/// into `node_id` may be used; otherwise the route must enter `node_id` over exactly that
/// channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HopPeg {
	/// The node the route must traverse.
	pub node_id: NodeId,
	/// The channel the route must enter `node_id` through, or 0 for any.
	pub short_channel_id: u64,
}

/// The graph and graph-adjacent inputs of a single-path search.
pub struct GraphParams<'a> {
	/// The read-only view of the graph the search runs against.
	pub graph: &'a ReadOnlyNetworkGraph<'a>,
	/// Edges to consider that are not in the graph, keyed by their source node. See
	/// [`HopHint::edge_policy`].
	pub additional_edges: Option<&'a HashMap<NodeId, Vec<EdgePolicy>>>,
	/// Caller-supplied, per-channel overrides of the capacities found in the graph, typically
	/// the live sending bandwidth of the caller's own channels.
	pub bandwidth_hints: Option<&'a HashMap<u64, u64>>,
	/// The true originator of the payment when it differs from the search's source node, as it
	/// does for the later segments of a pegged route. Only the origin's own edges are exempt
	/// from fees and the disabled check. Defaults to the source.
	pub origin: Option<NodeId>,
}

/// The restrictions a found path must adhere to.
pub struct RestrictParams {
	/// Nodes the search must not traverse.
	pub ignored_nodes: HashSet<NodeId>,
	/// Directed edges the search must not traverse.
	pub ignored_edges: HashSet<EdgeLocator>,
	/// The maximum total fee, in millisatoshi, the path may accumulate.
	pub fee_limit_msat: u64,
	/// The channel the first hop out of the origin must use, if restricted.
	pub outgoing_channel_id: Option<u64>,
	/// Fail with [`RouterErrorKind::MaxHopsExceeded`] as soon as the shortest path exceeds
	/// [`HOP_LIMIT`], instead of searching the next-shortest paths for an alternative below the
	/// limit.
	pub stop_at_max_hops_exceeded: bool,
}

impl Default for RestrictParams {
	fn default() -> Self {
		RestrictParams {
			ignored_nodes: HashSet::new(),
			ignored_edges: HashSet::new(),
			fee_limit_msat: NO_FEE_LIMIT,
			outgoing_channel_id: None,
			stop_at_max_hops_exceeded: false,
		}
	}
}

/// Computes the fee to forward an HTLC of `amount_msat` over a channel with the given fee
/// schedule. Integer arithmetic with truncating division.
pub fn compute_fee(amount_msat: u64, fees: RoutingFees) -> u64 {
	fees.base_msat as u64 + (amount_msat as u128 * fees.proportional_millionths as u128 / 1_000_000) as u64
}

/// Computes the weight of an edge in the shortest path search: the fee itself plus a time lock
/// penalty. The penalty is controlled by [`RISK_FACTOR_BILLIONTHS`] and scales proportionally
/// with the amount locked in the HTLC and the blocks it is locked for, so channels with shorter
/// time lock deltas and shorter routes in general are preferred.
pub fn edge_weight(locked_amount_msat: u64, fee_msat: u64, cltv_expiry_delta: u16) -> u64 {
	let time_lock_penalty = (locked_amount_msat as u128 * cltv_expiry_delta as u128
		* RISK_FACTOR_BILLIONTHS as u128 / 1_000_000_000) as u64;
	fee_msat + time_lock_penalty
}

/// Total fee of sending `amount_msat` over the given forward-ordered edge list, by the same
/// backward walk route construction performs. The first edge carries no fee: its tail is the
/// sender.
pub(crate) fn compute_path_fee(amount_msat: u64, path_edges: &[EdgePolicy]) -> u64 {
	if path_edges.is_empty() {
		return 0;
	}
	let mut next_incoming_amount = 0;
	for i in (0..path_edges.len()).rev() {
		let mut amt_to_forward = amount_msat;
		let mut fee = 0;
		if i != path_edges.len() - 1 {
			amt_to_forward = next_incoming_amount;
			fee = compute_fee(amt_to_forward, path_edges[i + 1].fees);
		}
		next_incoming_amount = amt_to_forward + fee;
	}
	next_incoming_amount - amount_msat
}

/// True if both paths travel through the exact same channels, in the same order.
fn is_same_path(path_a: &[EdgePolicy], path_b: &[EdgePolicy]) -> bool {
	if path_a.len() != path_b.len() {
		return false;
	}
	path_a.iter().zip(path_b.iter()).all(|(a, b)| a.short_channel_id == b.short_channel_id)
}

/// The self-edge prepended to a path so that the i-th entry of a source-rooted path leads to its
/// i-th node. Must never reach fee or bandwidth logic and is stripped before paths leave the
/// crate.
fn self_edge(node: &NodeId) -> EdgePolicy {
	EdgePolicy {
		short_channel_id: 0,
		node: *node,
		fees: RoutingFees { base_msat: 0, proportional_millionths: 0 },
		cltv_expiry_delta: 0,
		htlc_minimum_msat: 0,
		enabled: true,
		direction: 0,
	}
}

/// An entry of the search frontier: a node and the tentative cost and amount state it was pushed
/// with. Ordered as a min-heap on distance, ties resolving in insertion order.
#[derive(Clone, PartialEq, Eq)]
struct DistanceNode {
	dist: u64,
	seq: u64,
	node: NodeId,
	amount_to_receive: u64,
}

impl cmp::Ord for DistanceNode {
	fn cmp(&self, other: &DistanceNode) -> cmp::Ordering {
		other.dist.cmp(&self.dist).then_with(|| other.seq.cmp(&self.seq))
	}
}

impl cmp::PartialOrd for DistanceNode {
	fn partial_cmp(&self, other: &DistanceNode) -> Option<cmp::Ordering> {
		Some(self.cmp(other))
	}
}

/// A candidate path in the K-shortest-paths walk and the segment stitcher. Ordered as a
/// min-heap on hop count, ties resolving in insertion order.
#[derive(Clone, PartialEq, Eq)]
struct CandidatePath {
	hops: Vec<EdgePolicy>,
	seq: u64,
}

impl cmp::Ord for CandidatePath {
	fn cmp(&self, other: &CandidatePath) -> cmp::Ordering {
		other.hops.len().cmp(&self.hops.len()).then_with(|| other.seq.cmp(&self.seq))
	}
}

impl cmp::PartialOrd for CandidatePath {
	fn partial_cmp(&self, other: &CandidatePath) -> Option<cmp::Ordering> {
		Some(self.cmp(other))
	}
}

/// The per-node state the search tracks: the tentative cumulative weight to the target, the
/// amount the node must receive to satisfy all fees downstream of it, and the fee it charges
/// along the best known path.
#[derive(Clone, Copy)]
struct NodeState {
	dist: u64,
	amount_to_receive: u64,
	fee: u64,
}

/// Runs the backward shortest path walk and reconstructs the forward edge list without
/// enforcing the hop limit. Callers inspect the length: [`find_path`] enforces the limit and
/// retries, the K-shortest-paths walk consumes oversize results to seed further deviations.
fn find_path_inner<L: Deref>(
	g: &GraphParams, r: &RestrictParams, source: &NodeId, target: &NodeId, amount_msat: u64,
	logger: &L,
) -> Result<Vec<EdgePolicy>, RouterError> where L::Target: Logger {
	let origin = g.origin.unwrap_or(*source);

	// Reverse lookup of the caller's additional edges. Needed because the search takes place
	// from target to source.
	let mut additional_edges_by_dest: HashMap<NodeId, Vec<(NodeId, &EdgePolicy)>> = HashMap::new();
	if let Some(additional_edges) = g.additional_edges {
		for (src_node, edges) in additional_edges.iter() {
			for edge in edges.iter() {
				additional_edges_by_dest.entry(edge.node).or_insert_with(Vec::new).push((*src_node, edge));
			}
		}
	}

	let mut dist: HashMap<NodeId, NodeState> = HashMap::new();
	let mut next: HashMap<NodeId, EdgePolicy> = HashMap::new();
	let mut node_heap: BinaryHeap<DistanceNode> = BinaryHeap::new();
	let mut heap_seq = 0u64;

	// The traversal starts at the target, which charges no fee and must receive the payment
	// amount itself.
	dist.insert(*target, NodeState { dist: 0, amount_to_receive: amount_msat, fee: 0 });
	node_heap.push(DistanceNode { dist: 0, seq: heap_seq, node: *target, amount_to_receive: amount_msat });
	heap_seq += 1;

	// Relaxes the edge from `from` into `to`, recording `from`'s new distance, amount and next
	// hop if the edge satisfies every requirement and improves on the best known distance.
	macro_rules! relax {
		($from: expr, $edge: expr, $bandwidth: expr, $to: expr) => { 'relax: {
			let from: NodeId = $from;
			let edge: &EdgePolicy = $edge;
			let bandwidth: u64 = $bandwidth;
			let to: NodeId = $to;

			// The origin initiates rather than forwards: its edges charge no fee, add no time
			// lock, and may be disabled without the far end ever learning of the attempt.
			let is_origin_edge = from == origin;
			if !is_origin_edge && !edge.enabled {
				break 'relax;
			}
			if is_origin_edge {
				if let Some(chan) = r.outgoing_channel_id {
					if chan != edge.short_channel_id {
						break 'relax;
					}
				}
			}
			if r.ignored_nodes.contains(&from) {
				break 'relax;
			}
			if r.ignored_edges.contains(&EdgeLocator::from_edge(edge)) {
				break 'relax;
			}

			let to_state = match dist.get(&to) {
				Some(state) => *state,
				None => break 'relax,
			};
			let amount_to_send = to_state.amount_to_receive;
			if bandwidth < amount_to_send {
				break 'relax;
			}
			if amount_to_send < edge.htlc_minimum_msat {
				break 'relax;
			}

			let (fee, cltv_expiry_delta) = if is_origin_edge {
				(0, 0)
			} else {
				(compute_fee(amount_to_send, edge.fees), edge.cltv_expiry_delta)
			};

			// Whoever precedes `from` must hand it the amount it forwards plus its fee.
			let amount_to_receive = amount_to_send + fee;
			if amount_to_receive - amount_msat > r.fee_limit_msat {
				break 'relax;
			}

			let weight = edge_weight(amount_to_receive, fee, cltv_expiry_delta);
			let tentative_dist = to_state.dist + weight;
			if tentative_dist >= dist.get(&from).map_or(INFINITY, |state| state.dist) {
				break 'relax;
			}

			// An edge granting its owner no time lock grace at all leaves the HTLC
			// unforwardable.
			if edge.cltv_expiry_delta == 0 && !is_origin_edge {
				break 'relax;
			}

			dist.insert(from, NodeState { dist: tentative_dist, amount_to_receive, fee });
			next.insert(from, edge.clone());
			node_heap.push(DistanceNode { dist: tentative_dist, seq: heap_seq, node: from, amount_to_receive });
			heap_seq += 1;
		} }
	}

	while let Some(partial_path) = node_heap.pop() {
		// Reaching the source ends the walk: every remaining frontier entry is at least as far
		// from the target.
		if partial_path.node == *source {
			break;
		}
		let pivot = partial_path.node;

		if let Some(node_info) = g.graph.node(&pivot) {
			for short_channel_id in node_info.channels.iter() {
				let chan = match g.graph.channel(*short_channel_id) {
					Some(chan) => chan,
					None => return Err(RouterError {
						kind: RouterErrorKind::GraphIo,
						err: format!("node {} references unknown channel {}", pivot, short_channel_id),
					}),
				};
				// Searching backwards, only the policy pointing at the pivot matters: its owner
				// is a candidate predecessor in the route.
				let in_edge = match chan.policy_towards(&pivot) {
					Some(edge) => edge,
					None => continue,
				};
				let from = match chan.other_node(&pivot) {
					Some(node) => *node,
					None => continue,
				};
				let bandwidth = g.bandwidth_hints
					.and_then(|hints| hints.get(short_channel_id))
					.copied()
					.unwrap_or(chan.capacity_msat);
				relax!(from, in_edge, bandwidth, pivot);
			}
		}

		// Hinted edges were presumably supplied because they can carry the payment, so the
		// amount that must cross them bounds their bandwidth.
		if let Some(reverse_edges) = additional_edges_by_dest.get(&pivot) {
			for (from, edge) in reverse_edges.iter() {
				relax!(*from, *edge, partial_path.amount_to_receive, pivot);
			}
		}
	}

	// If the source never made it into the next hop map the graph offers no way to reach the
	// target from it under the given restrictions.
	if !next.contains_key(source) {
		return Err(RouterError {
			kind: RouterErrorKind::NoPathFound,
			err: "unable to find a path to destination".to_owned(),
		});
	}
	if let Some(state) = dist.get(source) {
		log_trace!(logger, "path from {} to {} found requiring {} msat to send ({} msat in fees, {} msat at the first hop)",
			source, target, state.amount_to_receive, state.amount_to_receive - amount_msat, state.fee);
	}

	// Unravel the forward path by following the next hop pointers from the source.
	let mut path_edges = Vec::new();
	let mut current_node = *source;
	while current_node != *target {
		let edge = match next.get(&current_node) {
			Some(edge) => edge.clone(),
			None => return Err(RouterError {
				kind: RouterErrorKind::NoPathFound,
				err: format!("next hop pointers end at {} before reaching the target", current_node),
			}),
		};
		current_node = edge.node;
		path_edges.push(edge);
	}

	Ok(path_edges)
}

/// Attempts to find a path from `source` to `target` capable of carrying `amount_msat` after
/// fees, as a forward-ordered list of the edges to traverse.
///
/// The search is a modified Dijkstra's over a weight combining each edge's fee with a time lock
/// penalty (see [`edge_weight`]), run backwards from the target so fees and bandwidth are
/// checked against the exact amount each edge must carry. If the shortest path exceeds
/// [`HOP_LIMIT`] and [`RestrictParams::stop_at_max_hops_exceeded`] is unset, one alternative
/// below the limit is searched for among the next-shortest paths before giving up.
pub fn find_path<L: Deref>(
	g: &GraphParams, r: &RestrictParams, source: &NodeId, target: &NodeId, amount_msat: u64,
	logger: L,
) -> Result<Vec<EdgePolicy>, RouterError> where L::Target: Logger {
	let path_edges = find_path_inner(g, r, source, target, amount_msat, &logger)?;
	if path_edges.len() <= HOP_LIMIT {
		return Ok(path_edges);
	}
	if r.stop_at_max_hops_exceeded {
		return Err(RouterError {
			kind: RouterErrorKind::MaxHopsExceeded,
			err: "potential path has too many hops".to_owned(),
		});
	}

	log_warn!(logger, "shortest path from {} to {} spans {} hops, looking for an alternative below the limit",
		source, target, path_edges.len());

	// Another attempt through the next-shortest paths may turn up a route which pays more fees
	// but stays under the hop limit.
	let k_paths = match find_k_paths(g, r, source, target, amount_msat, &path_edges, 1, &logger) {
		Ok(paths) => paths,
		Err(_) => Vec::new(),
	};
	let sentinel_stripped = g.origin.map_or(false, |origin| origin != *source);
	match k_paths.into_iter().next() {
		Some(mut path) => {
			if !sentinel_stripped {
				path.remove(0);
			}
			log_debug!(logger, "alternative path from {} to {} with {} hops found", source, target, path.len());
			Ok(path)
		},
		None => Err(RouterError {
			kind: RouterErrorKind::MaxHopsExceeded,
			err: "shortest path has too many hops and no alternate path was found".to_owned(),
		}),
	}
}

/// Produces up to `num_paths` loop-free paths from `source` to `target` in non-decreasing order
/// of hop count, the supplied `starting_path` among them, by deviating from each confirmed path
/// at every possible spur node.
///
/// Rather than removing edges and vertices from the graph as the classical deviation algorithm
/// does, each spur search runs with ignore sets extending the caller's, which keeps the graph
/// immutable and shareable. Returned paths keep a leading self-edge out of `source` unless the
/// search ran for a stitched segment beyond the route's true origin.
pub(crate) fn find_k_paths<L: Deref>(
	g: &GraphParams, r: &RestrictParams, source: &NodeId, target: &NodeId, amount_msat: u64,
	starting_path: &[EdgePolicy], num_paths: u32, logger: &L,
) -> Result<Vec<Vec<EdgePolicy>>, RouterError> where L::Target: Logger {
	let mut shortest_paths: Vec<Vec<EdgePolicy>> = Vec::new();
	let mut candidate_paths: BinaryHeap<CandidatePath> = BinaryHeap::new();
	let mut candidate_seq = 0u64;
	let mut valid_paths = 0u32;

	// The self-edge aligns indexing: entry i of a source-rooted path leads to the path's i-th
	// node, the source itself being node zero.
	let mut first_path = Vec::with_capacity(starting_path.len() + 1);
	first_path.push(self_edge(source));
	first_path.extend_from_slice(starting_path);
	if first_path.len() <= HOP_LIMIT + 1 {
		valid_paths += 1;
	}
	shortest_paths.push(first_path);

	let mut k = 1;
	while valid_paths < num_paths {
		let prev_shortest = &shortest_paths[k - 1];

		for i in 0..prev_shortest.len().saturating_sub(1) {
			let spur_node = prev_shortest[i].node;
			let root_path = &prev_shortest[..i + 1];

			// Forbid the edge each confirmed path sharing this prefix continues with, so the
			// spur search cannot re-derive a path we already have.
			let mut ignored_edges = r.ignored_edges.clone();
			for path in shortest_paths.iter() {
				if path.len() > i + 1 && is_same_path(root_path, &path[..i + 1]) {
					ignored_edges.insert(EdgeLocator::from_edge(&path[i + 1]));
				}
			}

			// Forbid every node of the prefix but the spur node itself, so the continuation
			// cannot loop back through it.
			let mut ignored_nodes = HashSet::new();
			for hop in root_path.iter() {
				if hop.node != spur_node {
					ignored_nodes.insert(hop.node);
				}
			}

			let spur_restrictions = RestrictParams {
				ignored_nodes,
				ignored_edges,
				fee_limit_msat: r.fee_limit_msat,
				outgoing_channel_id: None,
				stop_at_max_hops_exceeded: true,
			};
			let spur_path = match find_path_inner(g, &spur_restrictions, &spur_node, target, amount_msat, logger) {
				Ok(path) => path,
				Err(err) if err.kind == RouterErrorKind::NoPathFound => continue,
				Err(err) => return Err(err),
			};

			let new_path_len = root_path.len() + spur_path.len();
			if new_path_len > HOP_LIMIT + 1 && valid_paths > 0 {
				// Once deviations only produce over-limit paths while a valid one is already in
				// hand, exploring further spur nodes merely burns cycles.
				break;
			}

			let mut hops = Vec::with_capacity(new_path_len);
			hops.extend_from_slice(root_path);
			hops.extend(spur_path);
			candidate_paths.push(CandidatePath { hops, seq: candidate_seq });
			candidate_seq += 1;
		}

		match candidate_paths.pop() {
			Some(candidate) => {
				if candidate.hops.len() <= HOP_LIMIT + 1 {
					valid_paths += 1;
				}
				shortest_paths.push(candidate.hops);
			},
			None => break,
		}
		k += 1;
	}

	// Paths above the hop limit only existed to seed deviations.
	shortest_paths.retain(|path| path.len() <= HOP_LIMIT + 1);

	// A segment beyond the route's true origin has no business starting with a self-edge; the
	// stitcher concatenates it after other segments.
	if let Some(origin) = g.origin {
		if origin != *source {
			for path in shortest_paths.iter_mut() {
				path.remove(0);
			}
		}
	}

	Ok(shortest_paths)
}

/// Expands the peg list so every channel-pegged entry is preceded by a peg for the channel's
/// far endpoint, deduplicating pegs made redundant by the insertion. The first entry is the
/// source: it has no predecessor, so it cannot be channel-pegged.
pub(crate) fn prepare_pegs(view: &ReadOnlyNetworkGraph, pegs: &[HopPeg]) -> Result<Vec<HopPeg>, RouterError> {
	let mut expanded = Vec::with_capacity(pegs.len());
	for (i, peg) in pegs.iter().enumerate() {
		if peg.short_channel_id != 0 {
			if i == 0 {
				return Err(RouterError {
					kind: RouterErrorKind::PegNotInNetwork,
					err: "the source cannot be entered through a pegged channel".to_owned(),
				});
			}
			let chan = match view.channel(peg.short_channel_id) {
				Some(chan) => chan,
				None => return Err(RouterError {
					kind: RouterErrorKind::PegNotInNetwork,
					err: format!("pegged channel {} not found in the graph", peg.short_channel_id),
				}),
			};
			let prev_node = match chan.other_node(&peg.node_id) {
				Some(node) => *node,
				None => return Err(RouterError {
					kind: RouterErrorKind::PegNotInNetwork,
					err: format!("pegged channel {} does not lead to node {}", peg.short_channel_id, peg.node_id),
				}),
			};
			expanded.push(HopPeg { node_id: prev_node, short_channel_id: 0 });
		}
		expanded.push(*peg);
	}

	if expanded.len() < 2 {
		return Ok(expanded);
	}

	// An inserted predecessor may duplicate a peg the caller already placed right before it.
	let mut out = Vec::with_capacity(expanded.len());
	for (i, peg) in expanded.iter().enumerate() {
		if peg.short_channel_id == 0 && i > 0 && peg.node_id == expanded[i - 1].node_id {
			continue;
		}
		out.push(*peg);
	}
	Ok(out)
}

/// Finds up to `num_paths` loop-free paths from `source` to `target` able to carry
/// `amount_msat` within `fee_limit_msat` of fees, each a forward-ordered edge list ready for
/// [`new_route`]. Paths are returned in non-decreasing order of hop count.
///
/// The route is computed in segments, from the source to the first peg, to the second peg, and
/// so on until the target, and the segments stitched together into end-to-end candidates; with
/// no pegs there is a single segment. Later segments may not reuse earlier segments' edges.
/// Only the true source's own edges are exempt from fees and the disabled check: pegged
/// waypoints forward like any other node. Diversification replaces one non-channel-pegged
/// segment at a time with its next-shortest alternatives, each granted the fee headroom left
/// once every other segment is priced at its cheapest.
pub fn find_paths<L: Deref>(
	graph: &NetworkGraph, source: &NodeId, target: &NodeId, amount_msat: u64,
	fee_limit_msat: u64, num_paths: u32, bandwidth_hints: Option<&HashMap<u64, u64>>,
	additional_pegs: &[HopPeg], logger: L,
) -> Result<Vec<Vec<EdgePolicy>>, RouterError> where L::Target: Logger {
	let view = graph.read_only();
	let logger_ref = &*logger;
	let origin = *source;

	// The source and the destination bound the peg list as pegs of their own.
	let mut pegs = Vec::with_capacity(additional_pegs.len() + 2);
	pegs.push(HopPeg { node_id: *source, short_channel_id: 0 });
	pegs.extend_from_slice(additional_pegs);
	pegs.push(HopPeg { node_id: *target, short_channel_id: 0 });
	let pegs = prepare_pegs(&view, &pegs)?;

	struct SegmentParams {
		source: NodeId,
		target: NodeId,
		pegged: bool,
	}

	let mut ignored_edges: HashSet<EdgeLocator> = HashSet::new();
	let mut starting_path: Vec<EdgePolicy> = Vec::new();
	let mut segment_paths: Vec<Vec<EdgePolicy>> = Vec::new();
	let mut segment_params: Vec<SegmentParams> = Vec::with_capacity(pegs.len() - 1);

	for j in 1..pegs.len() {
		let peg = pegs[j];
		let prev_peg = pegs[j - 1];
		if view.node(&prev_peg.node_id).is_none() {
			return Err(RouterError {
				kind: RouterErrorKind::GraphIo,
				err: format!("node {} not found in the graph", prev_peg.node_id),
			});
		}

		let segment_path = if peg.short_channel_id == 0 {
			let graph_params = GraphParams {
				graph: &view,
				additional_edges: None,
				bandwidth_hints,
				origin: Some(origin),
			};
			let restrictions = RestrictParams {
				ignored_nodes: HashSet::new(),
				ignored_edges: ignored_edges.clone(),
				fee_limit_msat,
				outgoing_channel_id: None,
				stop_at_max_hops_exceeded: false,
			};
			match find_path(&graph_params, &restrictions, &prev_peg.node_id, &peg.node_id, amount_msat, logger_ref) {
				Ok(path) => path,
				Err(err) => {
					log_error!(logger, "unable to find a path from {} to {}: {}", prev_peg.node_id, peg.node_id, err);
					return Err(err);
				},
			}
		} else {
			// The segment is fixed: exactly the pegged channel, entering the peg.
			let chan = match view.channel(peg.short_channel_id) {
				Some(chan) => chan,
				None => return Err(RouterError {
					kind: RouterErrorKind::PegNotInNetwork,
					err: format!("pegged channel {} not found in the graph", peg.short_channel_id),
				}),
			};
			let policy = match chan.policy_towards(&peg.node_id) {
				Some(policy) => policy.clone(),
				None => return Err(RouterError {
					kind: RouterErrorKind::PegNotInNetwork,
					err: format!("pegged channel {} has no policy towards {}", peg.short_channel_id, peg.node_id),
				}),
			};
			vec![policy]
		};

		// Later segments must not traverse this segment's edges again.
		for edge in segment_path.iter() {
			ignored_edges.insert(EdgeLocator::from_edge(edge));
		}
		starting_path.extend_from_slice(&segment_path);
		segment_paths.push(segment_path);
		segment_params.push(SegmentParams {
			source: prev_peg.node_id,
			target: peg.node_id,
			pegged: peg.short_channel_id != 0,
		});
	}

	let starting_path_fee = compute_path_fee(amount_msat, &starting_path);
	if starting_path_fee > fee_limit_msat {
		log_error!(logger, "shortest stitched path fee of {} msat exceeds the fee limit of {} msat",
			starting_path_fee, fee_limit_msat);
		return Err(RouterError {
			kind: RouterErrorKind::NoRouteFound,
			err: "shortest path exceeds fee limit".to_owned(),
		});
	}

	let mut candidate_paths: BinaryHeap<CandidatePath> = BinaryHeap::new();
	let mut candidate_seq = 0u64;

	// For each segment, gather up to num_paths - 1 alternatives and stitch each one between the
	// other segments' shortest paths to form an end-to-end candidate. This does not necessarily
	// yield the overall shortest set of paths; it is a complexity compromise.
	for i in 0..segment_paths.len() {
		// No alternatives exist for a segment fixed to a pegged channel.
		if segment_params[i].pegged {
			continue;
		}

		// The alternative may spend whatever fee headroom remains once every other segment is
		// priced at its base cost.
		let segment_fee_limit = if fee_limit_msat != NO_FEE_LIMIT {
			let segment_fee = compute_path_fee(amount_msat, &segment_paths[i]);
			fee_limit_msat - starting_path_fee + segment_fee
		} else {
			NO_FEE_LIMIT
		};

		// This segment's own edges are fair game for its alternatives.
		let mut segment_ignored_edges = ignored_edges.clone();
		for edge in segment_paths[i].iter() {
			segment_ignored_edges.remove(&EdgeLocator::from_edge(edge));
		}

		let graph_params = GraphParams {
			graph: &view,
			additional_edges: None,
			bandwidth_hints,
			origin: Some(origin),
		};
		let restrictions = RestrictParams {
			ignored_nodes: HashSet::new(),
			ignored_edges: segment_ignored_edges,
			fee_limit_msat: segment_fee_limit,
			outgoing_channel_id: None,
			stop_at_max_hops_exceeded: false,
		};
		let segment_k_paths = find_k_paths(
			&graph_params, &restrictions, &segment_params[i].source, &segment_params[i].target,
			amount_msat, &segment_paths[i], num_paths, &logger_ref,
		)?;

		for (j, segment_k_path) in segment_k_paths.into_iter().enumerate() {
			// The shortest end-to-end path is a candidate exactly once, contributed while
			// processing the first segment.
			if i != 0 && j == 0 {
				continue;
			}
			// The first segment's shortest path comes back with the self-edge attached; adopt
			// that form so every stitched candidate is rooted the same way.
			if i == 0 && j == 0 {
				segment_paths[0] = segment_k_path.clone();
			}

			let mut stitched_path: Vec<EdgePolicy> = Vec::new();
			for (seg_index, segment) in segment_paths.iter().enumerate() {
				if seg_index == i {
					stitched_path.extend_from_slice(&segment_k_path);
				} else {
					stitched_path.extend_from_slice(segment);
				}
			}

			// Fee limits were already enforced per segment; length remains to be checked. The
			// indexing self-edge possibly rooting the path is not a hop.
			let self_edge_count = if stitched_path.first().map_or(false, |edge| edge.short_channel_id == 0) { 1 } else { 0 };
			if stitched_path.len() - self_edge_count > HOP_LIMIT {
				continue;
			}
			candidate_paths.push(CandidatePath { hops: stitched_path, seq: candidate_seq });
			candidate_seq += 1;
		}
	}

	let mut shortest_paths: Vec<Vec<EdgePolicy>> = Vec::new();
	for _ in 0..num_paths {
		match candidate_paths.pop() {
			Some(candidate) => {
				let mut hops = candidate.hops;
				if hops.first().map_or(false, |edge| edge.short_channel_id == 0) {
					hops.remove(0);
				}
				shortest_paths.push(hops);
			},
			None => break,
		}
	}

	log_info!(logger, "found {} path(s) from {} to {} for {} msat", shortest_paths.len(), source, target, amount_msat);
	Ok(shortest_paths)
}

/// An intermediate or final node of a route, and the values necessary to create the HTLC
/// handing the payment off to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hop {
	/// The node this hop leads to.
	pub pubkey: NodeId,
	/// The channel that should be used from the previous hop to reach this node.
	pub short_channel_id: u64,
	/// The timelock value that should be used when crafting the outgoing HTLC from this hop.
	pub outgoing_time_lock: u32,
	/// The amount this hop forwards to the next one, after deducting its fee.
	pub amt_to_forward_msat: u64,
}

/// The per-hop payload to be encoded for each HTLC within an onion packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HopPayload {
	/// The payload format; only the legacy realm 0 is produced.
	pub realm: u8,
	/// The amount the processing hop must forward.
	pub forward_amount_msat: u64,
	/// The outgoing CLTV value the processing hop must use.
	pub outgoing_cltv: u32,
	/// The id of the channel to forward over, big-endian, or all zeroes on the final hop.
	pub next_address: [u8; 8],
}

/// A path through the channel graph carrying a payment over one or more channels in
/// succession: everything needed to craft the onion packet and extend the first HTLC.
/// Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
	/// The cumulative time lock across the entire route: the CLTV value the HTLC extended to
	/// the first hop should carry. Every following hop decrements it by its advertised delta.
	pub total_time_lock: u32,
	/// The sum of the fees paid at each hop. Zero for a one-hop route: no one pays a fee to
	/// themselves.
	pub total_fees_msat: u64,
	/// The total amount required to complete the payment over this route, fees included: what
	/// the HTLC extended to the first hop must carry.
	pub total_amount_msat: u64,
	/// The node this route originates from.
	pub source_pubkey: NodeId,
	/// The forwarding details at each hop, in order.
	pub hops: Vec<Hop>,
	node_index: HashSet<NodeId>,
	chan_index: HashSet<u64>,
}

impl Route {
	/// Returns the fee charged by the hop at `hop_index`: the difference between what flows
	/// into it and what it forwards.
	pub fn hop_fee(&self, hop_index: usize) -> u64 {
		let incoming_amt = if hop_index == 0 {
			self.total_amount_msat
		} else {
			self.hops[hop_index - 1].amt_to_forward_msat
		};
		incoming_amt - self.hops[hop_index].amt_to_forward_msat
	}

	/// True if the given node is traversed by this route.
	pub fn contains_node(&self, node: &NodeId) -> bool {
		self.node_index.contains(node)
	}

	/// True if the given channel is traversed by this route.
	pub fn contains_channel(&self, short_channel_id: u64) -> bool {
		self.chan_index.contains(&short_channel_id)
	}

	/// Converts the route into the series of per-hop payloads to be encoded within each HTLC's
	/// onion packet. The final hop's next address is all zeroes, indicating no further hops.
	pub fn to_hop_payloads(&self) -> Vec<HopPayload> {
		self.hops.iter().enumerate().map(|(i, hop)| {
			let next_hop = if i == self.hops.len() - 1 { 0 } else { self.hops[i + 1].short_channel_id };
			HopPayload {
				realm: 0,
				forward_amount_msat: hop.amt_to_forward_msat,
				outgoing_cltv: hop.outgoing_time_lock,
				next_address: next_hop.to_be_bytes(),
			}
		}).collect()
	}
}

/// Returns a fully valid route over the given forward-ordered path capable of delivering
/// `amount_msat` to its final hop after all fees, walking the path backwards to back-fill each
/// hop's forward amount and outgoing expiry. Fails with
/// [`RouterErrorKind::FeeLimitExceeded`] if the accumulated fees pass `fee_limit_msat`.
pub fn new_route(
	amount_msat: u64, fee_limit_msat: u64, source_pubkey: NodeId, path_edges: &[EdgePolicy],
	current_height: u32, final_cltv_delta: u16,
) -> Result<Route, RouterError> {
	let mut hops: Vec<Hop> = Vec::with_capacity(path_edges.len());

	// The worst-case wait of the sender, accumulated hop by hop while walking backwards.
	let mut total_time_lock = current_height;

	// The amount that must flow into the hop following the one being processed; walking
	// backwards, that hop creeps towards the sender.
	let mut next_incoming_amount = 0u64;

	for i in (0..path_edges.len()).rev() {
		let edge = &path_edges[i];

		// The final hop receives the exact payment amount and charges nothing; every earlier
		// hop forwards its successor's incoming amount and charges its successor's policy fee
		// on it.
		let mut amt_to_forward = amount_msat;
		let mut fee = 0;
		if i != path_edges.len() - 1 {
			amt_to_forward = next_incoming_amount;
			fee = compute_fee(amt_to_forward, path_edges[i + 1].fees);
		}

		let outgoing_time_lock;
		if i == path_edges.len() - 1 {
			// The last hop's outgoing time lock is exactly the absolute timeout the recipient
			// expects in the HTLC.
			total_time_lock += final_cltv_delta as u32;
			outgoing_time_lock = current_height + final_cltv_delta as u32;
		} else {
			let delta = path_edges[i + 1].cltv_expiry_delta as u32;
			total_time_lock += delta;
			outgoing_time_lock = total_time_lock - delta;
		}

		hops.push(Hop {
			pubkey: edge.node,
			short_channel_id: edge.short_channel_id,
			outgoing_time_lock,
			amt_to_forward_msat: amt_to_forward,
		});

		next_incoming_amount = amt_to_forward + fee;
	}
	hops.reverse();

	let route = new_route_from_hops(next_incoming_amount, total_time_lock, source_pubkey, hops)?;

	if route.total_fees_msat > fee_limit_msat {
		return Err(RouterError {
			kind: RouterErrorKind::FeeLimitExceeded,
			err: format!("total route fees exceeded fee limit of {} msat", fee_limit_msat),
		});
	}

	Ok(route)
}

/// Creates a route from the minimally required information, for hand-assembled hop lists.
/// `amount_msat` is the total handed to the first hop and must cover the amount delivered to
/// the final hop; the difference is recorded as the route's total fee. The node and channel
/// membership indices are populated here, once.
pub fn new_route_from_hops(
	amount_msat: u64, total_time_lock: u32, source_pubkey: NodeId, hops: Vec<Hop>,
) -> Result<Route, RouterError> {
	if hops.is_empty() {
		return Err(RouterError {
			kind: RouterErrorKind::NoRouteHopsProvided,
			err: "a route requires at least one hop".to_owned(),
		});
	}

	let mut node_index = HashSet::with_capacity(hops.len());
	let mut chan_index = HashSet::with_capacity(hops.len());
	for hop in hops.iter() {
		node_index.insert(hop.pubkey);
		chan_index.insert(hop.short_channel_id);
	}

	Ok(Route {
		total_time_lock,
		total_fees_msat: amount_msat - hops.last().map(|hop| hop.amt_to_forward_msat).unwrap_or(0),
		total_amount_msat: amount_msat,
		source_pubkey,
		hops,
		node_index,
		chan_index,
	})
}

#[cfg(test)]
mod tests {
	use crate::routing::graph::{EdgePolicy, NetworkGraph};
	use crate::routing::router::{
		compute_fee, compute_path_fee, edge_weight, find_k_paths, find_path, find_paths,
		new_route, new_route_from_hops, prepare_pegs, GraphParams, HopHint, HopPeg,
		RestrictParams, RouterErrorKind, HOP_LIMIT, NO_FEE_LIMIT,
	};
	use crate::routing::test_utils::{
		add_bidirectional_channel, add_channel, build_graph, build_line_graph, fees, get_nodes,
		id, update_channel,
	};
	use crate::util::test_utils::TestLogger;

	use bitcoin::secp256k1::Secp256k1;

	use std::collections::HashMap;

	fn channels_of(path: &[EdgePolicy]) -> Vec<u64> {
		path.iter().map(|edge| edge.short_channel_id).collect()
	}

	#[test]
	fn fee_computation_truncates() {
		assert_eq!(compute_fee(100_000, fees(1000, 1000)), 1100);
		assert_eq!(compute_fee(999, fees(0, 1000)), 0);
		assert_eq!(compute_fee(1999, fees(10, 1000)), 11);
		// The intermediate product needs more than 64 bits here.
		assert_eq!(compute_fee(1 << 50, fees(0, 1_000_000)), 1 << 50);
	}

	#[test]
	fn edge_weight_penalizes_locked_time() {
		// 100_000 * 40 * 15 / 1e9 truncates to zero: the fee dominates.
		assert_eq!(edge_weight(100_000, 1100, 40), 1100);
		assert_eq!(edge_weight(1_000_000_000, 0, 40), 600);
		// The intermediate product exceeds 64 bits without a widened accumulator.
		let amount = 1u64 << 50;
		let expected = (amount as u128 * 65_535 * 15 / 1_000_000_000) as u64;
		assert_eq!(edge_weight(amount, 0, 65_535), expected);
	}

	#[test]
	fn single_hop_route() {
		let secp_ctx = Secp256k1::new();
		let (_, our_id, _, pubkeys) = get_nodes(&secp_ctx);
		let graph = NetworkGraph::new();
		add_channel(&graph, 42, &our_id, &pubkeys[0], 1_000_000);
		update_channel(&graph, 42, &our_id, false, 40, 1, fees(1000, 1));
		update_channel(&graph, 42, &pubkeys[0], false, 40, 1, fees(1000, 1));

		let logger = TestLogger::new();
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[0]), 100_000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap();
		assert_eq!(paths.len(), 1);
		assert_eq!(channels_of(&paths[0]), vec![42]);

		let route = new_route(100_000, NO_FEE_LIMIT, id(&our_id), &paths[0], 100, 9).unwrap();
		assert_eq!(route.hops.len(), 1);
		assert_eq!(route.hops[0].pubkey, id(&pubkeys[0]));
		assert_eq!(route.hops[0].short_channel_id, 42);
		assert_eq!(route.hops[0].amt_to_forward_msat, 100_000);
		assert_eq!(route.hops[0].outgoing_time_lock, 109);
		assert_eq!(route.total_amount_msat, 100_000);
		assert_eq!(route.total_fees_msat, 0);
		assert_eq!(route.total_time_lock, 109);
		assert_eq!(route.hop_fee(0), 0);
		assert!(route.contains_node(&id(&pubkeys[0])));
		assert!(!route.contains_node(&id(&pubkeys[1])));
		assert!(route.contains_channel(42));
		assert!(!route.contains_channel(43));
	}

	// Builds the two-hop graph of the fee scenarios: our_id -1- node0 -2- node1, where node0
	// charges 1000 msat plus 1000 ppm for forwarding over channel 2.
	fn two_hop_graph() -> (NetworkGraph, bitcoin::secp256k1::PublicKey, Vec<bitcoin::secp256k1::PublicKey>) {
		let secp_ctx = Secp256k1::new();
		let (_, our_id, _, pubkeys) = get_nodes(&secp_ctx);
		let graph = NetworkGraph::new();
		add_channel(&graph, 1, &our_id, &pubkeys[0], 10_000_000);
		update_channel(&graph, 1, &our_id, false, 144, 0, fees(0, 0));
		update_channel(&graph, 1, &pubkeys[0], false, 144, 0, fees(0, 0));
		add_channel(&graph, 2, &pubkeys[0], &pubkeys[1], 10_000_000);
		update_channel(&graph, 2, &pubkeys[0], false, 40, 0, fees(1000, 1000));
		update_channel(&graph, 2, &pubkeys[1], false, 40, 0, fees(0, 0));
		(graph, our_id, pubkeys)
	}

	#[test]
	fn two_hop_route_pays_forwarding_fee() {
		let (graph, our_id, pubkeys) = two_hop_graph();
		let logger = TestLogger::new();
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[1]), 100_000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap();
		assert_eq!(channels_of(&paths[0]), vec![1, 2]);
		assert_eq!(compute_path_fee(100_000, &paths[0]), 1100);

		let route = new_route(100_000, NO_FEE_LIMIT, id(&our_id), &paths[0], 1000, 9).unwrap();
		assert_eq!(route.hops.len(), 2);
		assert_eq!(route.hops[1].amt_to_forward_msat, 100_000);
		assert_eq!(route.hops[0].amt_to_forward_msat, 100_000);
		assert_eq!(route.total_fees_msat, 1100);
		assert_eq!(route.total_amount_msat, 101_100);
		// node0 keeps the fee: it flows in with the first HTLC and is not forwarded.
		assert_eq!(route.hop_fee(0), 1100);
		assert_eq!(route.hop_fee(1), 0);
		// The recipient expects height + final delta; node0 gets one delta of grace on top.
		assert_eq!(route.hops[1].outgoing_time_lock, 1009);
		assert_eq!(route.hops[0].outgoing_time_lock, 1009);
		assert_eq!(route.total_time_lock, 1049);
	}

	#[test]
	fn fee_limit_exceeded_building_route() {
		let (graph, our_id, pubkeys) = two_hop_graph();
		let logger = TestLogger::new();
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[1]), 100_000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap();

		let err = new_route(100_000, 500, id(&our_id), &paths[0], 1000, 9).unwrap_err();
		assert_eq!(err.kind, RouterErrorKind::FeeLimitExceeded);
	}

	#[test]
	fn fee_limit_prunes_search() {
		let (graph, our_id, pubkeys) = two_hop_graph();
		let logger = TestLogger::new();
		// With the limit below node0's fee no edge into the target survives relaxation.
		let err = find_paths(&graph, &id(&our_id), &id(&pubkeys[1]), 100_000, 500, 1, None, &[], &logger).unwrap_err();
		assert_eq!(err.kind, RouterErrorKind::NoPathFound);
	}

	#[test]
	fn hop_payloads_chain_channels() {
		let (graph, our_id, pubkeys) = two_hop_graph();
		let logger = TestLogger::new();
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[1]), 100_000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap();
		let route = new_route(100_000, NO_FEE_LIMIT, id(&our_id), &paths[0], 1000, 9).unwrap();

		let payloads = route.to_hop_payloads();
		assert_eq!(payloads.len(), 2);
		assert_eq!(payloads[0].realm, 0);
		assert_eq!(payloads[0].forward_amount_msat, route.hops[0].amt_to_forward_msat);
		assert_eq!(payloads[0].outgoing_cltv, route.hops[0].outgoing_time_lock);
		assert_eq!(payloads[0].next_address, 2u64.to_be_bytes());
		assert_eq!(payloads[1].next_address, [0; 8]);
	}

	#[test]
	fn route_from_hops_round_trips() {
		let (graph, our_id, pubkeys) = two_hop_graph();
		let logger = TestLogger::new();
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[1]), 100_000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap();
		let route = new_route(100_000, NO_FEE_LIMIT, id(&our_id), &paths[0], 1000, 9).unwrap();

		let rebuilt = new_route_from_hops(
			route.total_amount_msat, route.total_time_lock, route.source_pubkey, route.hops.clone(),
		).unwrap();
		assert_eq!(route, rebuilt);
	}

	#[test]
	fn route_from_no_hops_fails() {
		let secp_ctx = Secp256k1::new();
		let (_, our_id, _, _) = get_nodes(&secp_ctx);
		let err = new_route_from_hops(100_000, 500, id(&our_id), Vec::new()).unwrap_err();
		assert_eq!(err.kind, RouterErrorKind::NoRouteHopsProvided);
	}

	#[test]
	fn disabled_channels_are_avoided() {
		let secp_ctx = Secp256k1::new();
		let (_, our_id, _, pubkeys) = get_nodes(&secp_ctx);
		let graph = NetworkGraph::new();
		// Cheap two-hop path with its second leg disabled by node0.
		add_channel(&graph, 1, &our_id, &pubkeys[0], 10_000_000);
		update_channel(&graph, 1, &our_id, false, 40, 0, fees(0, 0));
		update_channel(&graph, 1, &pubkeys[0], false, 40, 0, fees(0, 0));
		add_channel(&graph, 2, &pubkeys[0], &pubkeys[2], 10_000_000);
		update_channel(&graph, 2, &pubkeys[0], true, 40, 0, fees(0, 0));
		update_channel(&graph, 2, &pubkeys[2], false, 40, 0, fees(0, 0));
		// Expensive but enabled alternative through node1.
		add_channel(&graph, 3, &our_id, &pubkeys[1], 10_000_000);
		update_channel(&graph, 3, &our_id, false, 40, 0, fees(0, 0));
		update_channel(&graph, 3, &pubkeys[1], false, 40, 0, fees(0, 0));
		add_channel(&graph, 4, &pubkeys[1], &pubkeys[2], 10_000_000);
		update_channel(&graph, 4, &pubkeys[1], false, 40, 0, fees(5000, 0));
		update_channel(&graph, 4, &pubkeys[2], false, 40, 0, fees(0, 0));

		let logger = TestLogger::new();
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[2]), 100_000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap();
		assert_eq!(channels_of(&paths[0]), vec![3, 4]);
	}

	#[test]
	fn disabled_first_hop_of_origin_is_usable() {
		let secp_ctx = Secp256k1::new();
		let (_, our_id, _, pubkeys) = get_nodes(&secp_ctx);
		let graph = NetworkGraph::new();
		// We disabled our own channel towards node0, but we are initiating, not forwarding.
		add_channel(&graph, 1, &our_id, &pubkeys[0], 10_000_000);
		update_channel(&graph, 1, &our_id, true, 40, 0, fees(0, 0));
		update_channel(&graph, 1, &pubkeys[0], false, 40, 0, fees(0, 0));
		add_channel(&graph, 2, &pubkeys[0], &pubkeys[2], 10_000_000);
		update_channel(&graph, 2, &pubkeys[0], false, 40, 0, fees(0, 0));
		update_channel(&graph, 2, &pubkeys[2], false, 40, 0, fees(0, 0));
		add_channel(&graph, 3, &our_id, &pubkeys[1], 10_000_000);
		update_channel(&graph, 3, &our_id, false, 40, 0, fees(0, 0));
		update_channel(&graph, 3, &pubkeys[1], false, 40, 0, fees(0, 0));
		add_channel(&graph, 4, &pubkeys[1], &pubkeys[2], 10_000_000);
		update_channel(&graph, 4, &pubkeys[1], false, 40, 0, fees(5000, 0));
		update_channel(&graph, 4, &pubkeys[2], false, 40, 0, fees(0, 0));

		let logger = TestLogger::new();
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[2]), 100_000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap();
		assert_eq!(channels_of(&paths[0]), vec![1, 2]);
	}

	#[test]
	fn htlc_minimum_boundary() {
		let secp_ctx = Secp256k1::new();
		let (_, our_id, _, pubkeys) = get_nodes(&secp_ctx);
		let graph = NetworkGraph::new();
		add_channel(&graph, 42, &our_id, &pubkeys[0], 10_000_000);
		update_channel(&graph, 42, &our_id, false, 40, 100_000, fees(0, 0));
		update_channel(&graph, 42, &pubkeys[0], false, 40, 100_000, fees(0, 0));

		let logger = TestLogger::new();
		assert!(find_paths(&graph, &id(&our_id), &id(&pubkeys[0]), 100_000, NO_FEE_LIMIT, 1, None, &[], &logger).is_ok());
		let err = find_paths(&graph, &id(&our_id), &id(&pubkeys[0]), 99_999, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap_err();
		assert_eq!(err.kind, RouterErrorKind::NoPathFound);
	}

	#[test]
	fn bandwidth_hint_boundary() {
		let secp_ctx = Secp256k1::new();
		let (_, our_id, _, pubkeys) = get_nodes(&secp_ctx);
		let graph = NetworkGraph::new();
		add_channel(&graph, 42, &our_id, &pubkeys[0], 10_000_000);
		update_channel(&graph, 42, &our_id, false, 40, 0, fees(0, 0));
		update_channel(&graph, 42, &pubkeys[0], false, 40, 0, fees(0, 0));

		let logger = TestLogger::new();
		let mut hints = HashMap::new();
		hints.insert(42, 100_000);
		assert!(find_paths(&graph, &id(&our_id), &id(&pubkeys[0]), 100_000, NO_FEE_LIMIT, 1, Some(&hints), &[], &logger).is_ok());

		hints.insert(42, 99_999);
		let err = find_paths(&graph, &id(&our_id), &id(&pubkeys[0]), 100_000, NO_FEE_LIMIT, 1, Some(&hints), &[], &logger).unwrap_err();
		assert_eq!(err.kind, RouterErrorKind::NoPathFound);
	}

	#[test]
	fn zero_cltv_delta_rejects_forwarding_policy() {
		let secp_ctx = Secp256k1::new();
		let (_, our_id, _, pubkeys) = get_nodes(&secp_ctx);
		let graph = NetworkGraph::new();
		add_channel(&graph, 1, &our_id, &pubkeys[0], 10_000_000);
		update_channel(&graph, 1, &our_id, false, 40, 0, fees(0, 0));
		update_channel(&graph, 1, &pubkeys[0], false, 40, 0, fees(0, 0));
		// node0 grants itself no grace window at all on the second leg.
		add_channel(&graph, 2, &pubkeys[0], &pubkeys[1], 10_000_000);
		update_channel(&graph, 2, &pubkeys[0], false, 0, 0, fees(0, 0));
		update_channel(&graph, 2, &pubkeys[1], false, 40, 0, fees(0, 0));

		let logger = TestLogger::new();
		let err = find_paths(&graph, &id(&our_id), &id(&pubkeys[1]), 100_000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap_err();
		assert_eq!(err.kind, RouterErrorKind::NoPathFound);
	}

	#[test]
	fn zero_cltv_delta_is_fine_at_the_origin() {
		let secp_ctx = Secp256k1::new();
		let (_, our_id, _, pubkeys) = get_nodes(&secp_ctx);
		let graph = NetworkGraph::new();
		add_channel(&graph, 1, &our_id, &pubkeys[0], 10_000_000);
		update_channel(&graph, 1, &our_id, false, 0, 0, fees(0, 0));
		update_channel(&graph, 1, &pubkeys[0], false, 0, 0, fees(0, 0));

		let logger = TestLogger::new();
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[0]), 100_000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap();
		assert_eq!(channels_of(&paths[0]), vec![1]);
	}

	#[test]
	fn zero_final_cltv_delta_expires_at_current_height() {
		let (graph, our_id, pubkeys) = two_hop_graph();
		let logger = TestLogger::new();
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[1]), 100_000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap();
		let route = new_route(100_000, NO_FEE_LIMIT, id(&our_id), &paths[0], 500, 0).unwrap();
		assert_eq!(route.hops.last().unwrap().outgoing_time_lock, 500);
	}

	#[test]
	fn k_shortest_paths_orders_by_hop_count() {
		let (graph, our_id, pubkeys) = build_graph();
		let logger = TestLogger::new();
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[6]), 100_000, NO_FEE_LIMIT, 3, None, &[], &logger).unwrap();
		assert_eq!(paths.len(), 3);
		assert_eq!(channels_of(&paths[0]), vec![1, 2]);
		assert_eq!(channels_of(&paths[1]), vec![3, 4, 5]);
		assert_eq!(channels_of(&paths[2]), vec![6, 7, 8, 9]);

		// Every path must stay loop-free in both nodes and channels.
		for path in paths.iter() {
			let mut nodes = std::collections::HashSet::new();
			let mut channels = std::collections::HashSet::new();
			for edge in path.iter() {
				assert!(nodes.insert(edge.node));
				assert!(channels.insert(edge.short_channel_id));
			}
		}
	}

	#[test]
	fn single_path_request_returns_shortest() {
		let (graph, our_id, pubkeys) = build_graph();
		let logger = TestLogger::new();
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[6]), 100_000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap();
		assert_eq!(paths.len(), 1);
		assert_eq!(channels_of(&paths[0]), vec![1, 2]);
	}

	#[test]
	fn four_hop_route_invariants() {
		let (graph, our_id, pubkeys) = build_graph();
		let logger = TestLogger::new();
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[6]), 100_000, NO_FEE_LIMIT, 3, None, &[], &logger).unwrap();
		let path = &paths[2];
		assert_eq!(path.len(), 4);

		let route = new_route(100_000, NO_FEE_LIMIT, id(&our_id), path, 1000, 9).unwrap();
		assert_eq!(route.total_fees_msat, 3000);
		assert_eq!(route.total_amount_msat, 103_000);

		// Each hop forwards its successor's incoming amount and grants it the delta of the
		// policy it forwards over.
		for i in 0..route.hops.len() - 1 {
			let (expected_fee, expected_delta) = if i + 2 < path.len() {
				(compute_fee(route.hops[i + 1].amt_to_forward_msat, path[i + 2].fees), path[i + 2].cltv_expiry_delta as u32)
			} else {
				(0, 0)
			};
			assert_eq!(route.hops[i].amt_to_forward_msat - route.hops[i + 1].amt_to_forward_msat, expected_fee);
			assert_eq!(route.hops[i].outgoing_time_lock - route.hops[i + 1].outgoing_time_lock, expected_delta);
		}

		let hop_fee_sum: u64 = (0..route.hops.len()).map(|i| route.hop_fee(i)).sum();
		assert_eq!(hop_fee_sum, route.total_fees_msat);
	}

	#[test]
	fn fee_limit_bounds_diversification() {
		let secp_ctx = Secp256k1::new();
		let (_, our_id, _, pubkeys) = get_nodes(&secp_ctx);
		let graph = NetworkGraph::new();
		// Two parallel two-hop paths: node0 charges 1000, node1 charges 2000.
		add_bidirectional_channel(&graph, 1, &our_id, &pubkeys[0], 10_000_000, 40, fees(0, 0));
		add_channel(&graph, 2, &pubkeys[0], &pubkeys[2], 10_000_000);
		update_channel(&graph, 2, &pubkeys[0], false, 40, 0, fees(1000, 0));
		update_channel(&graph, 2, &pubkeys[2], false, 40, 0, fees(0, 0));
		add_bidirectional_channel(&graph, 3, &our_id, &pubkeys[1], 10_000_000, 40, fees(0, 0));
		add_channel(&graph, 4, &pubkeys[1], &pubkeys[2], 10_000_000);
		update_channel(&graph, 4, &pubkeys[1], false, 40, 0, fees(2000, 0));
		update_channel(&graph, 4, &pubkeys[2], false, 40, 0, fees(0, 0));

		let logger = TestLogger::new();
		// 1500 msat of headroom covers the cheap path only.
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[2]), 100_000, 1500, 2, None, &[], &logger).unwrap();
		assert_eq!(paths.len(), 1);
		assert_eq!(channels_of(&paths[0]), vec![1, 2]);

		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[2]), 100_000, 2500, 2, None, &[], &logger).unwrap();
		assert_eq!(paths.len(), 2);
		assert_eq!(channels_of(&paths[1]), vec![3, 4]);
	}

	#[test]
	fn pegged_waypoints_steer_the_route() {
		let (graph, our_id, pubkeys) = build_graph();
		let logger = TestLogger::new();

		let pegs = [HopPeg { node_id: id(&pubkeys[1]), short_channel_id: 0 }];
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[6]), 100_000, NO_FEE_LIMIT, 1, None, &pegs, &logger).unwrap();
		assert_eq!(channels_of(&paths[0]), vec![3, 4, 5]);
		let route = new_route(100_000, NO_FEE_LIMIT, id(&our_id), &paths[0], 1000, 9).unwrap();
		assert!(route.contains_node(&id(&pubkeys[1])));

		// A different waypoint produces a different route.
		let pegs = [HopPeg { node_id: id(&pubkeys[4]), short_channel_id: 0 }];
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[6]), 100_000, NO_FEE_LIMIT, 1, None, &pegs, &logger).unwrap();
		assert_eq!(channels_of(&paths[0]), vec![6, 7, 8, 9]);
		let route = new_route(100_000, NO_FEE_LIMIT, id(&our_id), &paths[0], 1000, 9).unwrap();
		assert!(route.contains_node(&id(&pubkeys[4])));
		assert!(!route.contains_node(&id(&pubkeys[1])));
	}

	#[test]
	fn channel_pegged_waypoint_fixes_the_segment() {
		let (graph, our_id, pubkeys) = build_graph();
		let logger = TestLogger::new();

		let pegs = [HopPeg { node_id: id(&pubkeys[2]), short_channel_id: 4 }];
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[6]), 100_000, NO_FEE_LIMIT, 1, None, &pegs, &logger).unwrap();
		assert_eq!(channels_of(&paths[0]), vec![3, 4, 5]);
		// The pegged channel enters the pegged node.
		assert_eq!(paths[0][1].short_channel_id, 4);
		assert_eq!(paths[0][1].node, id(&pubkeys[2]));
	}

	#[test]
	fn prepare_pegs_inserts_channel_predecessors() {
		let (graph, our_id, pubkeys) = build_graph();
		let view = graph.read_only();

		let pegs = [
			HopPeg { node_id: id(&our_id), short_channel_id: 0 },
			HopPeg { node_id: id(&pubkeys[2]), short_channel_id: 4 },
			HopPeg { node_id: id(&pubkeys[6]), short_channel_id: 0 },
		];
		let expanded = prepare_pegs(&view, &pegs).unwrap();
		assert_eq!(expanded, vec![
			HopPeg { node_id: id(&our_id), short_channel_id: 0 },
			HopPeg { node_id: id(&pubkeys[1]), short_channel_id: 0 },
			HopPeg { node_id: id(&pubkeys[2]), short_channel_id: 4 },
			HopPeg { node_id: id(&pubkeys[6]), short_channel_id: 0 },
		]);

		// An explicit peg for the inserted predecessor is deduplicated away.
		let pegs = [
			HopPeg { node_id: id(&our_id), short_channel_id: 0 },
			HopPeg { node_id: id(&pubkeys[1]), short_channel_id: 0 },
			HopPeg { node_id: id(&pubkeys[2]), short_channel_id: 4 },
			HopPeg { node_id: id(&pubkeys[6]), short_channel_id: 0 },
		];
		assert_eq!(prepare_pegs(&view, &pegs).unwrap(), expanded);
	}

	#[test]
	fn peg_errors() {
		let (graph, our_id, pubkeys) = build_graph();

		{
			let view = graph.read_only();
			// The source has no predecessor to reach it through a pegged channel.
			let pegs = [HopPeg { node_id: id(&our_id), short_channel_id: 1 }];
			let err = prepare_pegs(&view, &pegs).unwrap_err();
			assert_eq!(err.kind, RouterErrorKind::PegNotInNetwork);
		}

		let logger = TestLogger::new();
		// A peg through a channel the graph does not know.
		let pegs = [HopPeg { node_id: id(&pubkeys[2]), short_channel_id: 999 }];
		let err = find_paths(&graph, &id(&our_id), &id(&pubkeys[6]), 100_000, NO_FEE_LIMIT, 1, None, &pegs, &logger).unwrap_err();
		assert_eq!(err.kind, RouterErrorKind::PegNotInNetwork);

		// A peg naming a node outside the graph is simply unreachable as its segment's target.
		let pegs = [HopPeg { node_id: id(&pubkeys[15]), short_channel_id: 0 }];
		let err = find_paths(&graph, &id(&our_id), &id(&pubkeys[6]), 100_000, NO_FEE_LIMIT, 1, None, &pegs, &logger).unwrap_err();
		assert_eq!(err.kind, RouterErrorKind::NoPathFound);
	}

	#[test]
	fn stitched_path_fee_above_limit_is_no_route() {
		let secp_ctx = Secp256k1::new();
		let (_, our_id, _, pubkeys) = get_nodes(&secp_ctx);
		let graph = NetworkGraph::new();
		// our_id -1- node0 -2- node1 -3- node2 -4- node3, with 800 msat charged by node0 and
		// by node1. Each segment stays within the 1000 msat limit; their sum does not.
		add_bidirectional_channel(&graph, 1, &our_id, &pubkeys[0], 10_000_000, 40, fees(0, 0));
		add_channel(&graph, 2, &pubkeys[0], &pubkeys[1], 10_000_000);
		update_channel(&graph, 2, &pubkeys[0], false, 40, 0, fees(800, 0));
		update_channel(&graph, 2, &pubkeys[1], false, 40, 0, fees(0, 0));
		add_channel(&graph, 3, &pubkeys[1], &pubkeys[2], 10_000_000);
		update_channel(&graph, 3, &pubkeys[1], false, 40, 0, fees(800, 0));
		update_channel(&graph, 3, &pubkeys[2], false, 40, 0, fees(0, 0));
		add_bidirectional_channel(&graph, 4, &pubkeys[2], &pubkeys[3], 10_000_000, 40, fees(0, 0));

		let logger = TestLogger::new();
		let pegs = [HopPeg { node_id: id(&pubkeys[1]), short_channel_id: 0 }];
		let err = find_paths(&graph, &id(&our_id), &id(&pubkeys[3]), 100_000, 1000, 1, None, &pegs, &logger).unwrap_err();
		assert_eq!(err.kind, RouterErrorKind::NoRouteFound);
		logger.assert_log_contains("lightning_router::routing::router", "exceeds the fee limit", 1);
	}

	#[test]
	fn twenty_hops_is_fine_twenty_one_is_not() {
		let logger = TestLogger::new();

		let (graph, our_id, pubkeys) = build_line_graph(HOP_LIMIT);
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[HOP_LIMIT - 1]), 1000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap();
		assert_eq!(paths[0].len(), HOP_LIMIT);

		let (graph, our_id, pubkeys) = build_line_graph(HOP_LIMIT + 1);
		let err = find_paths(&graph, &id(&our_id), &id(&pubkeys[HOP_LIMIT]), 1000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap_err();
		assert_eq!(err.kind, RouterErrorKind::MaxHopsExceeded);
	}

	#[test]
	fn stop_at_max_hops_exceeded_fails_fast() {
		let (graph, our_id, pubkeys) = build_line_graph(HOP_LIMIT + 1);
		let view = graph.read_only();
		let g = GraphParams { graph: &view, additional_edges: None, bandwidth_hints: None, origin: None };
		let r = RestrictParams { stop_at_max_hops_exceeded: true, ..Default::default() };
		let logger = TestLogger::new();
		let err = find_path(&g, &r, &id(&our_id), &id(&pubkeys[HOP_LIMIT]), 1000, &logger).unwrap_err();
		assert_eq!(err.kind, RouterErrorKind::MaxHopsExceeded);
	}

	#[test]
	fn over_limit_shortest_path_falls_back_to_alternative() {
		// A 21 hop chain costing nothing, with a 10_000 msat shortcut from node0 to the end.
		// The cheapest path busts the hop limit, so the dearer two-hop one must be returned.
		let (graph, our_id, pubkeys) = build_line_graph(HOP_LIMIT + 1);
		add_channel(&graph, 100, &pubkeys[0], &pubkeys[HOP_LIMIT], 100_000_000_000);
		update_channel(&graph, 100, &pubkeys[0], false, 40, 0, fees(10_000, 0));
		update_channel(&graph, 100, &pubkeys[HOP_LIMIT], false, 40, 0, fees(0, 0));

		let logger = TestLogger::new();
		let paths = find_paths(&graph, &id(&our_id), &id(&pubkeys[HOP_LIMIT]), 1000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap();
		assert_eq!(channels_of(&paths[0]), vec![1, 100]);
	}

	#[test]
	fn k_paths_with_one_requested_returns_the_seed() {
		let (graph, our_id, pubkeys) = build_graph();
		let view = graph.read_only();
		let g = GraphParams { graph: &view, additional_edges: None, bandwidth_hints: None, origin: None };
		let r = RestrictParams::default();
		let logger = TestLogger::new();

		let seed = find_path(&g, &r, &id(&our_id), &id(&pubkeys[6]), 100_000, &logger).unwrap();
		let k_paths = find_k_paths(&g, &r, &id(&our_id), &id(&pubkeys[6]), 100_000, &seed, 1, &&logger).unwrap();
		assert_eq!(k_paths.len(), 1);
		// The seed comes back intact behind the indexing self-edge.
		assert_eq!(k_paths[0][0].short_channel_id, 0);
		assert_eq!(k_paths[0][0].node, id(&our_id));
		assert_eq!(&k_paths[0][1..], &seed[..]);
	}

	#[test]
	fn hop_hints_extend_the_graph() {
		let secp_ctx = Secp256k1::new();
		let (_, our_id, _, pubkeys) = get_nodes(&secp_ctx);
		let graph = NetworkGraph::new();
		add_bidirectional_channel(&graph, 1, &our_id, &pubkeys[0], 10_000_000, 40, fees(0, 0));

		// The recipient is not in the graph at all; an invoice hint supplies the private
		// channel into it.
		let hint = HopHint {
			src_node_id: id(&pubkeys[0]),
			short_channel_id: 100,
			fees: fees(1000, 0),
			cltv_expiry_delta: 40,
		};
		let mut additional_edges = HashMap::new();
		additional_edges.insert(id(&pubkeys[0]), vec![hint.edge_policy(id(&pubkeys[10]))]);

		let view = graph.read_only();
		let g = GraphParams { graph: &view, additional_edges: Some(&additional_edges), bandwidth_hints: None, origin: None };
		let r = RestrictParams::default();
		let logger = TestLogger::new();
		let path = find_path(&g, &r, &id(&our_id), &id(&pubkeys[10]), 100_000, &logger).unwrap();
		assert_eq!(channels_of(&path), vec![1, 100]);
		assert_eq!(path[1].node, id(&pubkeys[10]));
		assert_eq!(compute_path_fee(100_000, &path), 1000);
	}

	#[test]
	fn outgoing_channel_restriction() {
		let secp_ctx = Secp256k1::new();
		let (_, our_id, _, pubkeys) = get_nodes(&secp_ctx);
		let graph = NetworkGraph::new();
		// Two parallel channels to the same peer.
		add_bidirectional_channel(&graph, 1, &our_id, &pubkeys[0], 10_000_000, 40, fees(0, 0));
		add_bidirectional_channel(&graph, 10, &our_id, &pubkeys[0], 10_000_000, 40, fees(0, 0));

		let view = graph.read_only();
		let g = GraphParams { graph: &view, additional_edges: None, bandwidth_hints: None, origin: None };
		let logger = TestLogger::new();

		let r = RestrictParams::default();
		let path = find_path(&g, &r, &id(&our_id), &id(&pubkeys[0]), 100_000, &logger).unwrap();
		assert_eq!(channels_of(&path), vec![1]);

		let r = RestrictParams { outgoing_channel_id: Some(10), ..Default::default() };
		let path = find_path(&g, &r, &id(&our_id), &id(&pubkeys[0]), 100_000, &logger).unwrap();
		assert_eq!(channels_of(&path), vec![10]);
	}

	#[test]
	fn unknown_source_is_graph_io() {
		let (graph, _, pubkeys) = build_graph();
		let logger = TestLogger::new();
		let err = find_paths(&graph, &id(&pubkeys[15]), &id(&pubkeys[6]), 100_000, NO_FEE_LIMIT, 1, None, &[], &logger).unwrap_err();
		assert_eq!(err.kind, RouterErrorKind::GraphIo);
	}
}
