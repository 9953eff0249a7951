// This file is Copyright its original authors, visible in version control
// history.
//
// This file is licensed under the Apache License, Version 2.0 <LICENSE-APACHE
// or http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.
// You may not use this file except in accordance with one or both of these
// licenses.

#![crate_name = "lightning_router"]

//! Path finding for Lightning-style payment channel networks, in library form.
//!
//! Given a directed, fee-bearing channel graph, a payer, a payee, an amount and a fee budget,
//! this crate finds up to K loop-free routes able to carry the payment end-to-end, honoring
//! per-channel minimum amounts, bandwidth, time-lock penalties, disabled flags and an absolute
//! hop limit. Routes may be forced through ordered waypoints ("pegged hops"), optionally via a
//! named channel, and private channels can be folded into a search as additional edges.
//!
//! There is no built-in threading/execution environment, no persistence and no networking: the
//! caller feeds the [`routing::graph::NetworkGraph`] from whatever gossip or database layer it
//! has, asks [`routing::router::find_paths`] for candidate paths, and hands the winner to
//! [`routing::router::new_route`] to obtain the per-hop amounts and expiries an onion packet
//! needs.
//!
//! Log output is handed to a caller-supplied [`util::logger::Logger`]. The `max_level_*`
//! features drop log calls below the named level at compile time.

#![cfg_attr(not(test), deny(missing_docs))]
#![cfg_attr(not(test), forbid(unsafe_code))]

#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate bitcoin;

#[macro_use]
pub mod util;
pub mod routing;
