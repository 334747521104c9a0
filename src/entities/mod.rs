//! Typed per-entity bridges.
//!
//! Each entity gets a thin facade over one [`crate::bridge::ApiBridge`]: the
//! facade names the operations and wire types, the bridge supplies caching,
//! deduplication, permission gating, and analytics uniformly.

pub mod customer;
pub mod product;
pub mod proposal;
mod types;

pub use customer::{Customer, CustomerBridge, CustomerCreate, CustomerPatch};
pub use product::{Product, ProductBridge, ProductCreate, ProductPatch};
pub use proposal::{
  Proposal, ProposalBridge, ProposalCreate, ProposalListParams, ProposalPatch, ProposalStats,
  ProposalStatus, ProposalTemplate,
};
pub use types::{ListParams, Page};
