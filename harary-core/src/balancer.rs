//! Construction of structurally balanced complete graphs.
//!
//! Nodes are split into two communities; intra-community pairs become
//! positive edges and inter-community pairs negative ones. By Harary's
//! theorem every triangle of the result is balanced.

use rand::Rng;
use tracing::{debug, instrument};

use crate::{Sign, SignedGraph};

/// Size of the first community used when no partition method is configured.
pub const DEFAULT_COMMUNITY_SIZE: usize = 15;

/// Strategy used to split nodes into two communities.
///
/// # Examples
/// ```
/// use harary_core::PartitionMethod;
///
/// let method = PartitionMethod::default();
/// assert_eq!(method, PartitionMethod::Prefix { size: 15 });
/// assert_eq!(method.size(), 15);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartitionMethod {
    /// Nodes `[0, size)` form the first community. Sizes beyond the node
    /// count place every node in the first community.
    Prefix {
        /// Number of leading nodes in the first community.
        size: usize,
    },
    /// `draws` node ids are sampled uniformly with replacement; the distinct
    /// ids drawn form the first community.
    ///
    /// Repeated draws collapse, so the first community usually holds fewer
    /// than `draws` nodes. [`PartitionMethod::random_draws_for`] takes
    /// `node_count - 1` draws, which leaves roughly a third of the nodes in
    /// the second community.
    RandomDraws {
        /// Number of samples taken.
        draws: usize,
    },
}

impl PartitionMethod {
    /// Random partition taking one draw fewer than `node_count`.
    ///
    /// # Examples
    /// ```
    /// use harary_core::PartitionMethod;
    ///
    /// assert_eq!(
    ///     PartitionMethod::random_draws_for(30),
    ///     PartitionMethod::RandomDraws { draws: 29 }
    /// );
    /// ```
    #[must_use]
    pub const fn random_draws_for(node_count: usize) -> Self {
        Self::RandomDraws {
            draws: node_count.saturating_sub(1),
        }
    }

    /// Returns the configured size or draw count.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Prefix { size } => size,
            Self::RandomDraws { draws } => draws,
        }
    }
}

impl Default for PartitionMethod {
    fn default() -> Self {
        Self::Prefix {
            size: DEFAULT_COMMUNITY_SIZE,
        }
    }
}

/// One side of a two-community partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Community {
    /// The community selected by the partition method.
    First,
    /// Every remaining node.
    Second,
}

/// Assignment of every node to one of two communities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommunityPartition {
    membership: Vec<Community>,
}

impl CommunityPartition {
    /// Splits `node_count` nodes according to `method`.
    ///
    /// # Examples
    /// ```
    /// use harary_core::{Community, CommunityPartition, PartitionMethod};
    /// use rand::{SeedableRng, rngs::SmallRng};
    ///
    /// let mut rng = SmallRng::seed_from_u64(7);
    /// let partition = CommunityPartition::draw(5, PartitionMethod::Prefix { size: 2 }, &mut rng);
    /// assert_eq!(partition.community_of(1), Some(Community::First));
    /// assert_eq!(partition.community_of(2), Some(Community::Second));
    /// assert_eq!(partition.first_size(), 2);
    /// ```
    pub fn draw<R: Rng>(node_count: usize, method: PartitionMethod, rng: &mut R) -> Self {
        let mut membership = vec![Community::Second; node_count];
        match method {
            PartitionMethod::Prefix { size } => {
                for slot in membership.iter_mut().take(size) {
                    *slot = Community::First;
                }
            }
            PartitionMethod::RandomDraws { draws } => {
                if node_count > 0 {
                    for _ in 0..draws {
                        let node = rng.gen_range(0..node_count);
                        membership[node] = Community::First;
                    }
                }
            }
        }
        Self { membership }
    }

    /// Builds a partition from an explicit membership list.
    #[must_use]
    pub fn from_membership(membership: Vec<Community>) -> Self {
        Self { membership }
    }

    /// Returns the number of partitioned nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.membership.len()
    }

    /// Returns the community of `node`.
    #[must_use]
    pub fn community_of(&self, node: usize) -> Option<Community> {
        self.membership.get(node).copied()
    }

    /// Returns the number of nodes in [`Community::First`].
    #[must_use]
    pub fn first_size(&self) -> usize {
        self.membership
            .iter()
            .filter(|community| **community == Community::First)
            .count()
    }

    /// Returns the number of nodes in [`Community::Second`].
    #[must_use]
    pub fn second_size(&self) -> usize {
        self.node_count() - self.first_size()
    }

    /// Returns the sign that makes `{left, right}` consistent with the
    /// partition: positive inside a community, negative across.
    #[must_use]
    pub fn sign_between(&self, left: usize, right: usize) -> Sign {
        if self.community_of(left) == self.community_of(right) {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }
}

/// Builds balanced complete graphs from a [`PartitionMethod`].
///
/// # Examples
/// ```
/// use harary_core::{CommunityBalancer, PartitionMethod, TriangleIndex};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let balancer = CommunityBalancer::new(PartitionMethod::Prefix { size: 3 });
/// let graph = balancer.build(6, &mut SmallRng::seed_from_u64(1));
/// assert_eq!(graph.edge_count(), 15);
/// let index = TriangleIndex::rebuild(&graph);
/// assert_eq!(index.unbalanced_count(), 0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommunityBalancer {
    method: PartitionMethod,
}

impl CommunityBalancer {
    /// Creates a balancer using `method`.
    #[must_use]
    pub const fn new(method: PartitionMethod) -> Self {
        Self { method }
    }

    /// Returns the configured partition method.
    #[must_use]
    #[rustfmt::skip]
    pub const fn method(&self) -> PartitionMethod { self.method }

    /// Draws a partition and returns the complete graph it balances.
    #[instrument(name = "core.balance", skip(self, rng), fields(method = ?self.method))]
    pub fn build<R: Rng>(&self, node_count: usize, rng: &mut R) -> SignedGraph {
        let partition = CommunityPartition::draw(node_count, self.method, rng);
        debug!(
            first = partition.first_size(),
            second = partition.second_size(),
            "communities drawn"
        );
        Self::from_partition(&partition)
    }

    /// Returns the complete graph whose signs follow `partition`.
    #[must_use]
    pub fn from_partition(partition: &CommunityPartition) -> SignedGraph {
        SignedGraph::complete(partition.node_count(), |low, high| {
            partition.sign_between(low, high)
        })
    }
}
