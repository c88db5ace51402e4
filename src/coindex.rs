//! Trace and gap resolution
//!
//! Links empty-category traces (`*T*-1`) and gapping remnants (`PP=3`) to
//! the constituent carrying the matching `-N` index. A link is only made when
//! exactly one antecedent carries the index and neither end is linked yet;
//! anything else is left unlinked for the caller to notice. Every link is
//! therefore symmetric.

use crate::label::CoindexKind;
use crate::tree::{NodeId, Tree};
use rustc_hash::FxHashMap;
use tracing::trace;

impl Tree {
    pub(crate) fn link_coindices(&mut self) {
        // Antecedents: ordinary constituents carrying -N
        let mut antecedents: FxHashMap<u32, Vec<NodeId>> = FxHashMap::default();
        // Referrers in document order: (node, index it points at)
        let mut referrers: Vec<(NodeId, u32)> = Vec::new();

        for id in 0..self.nodes.len() {
            let node = &self.nodes[id];
            if node.empty_category {
                if let Some(index) = self.node(id).trace_index() {
                    referrers.push((id, index));
                }
                continue;
            }
            for coindex in &node.coindices {
                match coindex.kind {
                    CoindexKind::Chain => antecedents.entry(coindex.id).or_default().push(id),
                    CoindexKind::Gap => referrers.push((id, coindex.id)),
                }
            }
        }

        for (referrer, index) in referrers {
            let Some(candidates) = antecedents.get(&index) else {
                trace!(index, referrer, "no antecedent for coindex");
                continue;
            };
            let mut candidates = candidates.iter().copied().filter(|&c| c != referrer);
            let (Some(antecedent), None) = (candidates.next(), candidates.next()) else {
                trace!(index, referrer, "ambiguous antecedent for coindex");
                continue;
            };

            if self.nodes[referrer].indexing_node.is_some()
                || self.nodes[antecedent].indexing_node.is_some()
            {
                trace!(index, referrer, antecedent, "coindex end already linked");
                continue;
            }
            self.nodes[referrer].indexing_node = Some(antecedent);
            self.nodes[antecedent].indexing_node = Some(referrer);
        }
    }
}
