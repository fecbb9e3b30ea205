use crate::hierarchy::domain::{
    Anomaly, ChildState, JobNumber, LegacyRow, Part, Resolution, ResolvedNode, SubId,
    UnresolvedRow, WorkOrderKey, WorkOrderNode,
};
use std::collections::{HashMap, HashSet};

/// TreeResolver service for turning flat legacy rows into an ordered tree
///
/// This service contains pure business logic. It never fails: malformed
/// values fall back to string ordering, rows that cannot be linked are
/// collected as unresolved, and data anomalies are recorded and logged.
pub struct TreeResolver;

impl TreeResolver {
    /// Resolves all WORK_ORDER rows of a job into root assemblies
    ///
    /// Rows are grouped by LOT_ID. Within a lot the anchor is the first
    /// part-bearing row by SUB_ID; header rows before it are skipped, and every
    /// other part-bearing row becomes a child of the anchor. A lot without any
    /// part-bearing row produces no root.
    ///
    /// # Returns
    /// A Resolution whose `top` lists the root keys, ordered by LOT_ID
    pub fn resolve(job_number: &JobNumber, rows: Vec<LegacyRow>) -> Resolution {
        let mut resolution = Resolution::default();
        let total_rows = rows.len();
        let mut lots: HashMap<String, Vec<LegacyRow>> = HashMap::new();

        for row in rows {
            if !row.base_id.trim().eq_ignore_ascii_case(job_number.as_str()) {
                Self::unresolved(
                    &mut resolution,
                    row,
                    format!("row does not belong to job {}", job_number),
                );
                continue;
            }
            if row.lot_id.trim().is_empty() {
                Self::unresolved(&mut resolution, row, "row has no LOT_ID".to_string());
                continue;
            }
            lots.entry(row.lot_id.trim().to_string()).or_default().push(row);
        }

        let mut lot_ids: Vec<String> = lots.keys().cloned().collect();
        lot_ids.sort_by_cached_key(|lot_id| SubId::new(lot_id));

        for lot_id in lot_ids {
            let group = lots.remove(&lot_id).unwrap_or_default();
            let mut group = Self::ordered_unique(group, &mut resolution);

            let Some(anchor_index) = group.iter().position(LegacyRow::is_part_bearing) else {
                tracing::warn!(job = %job_number, lot = %lot_id, "lot has no part-bearing row; no root produced");
                for row in group.into_iter().filter(|row| row.subordinate_sub_id().is_some()) {
                    Self::unresolved(&mut resolution, row, format!("lot {} has no anchor row", lot_id));
                }
                resolution.anomalies.push(Anomaly::LotWithoutAnchor {
                    base_id: job_number.as_str().to_string(),
                    lot_id,
                });
                continue;
            };

            let anchor = group.remove(anchor_index);
            let children = Self::child_nodes(group, &mut resolution);
            let child_keys: Vec<WorkOrderKey> =
                children.iter().map(|c| c.node.key().clone()).collect();

            Self::collect_part(&anchor, &mut resolution);
            let anchor_node = WorkOrderNode::from_row(&anchor);
            resolution.top.push(anchor_node.key().clone());
            resolution.nodes.push(ResolvedNode {
                node: anchor_node,
                children: ChildState::Loaded(child_keys),
            });
            resolution.nodes.extend(children);
        }

        tracing::debug!(
            job = %job_number,
            rows = total_rows,
            roots = resolution.top.len(),
            unresolved = resolution.unresolved.len(),
            "resolved job rows"
        );
        resolution
    }

    /// Resolves one fetched sub-slice below `parent`
    ///
    /// `parent` is the key the slice was fetched for. Rows naming another
    /// parent cannot be linked and are collected as unresolved.
    ///
    /// # Returns
    /// A Resolution whose `top` lists the children in display order
    pub fn resolve_children(parent: &WorkOrderKey, rows: Vec<LegacyRow>) -> Resolution {
        let mut resolution = Resolution::default();
        let total_rows = rows.len();
        let mut linked = Vec::with_capacity(rows.len());

        for row in rows {
            if row.key() == *parent {
                continue;
            }
            if !row.base_id.trim().eq_ignore_ascii_case(parent.base_id()) {
                Self::unresolved(
                    &mut resolution,
                    row,
                    format!("row does not belong to job {}", parent.base_id()),
                );
                continue;
            }
            let foreign_parent = row
                .requirement
                .as_ref()
                .map(|r| r.parent_key != *parent)
                .unwrap_or(false);
            if foreign_parent {
                let reason = format!("requirement is not linked to {}", parent);
                Self::unresolved(&mut resolution, row, reason);
                continue;
            }
            linked.push(row);
        }

        let linked = Self::ordered_unique(linked, &mut resolution);
        let children = Self::child_nodes(linked, &mut resolution);
        resolution.top = children.iter().map(|c| c.node.key().clone()).collect();
        resolution.nodes = children;

        tracing::debug!(
            parent = %parent,
            rows = total_rows,
            children = resolution.top.len(),
            "resolved child rows"
        );
        resolution
    }

    /// Drops repeated keys (first occurrence wins) and orders by SUB_ID
    fn ordered_unique(rows: Vec<LegacyRow>, resolution: &mut Resolution) -> Vec<LegacyRow> {
        let mut seen: HashSet<WorkOrderKey> = HashSet::new();
        let mut unique: Vec<(WorkOrderKey, LegacyRow)> = Vec::with_capacity(rows.len());

        for row in rows {
            let key = row.key();
            if !seen.insert(key.clone()) {
                tracing::warn!(key = %key, "duplicate work order key; keeping first occurrence");
                resolution.anomalies.push(Anomaly::DuplicateKey(key));
                continue;
            }
            unique.push((key, row));
        }

        unique.sort_by(|(a, _), (b, _)| {
            a.sub_id()
                .cmp(b.sub_id())
                .then_with(|| SubId::new(a.lot_id()).cmp(&SubId::new(b.lot_id())))
        });
        unique.into_iter().map(|(_, row)| row).collect()
    }

    /// Builds child nodes from ordered rows, skipping header rows
    ///
    /// A row with a subordinate link is an assembly pointer and starts
    /// unloaded; any other part-bearing row is a leaf.
    fn child_nodes(rows: Vec<LegacyRow>, resolution: &mut Resolution) -> Vec<ResolvedNode> {
        let mut children = Vec::with_capacity(rows.len());
        for row in rows {
            let is_pointer = row.subordinate_sub_id().is_some();
            if !row.is_part_bearing() && !is_pointer {
                tracing::trace!(key = %row.key(), "skipping header row");
                continue;
            }

            Self::collect_part(&row, resolution);
            let state = if is_pointer {
                ChildState::NotLoaded
            } else {
                ChildState::NoChildren
            };
            children.push(ResolvedNode {
                node: WorkOrderNode::from_row(&row),
                children: state,
            });
        }
        children
    }

    fn collect_part(row: &LegacyRow, resolution: &mut Resolution) {
        if let Some(part) = row.joined_part() {
            Self::upsert_part(&mut resolution.parts, part);
        }
    }

    fn upsert_part(parts: &mut Vec<Part>, part: Part) {
        match parts.iter_mut().find(|p| p.id == part.id) {
            Some(existing) => *existing = part,
            None => parts.push(part),
        }
    }

    fn unresolved(resolution: &mut Resolution, row: LegacyRow, reason: String) {
        tracing::warn!(key = %row.key(), reason = %reason, "row could not be linked to a parent");
        resolution.unresolved.push(UnresolvedRow { row, reason });
    }
}
