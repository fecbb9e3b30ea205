//! Row sets modelled on production job 8113
use std::collections::HashMap;
use wo_hierarchy::prelude::*;

pub const JOB: &str = "8113";
pub const BIG_LOT: &str = "26";
/// Part-bearing rows in the large lot, anchor included
pub const BIG_LOT_PARTS: usize = 335;
const SMALL_LOT_PARTS: usize = 25;
/// Lot children that point at sub-assemblies, with their subordinate SUB_IDs
pub const POINTERS: [(u32, u32); 3] = [(50, 5000), (100, 10000), (150, 15000)];
/// Nested pointer inside the first sub-assembly
pub const NESTED_POINTER: (u32, u32) = (5005, 5500);

pub fn lot_ids() -> Vec<String> {
    (1..=14)
        .map(|lot| lot.to_string())
        .chain(std::iter::once(BIG_LOT.to_string()))
        .collect()
}

pub fn key(lot: &str, sub: u32) -> WorkOrderKey {
    WorkOrderKey::new(JOB, lot, sub.to_string())
}

fn header(lot: &str, sub: &str) -> LegacyRow {
    LegacyRow::new(JOB, lot, sub).with_status("Closed")
}

fn part_row(lot: &str, sub: u32, anchor: &WorkOrderKey) -> LegacyRow {
    let part_id = format!("P-{}-{}", lot, sub);
    let purchased = sub % 3 == 0 && sub != 1;
    LegacyRow::new(JOB, lot, sub.to_string())
        .with_part(part_id.clone())
        .with_part_flags(!purchased, purchased)
        .with_description(format!("Component {} of lot {}", sub, lot))
        .with_status("Closed")
        .with_desired_qty(1.0)
        .with_requirement(Requirement::new(anchor.clone(), Some(part_id), 1.0))
}

fn lot_rows(lot: &str, parts: usize) -> Vec<LegacyRow> {
    let anchor = key(lot, 1);
    let mut rows = vec![header(lot, "0")];
    for sub in 1..=parts as u32 {
        let mut row = part_row(lot, sub, &anchor);
        if lot == BIG_LOT {
            if let Some((_, subordinate)) = POINTERS.iter().find(|(pointer, _)| *pointer == sub) {
                let part_id = row.part_id().map(str::to_string);
                row = row
                    .with_part_flags(true, false)
                    .with_requirement(
                        Requirement::new(anchor.clone(), part_id, 1.0).with_subordinate(subordinate.to_string()),
                    );
            }
        }
        rows.push(row);
    }
    rows
}

/// 702 WORK_ORDER rows across 15 lots; lot "26" holds 335 part rows
///
/// Every lot starts with a header row; lots "7" and "26" carry a second one.
/// Rows are returned lot by lot in reverse SUB_ID order so the resolver has
/// to sort them.
pub fn job_8113_rows() -> Vec<LegacyRow> {
    let mut rows = Vec::new();
    for lot in lot_ids() {
        let parts = if lot == BIG_LOT { BIG_LOT_PARTS } else { SMALL_LOT_PARTS };
        let mut lot_rows = lot_rows(&lot, parts);
        if lot == "7" || lot == BIG_LOT {
            lot_rows.push(header(&lot, "0A"));
        }
        lot_rows.reverse();
        rows.extend(lot_rows);
    }
    rows
}

/// Child slices served for the sub-assemblies of lot "26"
pub fn job_8113_children() -> HashMap<WorkOrderKey, Vec<LegacyRow>> {
    let mut children = HashMap::new();
    for (_, subordinate) in POINTERS {
        let parent = key(BIG_LOT, subordinate);
        let rows = (1..=10)
            .map(|offset| {
                let sub = subordinate + offset;
                let part_id = format!("S-{}", sub);
                let mut requirement = Requirement::new(parent.clone(), Some(part_id.clone()), 2.0);
                let mut flags = (false, true);
                if sub == NESTED_POINTER.0 {
                    requirement = requirement.with_subordinate(NESTED_POINTER.1.to_string());
                    flags = (true, false);
                }
                LegacyRow::new(JOB, BIG_LOT, sub.to_string())
                    .with_part(part_id)
                    .with_part_flags(flags.0, flags.1)
                    .with_status("Released")
                    .with_requirement(requirement)
            })
            .collect();
        children.insert(parent, rows);
    }

    let nested = key(BIG_LOT, NESTED_POINTER.1);
    let nested_rows = (1..=3)
        .map(|offset| {
            let sub = NESTED_POINTER.1 + offset;
            LegacyRow::new(JOB, BIG_LOT, sub.to_string())
                .with_part(format!("N-{}", sub))
                .with_part_flags(true, false)
                .with_requirement(Requirement::new(nested.clone(), Some(format!("N-{}", sub)), 1.0))
        })
        .collect();
    children.insert(nested, nested_rows);
    children
}

/// Gateway serving job 8113 and its sub-assemblies
pub fn job_8113_gateway() -> super::mocks::MockQueryGateway {
    super::mocks::MockQueryGateway::new()
        .with_job(JOB, job_8113_rows())
        .with_all_children(job_8113_children())
}
