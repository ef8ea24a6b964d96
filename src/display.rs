use std::fmt::Write;
use crate::rules::{ConfigRecord, SwapOutcome, SwapPlan, BOX_CAPACITY, MAX_PARTY_SIZE};

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn slot_list(slots: &[u8]) -> String {
    if slots.is_empty() {
        return "(none)".to_string();
    }
    let mut sorted = slots.to_vec();
    sorted.sort_unstable();
    sorted.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
}

/// Summarises a configuration, one setting per line
pub fn describe_config(record: &ConfigRecord) -> String {
    format!(
        "Party size: {}\n\
         Swaps per run: {}-{}\n\
         Boxed: {}\n\
         Randomize swap-ins: {}\n\
         Allow fewer swap-ins: {}\n\
         Randomize box swaps: {}",
        record.party_size,
        record.min,
        record.max,
        record.boxed,
        on_off(record.swapins),
        on_off(record.diff_swaps),
        on_off(record.shifts),
    )
}

/// Lists the picks of every group, sorted by slot
pub fn describe_plan(plan: &SwapPlan) -> String {
    let mut out = String::new();
    for (i, group) in plan.groups.iter().enumerate() {
        let label = match i {
            0 => "Party swap-outs".to_string(),
            1 => "Box 1 swap-ins".to_string(),
            n => format!("Box {} shifts", n),
        };
        let _ = writeln!(out, "{}: {}", label, slot_list(group));
    }
    out
}

pub fn describe_outcome(outcome: &SwapOutcome) -> String {
    match outcome {
        SwapOutcome::Plan(plan) => describe_plan(plan),
        SwapOutcome::NothingToSwap => {
            "Cannot make changes to a party with only 1 member and nothing boxed.\n".to_string()
        }
    }
}

fn cell(slot: u32, filled: bool, picked: bool) -> String {
    let label = if filled { format!("{:>2}", slot) } else { "--".to_string() };
    if picked {
        format!("*{}*", label)
    } else {
        format!(" {} ", label)
    }
}

/// Draws the party as 3 rows of 2. Filled slots show their number, picked slots are starred.
pub fn render_party(record: &ConfigRecord, plan: &SwapPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Party");
    for row in 0..MAX_PARTY_SIZE as u32 / 2 {
        for col in 1..=2u32 {
            let slot = row * 2 + col;
            let picked = plan.party().contains(&(slot as u8));
            out.push_str(&cell(slot, slot <= record.party_size as u32, picked));
        }
        out.push('\n');
    }
    out
}

/// Draws one storage box as 5 rows of 6
pub fn render_box(record: &ConfigRecord, plan: &SwapPlan, box_number: u32) -> String {
    let box_number = box_number.max(1);
    let picks = plan.box_picks(box_number as usize);
    let offset = (box_number - 1) * BOX_CAPACITY;
    let mut out = String::new();
    let _ = writeln!(out, "Box {}", box_number);
    for row in 0..5u32 {
        for col in 1..=6u32 {
            let slot = row * 6 + col;
            let picked = picks.contains(&(slot as u8));
            out.push_str(&cell(slot, slot + offset <= record.boxed, picked));
        }
        out.push('\n');
    }
    out
}

pub fn render_grid(record: &ConfigRecord, plan: &SwapPlan, box_number: u32) -> String {
    render_party(record, plan) + &render_box(record, plan, box_number)
}
