//! Text and JSON rendering of query results.

use std::fmt::Write;

use anyhow::{Context, Result};
use packing::infra::seed::dto::{
    CapabilitiesDto, EventSummaryDto, ItemGroupDto, MemberDto, ProgressDto,
};
use packing::model::{Capabilities, Event, EventSummary, ItemGroup, ItemStatus, ProgressSummary};
use serde::Serialize;

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

fn status_label(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::ToPack => "to pack",
        ItemStatus::Packed => "packed",
        ItemStatus::Delivered => "delivered",
    }
}

pub fn events(summaries: &[EventSummary], json: bool) -> Result<String> {
    if json {
        let dtos: Vec<EventSummaryDto> = summaries.iter().map(Into::into).collect();
        return to_json(&dtos);
    }
    if summaries.is_empty() {
        return Ok("No events found".to_string());
    }

    let mut out = String::new();
    for s in summaries {
        writeln!(out, "[{}] {}", s.id, s.title)?;
        writeln!(out, "    {} | {} | {}", s.date, s.location, s.description)?;
        writeln!(
            out,
            "    {} items, {} members, {}% packed, {}% delivered",
            s.item_count,
            s.member_count,
            s.progress.packed_percentage,
            s.progress.delivered_percentage
        )?;
    }
    Ok(out.trim_end().to_string())
}

pub fn groups(event: &Event, groups: &[ItemGroup], json: bool) -> Result<String> {
    if json {
        let dtos: Vec<ItemGroupDto> = groups.iter().map(Into::into).collect();
        return to_json(&dtos);
    }

    let mut out = String::new();
    writeln!(out, "{} ({}, {})", event.title, event.date, event.location)?;
    if groups.is_empty() {
        writeln!(out, "  no matching items")?;
    }
    for group in groups {
        writeln!(out, "{} ({})", group.category.name, group.items.len())?;
        for item in &group.items {
            let assignee = item
                .assigned_to
                .as_ref()
                .and_then(|id| event.member(id))
                .map_or("unassigned", |m| m.name.as_str());
            let required = if item.is_required { " *" } else { "" };
            write!(
                out,
                "  [{:<9}] {} x{}{} ({})",
                status_label(item.status),
                item.name,
                item.quantity,
                required,
                assignee
            )?;
            if let Some(notes) = &item.notes {
                write!(out, " - {notes}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(out.trim_end().to_string())
}

pub fn progress(event: &Event, progress: ProgressSummary, json: bool) -> Result<String> {
    if json {
        return to_json(&ProgressDto::from(progress));
    }
    Ok(format!(
        "{}\n  packed:    {:>3}% ({}/{})\n  delivered: {:>3}% ({}/{})",
        event.title,
        progress.packed_percentage,
        progress.packed_count,
        progress.total_items,
        progress.delivered_percentage,
        progress.delivered_count,
        progress.total_items
    ))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MembersView {
    members: Vec<MemberDto>,
    capabilities: CapabilitiesDto,
}

pub fn members(event: &Event, capabilities: Capabilities, json: bool) -> Result<String> {
    if json {
        return to_json(&MembersView {
            members: event.members.iter().map(MemberDto::from).collect(),
            capabilities: capabilities.into(),
        });
    }

    let mut out = String::new();
    writeln!(out, "{}", event.title)?;
    for m in &event.members {
        writeln!(out, "  {:<7} {} ({})", m.role.as_str(), m.name, m.user_id)?;
    }
    let role = capabilities.role.map_or("not a member", |r| r.as_str());
    writeln!(out, "You: {role}")?;
    writeln!(
        out,
        "  add items: {}, manage members: {}, delete event: {}",
        yes_no(capabilities.can_add_items),
        yes_no(capabilities.can_manage_members),
        yes_no(capabilities.can_delete_event)
    )?;
    Ok(out.trim_end().to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
