//! DOM Mutation Plans
//!
//! Refreshers turn a server snapshot into a list of patches; `apply`
//! carries them out against a [`Surface`]. Widgets and workload replace a
//! whole fragment, progress patches individual nodes in place.

use crate::error::BoardResult;
use crate::models::ProgressRecord;
use crate::surface::Surface;

#[derive(Debug, Clone, PartialEq)]
pub enum DomPatch {
    /// Swap the element `anchor_id` for its fresh copy inside `html`
    ReplaceAnchor { anchor_id: String, html: String },
    /// Set `style.width` to `pct%`
    SetWidth { element_id: String, pct: u32 },
    SetText { element_id: String, text: String },
}

/// Id prefixes of the progress views: dashboard card, projects table
pub const PROGRESS_VIEWS: [(&str, &str); 2] = [("bar-", "txt-"), ("proj-bar-", "proj-txt-")];

pub fn progress_plan(records: &[ProgressRecord]) -> Vec<DomPatch> {
    let mut plan = Vec::with_capacity(records.len() * PROGRESS_VIEWS.len() * 2);
    for record in records {
        let label = record.label();
        for (bar, txt) in PROGRESS_VIEWS {
            plan.push(DomPatch::SetWidth {
                element_id: format!("{}{}", bar, record.id),
                pct: record.pct,
            });
            plan.push(DomPatch::SetText {
                element_id: format!("{}{}", txt, record.id),
                text: label.clone(),
            });
        }
    }
    plan
}

pub fn fragment_plan(anchor_id: &str, html: String) -> Vec<DomPatch> {
    vec![DomPatch::ReplaceAnchor {
        anchor_id: anchor_id.to_string(),
        html,
    }]
}

/// Apply a plan. Patches whose target is missing are skipped.
/// Returns how many patches landed.
pub fn apply<S: Surface>(surface: &S, plan: Vec<DomPatch>) -> BoardResult<usize> {
    let mut landed = 0;
    for patch in plan {
        let hit = match patch {
            DomPatch::ReplaceAnchor { anchor_id, html } => surface.replace_anchor(&anchor_id, &html)?,
            DomPatch::SetWidth { element_id, pct } => surface.set_width_pct(&element_id, pct),
            DomPatch::SetText { element_id, text } => surface.set_text(&element_id, &text),
        };
        if hit {
            landed += 1;
        }
    }
    Ok(landed)
}
