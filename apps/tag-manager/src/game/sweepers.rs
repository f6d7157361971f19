// Periodic sweepers
//
// Run once per cycle after the arbiter. Each sweep mutates the tag store
// and returns the events describing what changed.

use tracing::{debug, info};

use super::field::FieldView;
use crate::domain::tag::events::{ReleaseCause, TagEvent};
use crate::domain::tag::{TagReason, TagStateStore};

/// Recomputes advisory eligibility; emits only first observations and flips
pub fn advisory_sweep(field: FieldView<'_>, store: &mut TagStateStore, now: f64) -> Vec<TagEvent> {
    let mut events = Vec::new();

    for name in field.registry.names() {
        let eligible = store.is_eligible_to_tag(name, field.registry, field.zones, field.rules, now);
        let state = store.entry(name);
        if state.can_tag != Some(eligible) {
            state.can_tag = Some(eligible);
            debug!(agent = %name, can_tag = eligible, "Eligibility changed");
            events.push(TagEvent::CanTagChanged {
                agent: name.to_string(),
                can_tag: eligible,
            });
        }
    }

    events
}

/// Releases every tag that has run for the full duration
pub fn expiry_sweep(field: FieldView<'_>, store: &mut TagStateStore, now: f64) -> Vec<TagEvent> {
    let expired: Vec<String> = store
        .iter()
        .filter(|(_, state)| state.now_tagged)
        .filter(|(_, state)| {
            state
                .tagged_at
                .is_some_and(|at| field.rules.is_expired(at, now))
        })
        .map(|(name, _)| name.to_string())
        .collect();

    expired
        .into_iter()
        .filter(|name| store.release(name))
        .map(|name| {
            info!(agent = %name, "Tag expired");
            TagEvent::Released {
                class: field.class_of(&name),
                target: name,
                cause: ReleaseCause::Expired,
            }
        })
        .collect()
}

/// Tracks on-field status and force-tags agents that left both zones
///
/// Boundary tags skip the tagger gates entirely.
pub fn boundary_sweep(field: FieldView<'_>, store: &mut TagStateStore, now: f64) -> Vec<TagEvent> {
    let mut events = Vec::new();

    for record in field.registry.iter() {
        let name = record.name();
        let on_field = field.zones.on_field(record.position());

        let state = store.entry(name);
        if state.on_field != Some(on_field) {
            state.on_field = Some(on_field);
            events.push(TagEvent::OnFieldChanged {
                agent: name.to_string(),
                on_field,
            });
        }

        if !on_field && store.tag(name, TagReason::Boundary, now) {
            info!(agent = %name, position = %record.position(), "Agent out of bounds, tagged");
            events.push(TagEvent::Tagged {
                source: None,
                target: name.to_string(),
                reason: TagReason::Boundary,
                class: field.class_of(name),
            });
        }
    }

    events
}
