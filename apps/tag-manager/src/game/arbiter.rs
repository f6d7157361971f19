use tracing::{debug, info};

use super::field::FieldView;
use crate::domain::tag::events::TagEvent;
use crate::domain::tag::{TagOutcome, TagReason, TagRequest, TagResolution, TagStateStore};

/// Resolves queued tag requests against the current field
///
/// Requests are resolved one after another, so a tag landed by an earlier
/// request in the batch is visible to later ones.
#[derive(Debug, Clone, Copy)]
pub struct Arbiter<'a> {
    field: FieldView<'a>,
}

impl<'a> Arbiter<'a> {
    pub fn new(field: FieldView<'a>) -> Self {
        Self { field }
    }

    /// Resolves a whole batch in arrival order
    pub fn resolve_batch(
        &self,
        requests: impl IntoIterator<Item = TagRequest>,
        store: &mut TagStateStore,
        now: f64,
    ) -> Vec<TagEvent> {
        requests
            .into_iter()
            .flat_map(|request| self.resolve(request, store, now))
            .collect()
    }

    /// Resolves a single request
    ///
    /// Returns a [`TagEvent::Resolved`] for the request, followed by a
    /// [`TagEvent::Tagged`] when the tag landed.
    pub fn resolve(&self, request: TagRequest, store: &mut TagStateStore, now: f64) -> Vec<TagEvent> {
        let rules = self.field.rules;
        let name = request.requester.clone();

        let gates = rules.check_gates(
            store.get(&name),
            request.team.as_deref(),
            request.position,
            self.field.zones,
            now,
        );

        if let Err(reason) = gates {
            store.entry(&name).record_rejection(reason);
            info!(seq = request.seq, requester = %name, %reason, "Tag request rejected");
            return vec![TagEvent::Resolved(TagResolution {
                request,
                outcome: TagOutcome::Rejected { reason },
                candidates: Vec::new(),
            })];
        }

        store.entry(&name).counters.accepted += 1;

        let candidates = rules.candidates(
            &name,
            request.team.as_deref(),
            request.position,
            self.field.registry,
            self.field.zones,
            store,
        );
        debug!(seq = request.seq, requester = %name, candidates = candidates.len(), "Candidate search done");

        let nearest = candidates.first().filter(|c| rules.in_range(c)).cloned();

        let Some(target) = nearest else {
            info!(seq = request.seq, requester = %name, "Tag request missed");
            return vec![TagEvent::Resolved(TagResolution {
                request,
                outcome: TagOutcome::Accepted,
                candidates,
            })];
        };

        store.tag(&target.name, TagReason::Enemy, now);
        let requester_state = store.entry(&name);
        requester_state.last_own_tag = Some(now);
        requester_state.counters.succeeded += 1;

        let class = self.field.class_of(&target.name);
        info!(
            seq = request.seq,
            requester = %name,
            target = %target.name,
            range = target.range,
            "Tag landed"
        );

        vec![
            TagEvent::Resolved(TagResolution {
                request,
                outcome: TagOutcome::Succeeded {
                    target: target.name.clone(),
                    class,
                    range: target.range,
                },
                candidates,
            }),
            TagEvent::Tagged {
                source: Some(name),
                target: target.name,
                reason: TagReason::Enemy,
                class,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::{AgentRecord, AgentRegistry, Position, PositionReport};
    use crate::domain::tag::{AgentClass, RejectReason, TagRules};
    use crate::domain::zone::ZoneCatalog;

    struct Field {
        registry: AgentRegistry,
        zones: ZoneCatalog,
        rules: TagRules,
    }

    impl Field {
        fn new() -> Self {
            let mut zones = ZoneCatalog::default();
            zones
                .configure_zone(0, "pts={0,0:120,0:120,-100:0,-100}".parse().unwrap())
                .unwrap();
            zones
                .configure_zone(1, "pts={0,-100:120,-100:120,-200:0,-200}".parse().unwrap())
                .unwrap();
            Self {
                registry: AgentRegistry::new(),
                zones,
                rules: TagRules::default(),
            }
        }

        fn add(&mut self, name: &str, team: &str, kind: &str, x: f64, y: f64) {
            let report = PositionReport {
                name: Some(name.to_string()),
                team: Some(team.to_string()),
                kind: Some(kind.to_string()),
                x: Some(x),
                y: Some(y),
                ..Default::default()
            };
            self.registry
                .update_agent(AgentRecord::from_report(report, 0.0).unwrap(), &["red", "blue"]);
        }

        fn arbiter(&self) -> Arbiter<'_> {
            Arbiter::new(FieldView {
                registry: &self.registry,
                zones: &self.zones,
                rules: &self.rules,
                human_platform: "mokai",
            })
        }

        fn request(&self, seq: u64, name: &str) -> TagRequest {
            let record = self.registry.get(name).unwrap();
            TagRequest {
                seq,
                requester: name.to_string(),
                team: record.team().map(str::to_string),
                position: record.position(),
                submitted_at: 0.0,
            }
        }
    }

    fn outcome(events: &[TagEvent]) -> &TagOutcome {
        match &events[0] {
            TagEvent::Resolved(resolution) => &resolution.outcome,
            other => panic!("Expected resolution, got {:?}", other),
        }
    }

    #[test]
    fn test_tag_lands_on_nearest_intruder() {
        let mut field = Field::new();
        field.add("red1", "red", "kayak", 10.0, -10.0);
        field.add("blue1", "blue", "mokai", 15.0, -12.0);
        let mut store = TagStateStore::new();

        let events = field.arbiter().resolve(field.request(1, "red1"), &mut store, 50.0);

        assert_eq!(events.len(), 2);
        match outcome(&events) {
            TagOutcome::Succeeded { target, class, .. } => {
                assert_eq!(target, "blue1");
                assert_eq!(*class, AgentClass::Human);
            }
            other => panic!("Expected success, got {:?}", other),
        }
        assert!(store.is_tagged("blue1"));
        assert_eq!(store.get("blue1").unwrap().reason, TagReason::Enemy);
        assert_eq!(store.get("red1").unwrap().last_own_tag, Some(50.0));
        assert_eq!(store.get("red1").unwrap().counters.accepted, 1);
        assert_eq!(store.get("red1").unwrap().counters.succeeded, 1);
    }

    #[test]
    fn test_out_of_range_is_accepted_with_ranges() {
        let mut field = Field::new();
        field.add("red1", "red", "kayak", 0.0, -10.0);
        field.add("blue1", "blue", "kayak", 100.0, -10.0);
        let mut store = TagStateStore::new();

        let events = field.arbiter().resolve(field.request(1, "red1"), &mut store, 0.0);

        assert_eq!(events.len(), 1);
        assert_eq!(outcome(&events), &TagOutcome::Accepted);
        match &events[0] {
            TagEvent::Resolved(resolution) => assert_eq!(resolution.candidates.len(), 1),
            _ => unreachable!(),
        }
        assert!(!store.is_tagged("blue1"));
        assert_eq!(store.get("red1").unwrap().last_own_tag, None);
    }

    #[test]
    fn test_rejection_counts_and_leaves_target_alone() {
        let mut field = Field::new();
        field.add("red1", "red", "kayak", 10.0, -150.0);
        field.add("blue1", "blue", "kayak", 12.0, -150.0);
        let mut store = TagStateStore::new();

        let events = field.arbiter().resolve(field.request(1, "red1"), &mut store, 0.0);

        assert_eq!(outcome(&events), &TagOutcome::Rejected { reason: RejectReason::Zone });
        assert_eq!(store.get("red1").unwrap().counters.rejected_zone, 1);
        assert_eq!(store.get("red1").unwrap().counters.accepted, 0);
        assert!(!store.is_tagged("blue1"));
    }

    #[test]
    fn test_batch_sees_earlier_tags() {
        let mut field = Field::new();
        field.add("red1", "red", "kayak", 10.0, -10.0);
        field.add("red2", "red", "kayak", 12.0, -10.0);
        field.add("blue1", "blue", "kayak", 15.0, -12.0);
        let mut store = TagStateStore::new();

        let requests = vec![field.request(1, "red1"), field.request(2, "red2")];
        let events = field.arbiter().resolve_batch(requests, &mut store, 0.0);

        let outcomes: Vec<&TagOutcome> = events
            .iter()
            .filter_map(|e| match e {
                TagEvent::Resolved(r) => Some(&r.outcome),
                _ => None,
            })
            .collect();
        assert!(matches!(outcomes[0], TagOutcome::Succeeded { .. }));
        assert_eq!(outcomes[1], &TagOutcome::Accepted);
    }

    #[test]
    fn test_tagged_requester_cannot_tag() {
        let mut field = Field::new();
        field.add("red1", "red", "kayak", 10.0, -10.0);
        field.add("blue1", "blue", "kayak", 15.0, -12.0);
        let mut store = TagStateStore::new();
        store.tag("red1", TagReason::Boundary, 0.0);

        let events = field.arbiter().resolve(field.request(1, "red1"), &mut store, 1.0);

        assert_eq!(outcome(&events), &TagOutcome::Rejected { reason: RejectReason::SelfTagged });
        assert_eq!(store.get("red1").unwrap().counters.rejected_self, 1);
    }

    #[test]
    fn test_snapshot_position_is_used() {
        let mut field = Field::new();
        field.add("red1", "red", "kayak", 10.0, -10.0);
        field.add("blue1", "blue", "kayak", 15.0, -12.0);
        let mut request = field.request(1, "red1");
        request.position = Position::new(10.0, -150.0);
        let mut store = TagStateStore::new();

        let events = field.arbiter().resolve(request, &mut store, 0.0);
        assert_eq!(outcome(&events), &TagOutcome::Rejected { reason: RejectReason::Zone });
    }
}
