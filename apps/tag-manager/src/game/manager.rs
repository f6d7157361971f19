use tracing::{debug, info, warn};

use super::arbiter::Arbiter;
use super::errors::{TagError, TagResult};
use super::field::FieldView;
use super::messages::{InboundMessage, MailEnvelope};
use super::notifications::{NotificationEngine, Post};
use super::snapshot::{AgentStatus, Diagnostics, FieldSnapshot};
use super::sweepers::{advisory_sweep, boundary_sweep, expiry_sweep};
use super::visuals;
use crate::config::TagConfig;
use crate::domain::agent::{AgentRecord, AgentRegistry, PositionReport, TeamBinding};
use crate::domain::tag::events::{ReleaseCause, TagEvent};
use crate::domain::tag::{
    AgentClass, TagOutcome, TagReason, TagRequest, TagResolution, TagStateStore,
};

/// Source name used in tag posts for boundary tags
pub const BOUNDARY_SOURCE: &str = "tag_manager";

/// Owns all game state and runs the tag cycle
///
/// Inbound messages are applied as they arrive, except tag requests which
/// are queued and resolved together by [`TagManager::run_cycle`]. Every
/// outbound post, including those caused by inbound messages, is handed out
/// by the next `run_cycle` call.
#[derive(Debug)]
pub struct TagManager {
    config: TagConfig,
    registry: AgentRegistry,
    store: TagStateStore,
    notifier: NotificationEngine,
    pending: Vec<TagRequest>,
    outbox: Vec<Post>,
    tag_events: u64,
    cycles: u64,
    start_time: Option<f64>,
    last_onfield_post: Option<f64>,
    diagnostics: Diagnostics,
}

impl TagManager {
    /// Creates a manager; the zone polygons are queued for the first cycle
    pub fn new(config: TagConfig) -> Self {
        let notifier = NotificationEngine::new(config.templates.clone(), config.notag_gap);
        let mut manager = Self {
            config,
            registry: AgentRegistry::new(),
            store: TagStateStore::new(),
            notifier,
            pending: Vec::new(),
            outbox: Vec::new(),
            tag_events: 0,
            cycles: 0,
            start_time: None,
            last_onfield_post: None,
            diagnostics: Diagnostics::default(),
        };
        manager.announce_zones();
        manager
    }

    pub fn config(&self) -> &TagConfig {
        &self.config
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn store(&self) -> &TagStateStore {
        &self.store
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Counts config warnings found before the manager existed
    pub fn note_config_warnings(&mut self, count: usize) {
        self.diagnostics.config_warnings += count as u64;
    }

    /// Tag requests waiting for the next cycle
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Decodes and applies bus mail
    pub fn handle_mail(&mut self, mail: &MailEnvelope, now: f64) -> TagResult<()> {
        match InboundMessage::from_mail(mail) {
            Ok(message) => self.handle_message(message, now),
            Err(TagError::UnhandledMail(key)) => {
                self.diagnostics.unhandled_mail += 1;
                warn!(key = %key, "Unhandled Mail");
                Err(TagError::UnhandledMail(key))
            }
            Err(TagError::MalformedReport(reason)) => Err(self.reject_report(reason)),
            Err(e) => {
                self.diagnostics.run_warnings += 1;
                warn!(error = %e, "Rejected mail");
                Err(e)
            }
        }
    }

    pub fn handle_message(&mut self, message: InboundMessage, now: f64) -> TagResult<()> {
        match message {
            InboundMessage::Report(report) => self.update_agent(report, now),
            InboundMessage::TagRequest { vname } => self.request_tag(&vname, now).map(|_| ()),
            InboundMessage::UntagRequest { vname } => self.request_untag(&vname, now).map(|_| ()),
            InboundMessage::AnnounceZones => {
                self.announce_zones();
                Ok(())
            }
        }
    }

    /// Counts a report that could not be decoded
    pub fn reject_report(&mut self, reason: String) -> TagError {
        self.diagnostics.reports_received += 1;
        self.diagnostics.reports_dropped += 1;
        warn!(reason = %reason, "Dropped malformed node report");
        TagError::MalformedReport(reason)
    }

    /// Stores a position report, latest wins
    ///
    /// Reports without a team or with a team no zone belongs to are kept
    /// but raise a run warning.
    pub fn update_agent(&mut self, report: PositionReport, now: f64) -> TagResult<()> {
        self.start(now);
        self.diagnostics.reports_received += 1;

        let record = AgentRecord::from_report(report, now).map_err(|reason| {
            self.diagnostics.reports_dropped += 1;
            warn!(reason = %reason, "Dropped position report");
            TagError::MalformedReport(reason)
        })?;

        let name = record.name().to_string();
        let teams = self.config.zones.teams();
        match self.registry.update_agent(record, &teams) {
            TeamBinding::Member => {}
            TeamBinding::NoTeam => {
                self.diagnostics.run_warnings += 1;
                warn!(agent = %name, "Node report with no group");
            }
            TeamBinding::UnknownTeam(team) => {
                self.diagnostics.run_warnings += 1;
                warn!(agent = %name, team = %team, "Node report with unknown team");
            }
        }
        Ok(())
    }

    /// Queues a tag request for the next cycle
    ///
    /// The requester's position is captured now. Returns the event number.
    pub fn request_tag(&mut self, vname: &str, now: f64) -> TagResult<u64> {
        self.start(now);

        let Some(record) = self.registry.get(vname) else {
            self.diagnostics.unknown_vehicle_requests += 1;
            let err = TagError::UnknownVehicle(vname.to_string());
            warn!(error = %err, "Tag request refused");
            self.outbox
                .push(Post::text("TAG_RESULT_VERBOSE", format!("Failed VTag Post: {}", err)));
            return Err(err);
        };

        self.tag_events += 1;
        let request = TagRequest {
            seq: self.tag_events,
            requester: vname.to_string(),
            team: record.team().map(str::to_string),
            position: record.position(),
            submitted_at: now,
        };
        self.store.entry(vname).counters.requested += 1;

        debug!(seq = request.seq, requester = %vname, "Tag request queued");
        self.pending.push(request);
        Ok(self.tag_events)
    }

    /// Releases a tag right away
    ///
    /// Returns `Ok(false)` when the agent was not tagged.
    pub fn request_untag(&mut self, vname: &str, now: f64) -> TagResult<bool> {
        self.start(now);

        if !self.registry.contains(vname) {
            self.diagnostics.unknown_vehicle_requests += 1;
            let err = TagError::UnknownVehicle(vname.to_string());
            warn!(error = %err, "Untag request refused");
            self.outbox
                .push(Post::text("TAG_RELEASE_VERBOSE", format!("Failed VUntag Post: {}", err)));
            return Err(err);
        }

        if !self.store.release(vname) {
            return Ok(false);
        }

        info!(agent = %vname, "Untag requested");
        let class = FieldView::new(&self.registry, &self.config).class_of(vname);
        self.publish(
            TagEvent::Released {
                target: vname.to_string(),
                class,
                cause: ReleaseCause::Requested,
            },
            now,
        );
        Ok(true)
    }

    /// Queues the zone polygons and their post variables
    pub fn announce_zones(&mut self) {
        for zone in self.config.zones.iter() {
            let spec = zone.spec();
            self.outbox.push(Post::text("VIEW_POLYGON", spec.clone()));
            if let Some(var) = zone.post_var() {
                self.outbox.push(Post::text(var, spec));
            }
        }
    }

    /// Runs one cycle and returns every post produced since the last one
    pub fn run_cycle(&mut self, now: f64) -> Vec<Post> {
        self.start(now);
        self.cycles += 1;

        let requests = std::mem::take(&mut self.pending);
        let field = FieldView::new(&self.registry, &self.config);

        let mut events = Arbiter::new(field).resolve_batch(requests, &mut self.store, now);
        events.extend(advisory_sweep(field, &mut self.store, now));
        events.extend(expiry_sweep(field, &mut self.store, now));
        events.extend(boundary_sweep(field, &mut self.store, now));

        debug!(cycle = self.cycles, events = events.len(), "Cycle resolved");
        for event in events {
            self.publish(event, now);
        }

        self.reannounce_on_field(now);
        self.outbox
            .push(Post::text("TAGGED_VEHICLES", self.store.tagged_names().join(",")));
        if self.config.tag_circle {
            self.post_tag_circles();
        }

        std::mem::take(&mut self.outbox)
    }

    /// Read-only view for the transport; `recent_posts` is left empty
    pub fn snapshot(&self, now: f64) -> FieldSnapshot {
        let duration = self.config.rules.duration;
        let agents = self
            .registry
            .iter()
            .map(|record| {
                let tag = self.store.get(record.name()).cloned().unwrap_or_default();
                AgentStatus {
                    class: AgentClass::of(record.kind(), &self.config.human_platform),
                    reports: self.registry.report_count(record.name()),
                    time_remaining: tag.time_remaining(duration, now),
                    record: record.clone(),
                    tag,
                }
            })
            .collect();

        FieldSnapshot {
            cycle: self.cycles,
            time: now,
            elapsed: self.elapsed(now),
            tagged: self.store.tagged_names(),
            agents,
            teams: self.registry.roster(),
            zones: self.config.zones.iter().cloned().collect(),
            rules: Some(self.config.rules),
            tag_events: self.tag_events,
            diagnostics: self.diagnostics.clone(),
            recent_posts: Vec::new(),
        }
    }

    fn start(&mut self, now: f64) {
        self.start_time.get_or_insert(now);
    }

    fn elapsed(&self, now: f64) -> f64 {
        self.start_time.map(|start| now - start).unwrap_or(0.0)
    }

    /// Turns a domain event into outbound posts
    fn publish(&mut self, event: TagEvent, now: f64) {
        match event {
            TagEvent::Resolved(resolution) => self.publish_resolution(resolution, now),
            TagEvent::Tagged {
                source,
                target,
                reason,
                class,
            } => {
                let source = source.as_deref().unwrap_or(BOUNDARY_SOURCE);
                info!(source = %source, target = %target, %reason, "Agent tagged");
                let posts = self.notifier.tag_posts(class, source, &target, now);
                self.outbox.extend(posts);
                self.outbox
                    .push(Post::flag(format!("TAGGED_{}", target.to_uppercase()), true));
            }
            TagEvent::Released { target, class, cause } => {
                debug!(agent = %target, ?cause, "Agent released");
                let posts = self.notifier.untag_posts(class, &target, now);
                self.outbox.extend(posts);

                let msg = format!("vname={},time={:.2}", target, self.elapsed(now));
                let up = target.to_uppercase();
                self.outbox.push(Post::text("TAG_RELEASE_VERBOSE", msg.clone()));
                self.outbox.push(Post::text(format!("TAG_RELEASE_{}", up), msg));
                self.outbox.push(Post::flag(format!("TAGGED_{}", up), false));
                self.outbox.push(visuals::clear_circle(&target));
            }
            TagEvent::CanTagChanged { agent, can_tag } => {
                self.outbox
                    .push(Post::flag(format!("CANTAG_{}", agent.to_uppercase()), can_tag));
            }
            TagEvent::OnFieldChanged { agent, on_field } => {
                self.outbox
                    .push(Post::flag(format!("ONFIELD_{}", agent.to_uppercase()), on_field));
            }
        }
    }

    fn publish_resolution(&mut self, resolution: TagResolution, now: f64) {
        let TagResolution {
            request,
            outcome,
            candidates,
        } = resolution;
        let team = request.team.clone().unwrap_or_default();

        if outcome.passed_gates() {
            let mut by_name: Vec<_> = candidates.iter().collect();
            by_name.sort_by(|a, b| a.name.cmp(&b.name));
            let ranges: Vec<String> = by_name
                .iter()
                .map(|c| format!("{}:{:.1}", c.name, c.range))
                .collect();
            self.outbox.push(Post::text(
                "TAG_RESULT_VERBOSE",
                format!("event={},src={},ranges={}", request.seq, request.requester, ranges.join("#")),
            ));
        }

        match &outcome {
            TagOutcome::Succeeded { target, .. } => {
                if let Some(record) = self.registry.get(target) {
                    self.outbox.push(visuals::comms_pulse(
                        &request.requester,
                        target,
                        request.position,
                        record.position(),
                        &self.config.post_color,
                        now,
                    ));
                }
            }
            TagOutcome::Accepted if !candidates.is_empty() => {
                self.outbox.push(visuals::range_pulse(
                    &format!("{}_vtag", request.requester),
                    request.position,
                    self.config.rules.tag_range,
                    &self.config.post_color,
                    now,
                ));
            }
            _ => {}
        }

        let result = format!(
            "event={},src={},team={},{}",
            request.seq,
            request.requester,
            team,
            outcome.result_field()
        );
        info!(result = %result, "Tag result");
        self.outbox.push(Post::text(
            format!("TAG_RESULT_{}", request.requester.to_uppercase()),
            result,
        ));

        let missed = match outcome {
            TagOutcome::Rejected { reason } => Some(Some(reason)),
            TagOutcome::Accepted => Some(None),
            TagOutcome::Succeeded { .. } => None,
        };
        if let Some(reason) = missed {
            let reason = NotificationEngine::notag_reason(reason);
            let posts = self.notifier.notag_posts(&request.requester, &team, reason, now);
            self.outbox.extend(posts);
        }
    }

    fn reannounce_on_field(&mut self, now: f64) {
        let due = self
            .last_onfield_post
            .map_or(true, |last| now - last > self.config.onfield_post_interval);
        if !due {
            return;
        }
        self.last_onfield_post = Some(now);

        let posts: Vec<Post> = self
            .store
            .iter()
            .filter_map(|(name, state)| {
                state
                    .on_field
                    .map(|on_field| Post::flag(format!("ONFIELD_{}", name.to_uppercase()), on_field))
            })
            .collect();
        self.outbox.extend(posts);
    }

    fn post_tag_circles(&mut self) {
        let circles: Vec<Post> = self
            .store
            .iter()
            .filter(|(_, state)| state.now_tagged)
            .filter_map(|(name, state)| {
                let record = self.registry.get(name)?;
                let color = if state.reason == TagReason::Boundary {
                    &self.config.oob_circle_color
                } else {
                    &self.config.tag_circle_color
                };
                Some(visuals::tag_circle(
                    name,
                    record.position(),
                    self.config.tag_circle_range,
                    color,
                ))
            })
            .collect();
        self.outbox.extend(circles);
    }
}
