// Display specs posted for viewers: range pulses, comms pulses, tag circles

use super::notifications::Post;
use crate::domain::agent::Position;

/// Expanding ring around a tagger whose request found nobody in range
pub fn range_pulse(label: &str, at: Position, radius: f64, color: &str, now: f64) -> Post {
    Post::text(
        "VIEW_RANGE_PULSE",
        format!(
            "x={},y={},radius={},duration=4,fill=0.6,fill_invariant=true,linger=2,label={},edge_color={},fill_color={},time={:.2}",
            at.x, at.y, radius, label, color, color, now
        ),
    )
}

/// Beam from tagger to target on a landed tag
pub fn comms_pulse(source: &str, target: &str, from: Position, to: Position, color: &str, now: f64) -> Post {
    Post::text(
        "VIEW_COMMS_PULSE",
        format!(
            "label={}2{},sx={},sy={},tx={},ty={},beam_width=7,duration=4,fill=0.6,fill_color={},time={:.2}",
            source, target, from.x, from.y, to.x, to.y, color, now
        ),
    )
}

/// Circle drawn around a tagged agent
pub fn tag_circle(name: &str, at: Position, radius: f64, color: &str) -> Post {
    Post::text(
        "VIEW_CIRCLE",
        format!(
            "x={},y={},radius={},label={},edge_color={},fill_color={},fill_transparency=0.2",
            at.x, at.y, radius, name, color, color
        ),
    )
}

/// Erases the circle for an agent that is no longer tagged
pub fn clear_circle(name: &str) -> Post {
    Post::text("VIEW_CIRCLE", format!("label={},active=false", name))
}
