// Inbound message types
//
// Everything the transport can hand to the game loop, in typed form, plus
// the parser for the key/value mail envelope used on the message bus.

use serde::{Deserialize, Serialize};

use super::errors::{TagError, TagResult};
use crate::domain::agent::PositionReport;

/// Raw mail as it travels on the bus: a variable name and a string value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailEnvelope {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// A message for the game loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundMessage {
    Report(PositionReport),
    TagRequest { vname: String },
    UntagRequest { vname: String },
    /// A display connected and wants the zone polygons
    AnnounceZones,
}

impl InboundMessage {
    /// Decodes bus mail
    ///
    /// # Recognized keys
    /// - `NODE_REPORT`, `NODE_REPORT_LOCAL` - node report string
    /// - `TAG_REQUEST`, `UNTAG_REQUEST` - `vname=<name>`; a missing name
    ///   decodes as empty and is refused later as an unknown vehicle
    /// - `PMV_CONNECT` - value ignored
    ///
    /// # Example
    /// ```
    /// use tag_manager::game::messages::{InboundMessage, MailEnvelope};
    ///
    /// let mail = MailEnvelope { key: "TAG_REQUEST".into(), value: "vname=henry".into() };
    /// let msg = InboundMessage::from_mail(&mail).unwrap();
    /// assert_eq!(msg, InboundMessage::TagRequest { vname: "henry".into() });
    /// ```
    pub fn from_mail(mail: &MailEnvelope) -> TagResult<Self> {
        match mail.key.trim() {
            "NODE_REPORT" | "NODE_REPORT_LOCAL" => mail
                .value
                .parse::<PositionReport>()
                .map(InboundMessage::Report)
                .map_err(TagError::MalformedReport),
            "TAG_REQUEST" => Ok(InboundMessage::TagRequest {
                vname: vname_field(&mail.value),
            }),
            "UNTAG_REQUEST" => Ok(InboundMessage::UntagRequest {
                vname: vname_field(&mail.value),
            }),
            "PMV_CONNECT" => Ok(InboundMessage::AnnounceZones),
            other => Err(TagError::UnhandledMail(other.to_string())),
        }
    }
}

fn vname_field(value: &str) -> String {
    value
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("vname"))
        .map(|(_, v)| v.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(key: &str, value: &str) -> MailEnvelope {
        MailEnvelope {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn node_report_mail() {
        let msg = InboundMessage::from_mail(&mail("NODE_REPORT", "NAME=abe,X=1,Y=2,GROUP=red")).unwrap();
        match msg {
            InboundMessage::Report(report) => {
                assert_eq!(report.name.as_deref(), Some("abe"));
                assert_eq!(report.y, Some(2.0));
            }
            other => panic!("Expected report, got {:?}", other),
        }
    }

    #[test]
    fn local_node_report_is_accepted() {
        let msg = InboundMessage::from_mail(&mail("NODE_REPORT_LOCAL", "NAME=abe,X=1,Y=2")).unwrap();
        assert!(matches!(msg, InboundMessage::Report(_)));
    }

    #[test]
    fn empty_node_report_is_malformed() {
        let err = InboundMessage::from_mail(&mail("NODE_REPORT", "")).unwrap_err();
        assert_eq!(err.reason(), "malformed-report");
    }

    #[test]
    fn untag_request_mail() {
        let msg = InboundMessage::from_mail(&mail("UNTAG_REQUEST", "vname=betty")).unwrap();
        assert_eq!(msg, InboundMessage::UntagRequest { vname: "betty".to_string() });
    }

    #[test]
    fn vname_among_other_fields() {
        let msg = InboundMessage::from_mail(&mail("TAG_REQUEST", "src=x, VNAME = gus ")).unwrap();
        assert_eq!(msg, InboundMessage::TagRequest { vname: "gus".to_string() });
    }

    #[test]
    fn tag_request_without_vname_decodes_empty() {
        let msg = InboundMessage::from_mail(&mail("TAG_REQUEST", "vname=")).unwrap();
        assert_eq!(msg, InboundMessage::TagRequest { vname: String::new() });

        let msg = InboundMessage::from_mail(&mail("UNTAG_REQUEST", "")).unwrap();
        assert_eq!(msg, InboundMessage::UntagRequest { vname: String::new() });
    }

    #[test]
    fn display_connect() {
        let msg = InboundMessage::from_mail(&mail("PMV_CONNECT", "0")).unwrap();
        assert_eq!(msg, InboundMessage::AnnounceZones);
    }

    #[test]
    fn unknown_key() {
        let err = InboundMessage::from_mail(&mail("DEPLOY_ALL", "true")).unwrap_err();
        assert_eq!(err, TagError::UnhandledMail("DEPLOY_ALL".to_string()));
    }
}
