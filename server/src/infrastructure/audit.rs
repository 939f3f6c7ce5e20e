use tracing::{info, info_span, warn};

/// Security-relevant events, logged on the `audit` target so a subscriber
/// can route them separately.
#[derive(Debug)]
pub enum AuditEvent {
    /// The server finished starting.
    SystemStartup {
        /// Component that started.
        component: String,
    },
    /// The server is shutting down.
    SystemShutdown {
        /// Why.
        reason: String,
    },
    /// A gated route refused a request.
    AccessDenied {
        /// Route that was refused.
        resource: String,
        /// Whether the request carried a password at all.
        credentials_present: bool,
    },
}

/// Logs an audit event to the dedicated audit channel.
pub fn log_audit(event: AuditEvent) {
    let span = info_span!(target: "audit", "audit_event");
    let _enter = span.enter();

    match &event {
        AuditEvent::AccessDenied { .. } => {
            warn!(target: "audit", event = ?event, "Security Audit Event");
        }
        _ => info!(target: "audit", event = ?event, "Security Audit Event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_audit_variants() {
        log_audit(AuditEvent::SystemStartup {
            component: "Test".into(),
        });
        log_audit(AuditEvent::SystemShutdown {
            reason: "Testing".into(),
        });
        log_audit(AuditEvent::AccessDenied {
            resource: "/api/files".into(),
            credentials_present: false,
        });
    }
}
