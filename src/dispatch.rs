// Fan a single push out to its targets. Each send runs on its own scoped
// thread and every thread is joined before `dispatch` returns, so the
// caller always sees one outcome per target.

use crate::api::{ApiClient, Device};
use crate::error::PushError;
use crate::push::PushRequest;
use std::thread;
use tracing::error;

/// Where a push goes: a single device, or every device on the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Device(Device),
    Broadcast,
}

impl Target {
    pub fn device_id(&self) -> Option<&str> {
        match self {
            Target::Device(device) => Some(&device.id),
            Target::Broadcast => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Target::Device(device) => &device.display_name,
            Target::Broadcast => "all devices",
        }
    }
}

/// Result of sending to one target.
#[derive(Debug)]
pub struct SendOutcome {
    pub target: Target,
    pub result: Result<(), PushError>,
}

impl SendOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Send `request` to every target and wait for all of them. Outcomes are
/// returned in the order of `targets`.
pub fn dispatch(
    api: &ApiClient,
    api_key: &str,
    targets: &[Target],
    request: &PushRequest,
) -> Vec<SendOutcome> {
    thread::scope(|scope| {
        let handles: Vec<_> = targets
            .iter()
            .map(|target| {
                scope.spawn(move || api.send_push(api_key, target.device_id(), request))
            })
            .collect();

        handles
            .into_iter()
            .zip(targets)
            .map(|(handle, target)| {
                let result = handle.join().unwrap_or_else(|_| {
                    error!(device = target.label(), "send thread panicked");
                    Err(std::io::Error::other("send thread panicked").into())
                });
                SendOutcome {
                    target: target.clone(),
                    result,
                }
            })
            .collect()
    })
}

/// Print one line per outcome.
pub fn report(outcomes: &[SendOutcome]) {
    for outcome in outcomes {
        match &outcome.result {
            Ok(()) => println!("Pushed to {}", outcome.target.label()),
            Err(e) => println!("Push to {} failed: {}", outcome.target.label(), e),
        }
    }
}

/// Number of outcomes that did not succeed.
pub fn failures(outcomes: &[SendOutcome]) -> usize {
    outcomes.iter().filter(|outcome| !outcome.is_ok()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn note() -> PushRequest {
        PushRequest::Note {
            title: "t".into(),
            body: "b".into(),
        }
    }

    #[test]
    fn target_ids_and_labels() {
        let device = Target::Device(Device {
            id: "abc".into(),
            display_name: "Laptop".into(),
        });
        assert_eq!(device.device_id(), Some("abc"));
        assert_eq!(device.label(), "Laptop");
        assert_eq!(Target::Broadcast.device_id(), None);
        assert_eq!(Target::Broadcast.label(), "all devices");
    }

    #[test]
    fn no_targets_means_no_outcomes() {
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        assert!(dispatch(&api, "key", &[], &note()).is_empty());
    }

    #[test]
    fn unreachable_server_fails_every_target_in_order() {
        // Port 9 (discard) is closed on test machines; connecting fails fast.
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let targets = vec![
            Target::Device(Device {
                id: "one".into(),
                display_name: "One".into(),
            }),
            Target::Broadcast,
        ];
        let outcomes = dispatch(&api, "key", &targets, &note());
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].target, targets[0]);
        assert_eq!(outcomes[1].target, targets[1]);
        assert!(outcomes.iter().all(|o| !o.is_ok()));
        assert_eq!(failures(&outcomes), 2);
        report(&outcomes);
    }
}
