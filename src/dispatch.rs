//! Rule evaluation and OSC message construction.

use crate::error::{Error, Result, TransportError};
use midiosc_rules::{expand_param, Destination, MessageTemplate, RawEvent, RuleSet, Value};
use rosc::{encoder, OscMessage, OscPacket, OscType};
use std::net::{ToSocketAddrs, UdpSocket};
use std::ops::AddAssign;
use tracing::{debug, trace, warn};

/// Sends complete OSC messages somewhere. Called from the consumer thread
/// only; implementations may block.
pub trait OscTransport: Send {
    fn send(&self, message: &OscMessage) -> std::result::Result<(), TransportError>;
}

impl<T: OscTransport + ?Sized> OscTransport for Box<T> {
    fn send(&self, message: &OscMessage) -> std::result::Result<(), TransportError> {
        (**self).send(message)
    }
}

/// Fire-and-forget UDP sender.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    destination: Destination,
}

impl UdpTransport {
    /// Resolve `destination` and bind an ephemeral local socket to it.
    pub fn connect(destination: &Destination) -> std::result::Result<Self, TransportError> {
        let addr = (destination.host.as_str(), destination.port)
            .to_socket_addrs()
            .map_err(|_| TransportError::Resolve(destination.to_string()))?
            .next()
            .ok_or_else(|| TransportError::Resolve(destination.to_string()))?;

        let local = if addr.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" };
        let socket = UdpSocket::bind(local)?;
        socket.connect(addr)?;

        Ok(Self {
            socket,
            destination: destination.clone(),
        })
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }
}

impl OscTransport for UdpTransport {
    fn send(&self, message: &OscMessage) -> std::result::Result<(), TransportError> {
        let packet = OscPacket::Message(message.clone());
        let bytes = encoder::encode(&packet).map_err(|e| TransportError::Encode {
            address: message.addr.clone(),
            reason: format!("{:?}", e),
        })?;
        self.socket.send(&bytes)?;
        Ok(())
    }
}

/// Counters for one or more dispatched events.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub events: u64,
    pub rules_matched: u64,
    pub sent: u64,
    /// Messages dropped because a parameter failed to expand.
    pub abandoned: u64,
    pub transport_failures: u64,
}

impl AddAssign for DispatchStats {
    fn add_assign(&mut self, other: Self) {
        self.events += other.events;
        self.rules_matched += other.rules_matched;
        self.sent += other.sent;
        self.abandoned += other.abandoned;
        self.transport_failures += other.transport_failures;
    }
}

/// Build the OSC message for one template and event.
///
/// Fails on the first parameter that does not expand, including unknown
/// type descriptors.
pub fn build_message(template: &MessageTemplate, event: &RawEvent) -> Result<OscMessage> {
    let args = template
        .args()
        .enumerate()
        .map(|(index, (descriptor, expr))| {
            expand_param(descriptor, expr, event)
                .map(osc_arg)
                .map_err(|failure| Error::Expand {
                    address: template.address().to_string(),
                    index,
                    source: failure.error,
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(OscMessage {
        addr: template.address().to_string(),
        args,
    })
}

fn osc_arg(value: Value) -> OscType {
    match value {
        Value::Int(v) => OscType::Int(v),
        Value::Float(v) => OscType::Float(v),
        Value::Str(v) => OscType::String(v),
    }
}

/// Matches events against rules and sends the resulting messages.
pub struct Dispatcher<T> {
    transport: T,
}

impl<T: OscTransport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Fire every matching rule, in declaration order. A message that fails
    /// to build or send is logged and skipped; the rest still go out.
    pub fn dispatch(&self, rules: &RuleSet, event: &RawEvent) -> DispatchStats {
        let mut stats = DispatchStats {
            events: 1,
            ..Default::default()
        };

        for (index, rule) in rules.matching(event) {
            debug!(rule = index, event = ?event, "rule matched");
            stats.rules_matched += 1;

            for template in rule.templates() {
                let message = match build_message(template, event) {
                    Ok(message) => message,
                    Err(e) => {
                        warn!("Abandoned OSC message: {}", e);
                        stats.abandoned += 1;
                        continue;
                    }
                };

                match self.transport.send(&message) {
                    Ok(()) => {
                        trace!(address = %message.addr, args = ?message.args, "TX");
                        stats.sent += 1;
                    }
                    Err(e) => {
                        warn!("Failed to send OSC message '{}': {}", message.addr, e);
                        stats.transport_failures += 1;
                    }
                }
            }
        }

        stats
    }
}

impl<T> std::fmt::Debug for Dispatcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midiosc_rules::{ExpandError, FieldSpec, Rule};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Collect {
        sent: Mutex<Vec<OscMessage>>,
        fail: bool,
    }

    impl OscTransport for Collect {
        fn send(&self, message: &OscMessage) -> std::result::Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::Resolve("nowhere".into()));
            }
            self.sent.lock().push(message.clone());
            Ok(())
        }
    }

    fn cc(controller: u8, value: u8) -> RawEvent {
        RawEvent::new(&[0xb2, controller, value], 100).unwrap()
    }

    fn rules() -> RuleSet {
        let filter = [FieldSpec::parse("CC", 0).unwrap()];
        let rule = Rule::any_length(&filter)
            .unwrap()
            .with_template(MessageTemplate::new("/cc", "iif", ["%c", "%1", "%2 [0,1]"]).unwrap())
            .with_template(MessageTemplate::new("/bad", "i", ["%q"]).unwrap())
            .with_template(MessageTemplate::new("/label", "s", [" %1 "]).unwrap());
        [rule].into_iter().collect()
    }

    #[test]
    fn test_build_message_types() {
        let template = MessageTemplate::new("/x", "ifs", ["%2", "%2", "%2"]).unwrap();
        let message = build_message(&template, &cc(7, 127)).unwrap();
        assert_eq!(message.addr, "/x");
        assert_eq!(
            message.args,
            vec![
                OscType::Int(127),
                OscType::Float(127.0),
                OscType::String("%2".into())
            ]
        );
    }

    #[test]
    fn test_unknown_descriptor_fails() {
        let template = MessageTemplate::new("/x", "ih", ["1", "2"]).unwrap();
        let err = build_message(&template, &cc(7, 0)).unwrap_err();
        assert!(matches!(
            err,
            Error::Expand {
                index: 1,
                source: ExpandError::UnknownDescriptor('h'),
                ..
            }
        ));
    }

    #[test]
    fn test_bad_template_does_not_stop_the_rest() {
        let dispatcher = Dispatcher::new(Collect::default());
        let stats = dispatcher.dispatch(&rules(), &cc(1, 127));
        assert_eq!(stats.rules_matched, 1);
        assert_eq!(stats.sent, 2);
        assert_eq!(stats.abandoned, 1);

        let sent = dispatcher.transport().sent.lock();
        assert_eq!(sent[0].addr, "/cc");
        assert_eq!(
            sent[0].args,
            vec![OscType::Int(2), OscType::Int(1), OscType::Float(1.0)]
        );
        assert_eq!(sent[1].args, vec![OscType::String(" %1 ".into())]);
    }

    #[test]
    fn test_transport_failures_are_counted() {
        let dispatcher = Dispatcher::new(Collect {
            fail: true,
            ..Default::default()
        });
        let stats = dispatcher.dispatch(&rules(), &cc(1, 0));
        assert_eq!(stats.transport_failures, 2);
        assert_eq!(stats.sent, 0);
    }

    #[test]
    fn test_no_match_no_output() {
        let dispatcher = Dispatcher::new(Collect::default());
        let note = RawEvent::new(&[0x90, 60, 100], 0).unwrap();
        let stats = dispatcher.dispatch(&rules(), &note);
        assert_eq!(stats, DispatchStats { events: 1, ..Default::default() });
    }

    #[test]
    fn test_udp_transport_delivers() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = receiver.local_addr().unwrap().port();
        let transport = UdpTransport::connect(&Destination::new("127.0.0.1", port)).unwrap();

        let message = OscMessage {
            addr: "/ping".into(),
            args: vec![OscType::Int(1)],
        };
        transport.send(&message).unwrap();

        let mut buf = [0u8; 256];
        receiver
            .set_read_timeout(Some(std::time::Duration::from_secs(2)))
            .unwrap();
        let len = receiver.recv(&mut buf).unwrap();
        let (_, packet) = rosc::decoder::decode_udp(&buf[..len]).unwrap();
        assert_eq!(packet, OscPacket::Message(message));
    }
}
