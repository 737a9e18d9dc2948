use dfs_domain::domain_event::DomainEvent;
use dfs_macros::event;

#[event(version = 2)]
enum BankEvent {
    Opened { name: String },
    Renamed(String),
    Closed,
}

#[event]
struct Audited {
    by: String,
}

fn main() {
    let opened = BankEvent::Opened { name: "n".into() };
    assert_eq!(opened.event_type(), "BankEvent.Opened");
    assert_eq!(opened.event_version(), 2);
    assert_eq!(BankEvent::RENAMED, "BankEvent.Renamed");
    assert_eq!(BankEvent::Closed.event_type(), BankEvent::CLOSED);
    assert_eq!(opened.clone(), opened);

    let audited = Audited { by: "system".into() };
    assert_eq!(audited.event_type(), Audited::NAME);
    assert_eq!(audited.event_version(), 1);
}
