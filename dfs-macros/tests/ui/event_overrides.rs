use dfs_domain::domain_event::DomainEvent;
use dfs_macros::event;

#[event]
pub enum TransferEvent {
    #[event(event_type = "transfer.requested")]
    Requested { amount: i64 },
    #[event(event_type = "transfer.settled", event_version = 3)]
    Settled { amount: i64 },
    AmountChanged { amount: i64 },
}

fn main() {
    let requested = TransferEvent::Requested { amount: 1 };
    assert_eq!(requested.event_type(), "transfer.requested");
    assert_eq!(requested.event_version(), 1);

    let settled = TransferEvent::Settled { amount: 1 };
    assert_eq!(settled.event_type(), TransferEvent::SETTLED);
    assert_eq!(settled.event_version(), 3);

    assert_eq!(TransferEvent::AMOUNT_CHANGED, "TransferEvent.AmountChanged");
}
