use dfs_domain::entity::{AggregateRoot, Entity};
use dfs_macros::{aggregate_root, event};

#[event]
enum OrderEvent {
    Placed { total: u64 },
}

#[aggregate_root(event = OrderEvent)]
struct Order {
    total: u64,
}

fn assert_root<T: AggregateRoot>(_: &T) {}

fn main() {
    let order = Order::new("o-1".to_string());
    assert_root(&order);
    assert!(order.events().is_empty());
}
