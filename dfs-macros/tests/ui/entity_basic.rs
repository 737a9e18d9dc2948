use dfs_domain::entity::Entity;
use dfs_macros::{entity, event};
use uuid::Uuid;

#[event]
pub enum AccountEvent {
    Opened,
}

#[entity(event = AccountEvent)]
struct Account {
    name: String,
}

#[entity(id = Uuid, event = AccountEvent, debug = false)]
#[derive(PartialEq)]
struct Ledger {
    entries: Vec<i64>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ledger(..)")
    }
}

mod archive {
    use dfs_macros::entity;

    #[entity(event = super::AccountEvent, name = "archive.Account")]
    pub struct Account {
        pub closed: bool,
    }
}

fn main() {
    let mut account = Account::new("a-1".to_string());
    account.name = "main".into();
    account.raise(AccountEvent::Opened);
    let _ = format!("{:?}", account);
    assert_eq!(account.id(), "a-1");
    assert_eq!(Account::TYPE, "Account");
    assert_eq!(archive::Account::TYPE, "archive.Account");
    assert!(!archive::Account::new("a-1".to_string()).closed);

    // 用户写的 PartialEq 派生被移除，由宏按 id 实现
    let id = Uuid::new_v4();
    let ledger = Ledger::new(id);
    let mut other = Ledger::new(id);
    other.entries.push(1);
    assert!(ledger == other);
    let _ = format!("{:?}", ledger);
}
