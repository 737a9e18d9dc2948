use dfs_application::command::Command;
use dfs_macros::command;

#[command]
enum AccountCommand {
    Open { name: String },
    #[command(command_type = "account.close")]
    Close(String),
}

#[command]
struct Ping;

fn main() {
    let open = AccountCommand::Open { name: "n".into() };
    assert_eq!(open.command_type(), AccountCommand::OPEN);
    assert_eq!(AccountCommand::Close("a".into()).command_type(), "account.close");
    assert_eq!(Ping.command_type(), "Ping");
    let _ = format!("{:?}", open);
}
