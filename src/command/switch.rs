//! Bridge commands.

use super::netns::host_link_up;
use super::Command;

/// Add a bridge device and bring it up
pub fn create_switch(name: &str) -> Vec<Command> {
    vec![
        Command::new("ip").args(["link", "add", name, "type", "bridge"]),
        host_link_up(name),
    ]
}

/// `ip link set dev <link> master <bridge>`
pub fn attach_to_switch(link: &str, bridge: &str) -> Command {
    Command::new("ip").args(["link", "set", "dev", link, "master", bridge])
}

/// `ip link delete <bridge>`
pub fn delete_switch(name: &str) -> Command {
    Command::new("ip").args(["link", "delete", name])
}
