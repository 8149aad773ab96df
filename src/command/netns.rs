//! Link activation and namespace-handle commands.

use super::{quote_arg, Command};

/// Runtime directory `ip netns` looks for named namespace handles in
pub const NETNS_DIR: &str = "/var/run/netns";

/// `ip link set <link> up` in the host namespace
pub fn host_link_up(link: &str) -> Command {
    Command::new("ip").args(["link", "set", link, "up"])
}

/// `ip netns exec <netns> ip link set <link> up`
pub fn netns_link_up(netns: &str, link: &str) -> Command {
    Command::new("ip").args(["netns", "exec", netns, "ip", "link", "set", link, "up"])
}

/// `ip netns exec <netns> ip link set <link> address <addr>`
pub fn netns_link_address(netns: &str, link: &str, addr: &str) -> Command {
    Command::new("ip").args(["netns", "exec", netns, "ip", "link", "set", link, "address", addr])
}

/// `ip netns del <netns>`
pub fn netns_delete(netns: &str) -> Command {
    Command::new("ip").args(["netns", "del", netns])
}

/// Path of the namespace handle of `name`
pub fn netns_handle(name: &str) -> String {
    format!("{}/{}", NETNS_DIR, name)
}

/// Capture the pid of a running container into the shell variable `PID`
pub fn container_pid(container: &str) -> Command {
    Command::shell(format!(
        "PID=`docker inspect {} --format '{{{{.State.Pid}}}}'`",
        quote_arg(container)
    ))
}

/// Expose the network namespace of a running container as a named
/// `ip netns` handle.
///
/// The three commands form one block: the symlink reads `$PID` set by the
/// line before it, so they must run in order in the same shell.
pub fn mount_container_netns(container: &str) -> Vec<Command> {
    vec![
        Command::new("mkdir").args(["-p", NETNS_DIR]),
        container_pid(container),
        Command::shell(format!(
            "ln -s /proc/$PID/ns/net {}",
            quote_arg(&netns_handle(container))
        )),
    ]
}

/// Remove a stale namespace handle, whatever created it
pub fn remove_netns_handle(name: &str) -> Command {
    Command::new("rm").args(["-rf".to_string(), netns_handle(name)])
}

/// `ip netns list`
pub fn netns_list() -> Command {
    Command::new("ip").args(["netns", "list"])
}
