use std::fmt::{self, Write};

use super::types::ClientCommand;

/// Write a command with a single middle parameter.
fn write_cmd(f: &mut fmt::Formatter<'_>, cmd: &str, arg: &str) -> fmt::Result {
    f.write_str(cmd)?;
    f.write_char(' ')?;
    f.write_str(arg)
}

/// Write a command whose last argument is always colon-prefixed.
fn write_cmd_freeform(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    match args.split_last() {
        Some((suffix, middle)) => {
            f.write_str(cmd)?;
            for arg in middle {
                f.write_char(' ')?;
                f.write_str(arg)?;
            }
            f.write_str(" :")?;
            f.write_str(suffix)
        }
        None => f.write_str(cmd),
    }
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientCommand::Pass(p) => write_cmd(f, "PASS", p),
            ClientCommand::Nick(n) => write_cmd(f, "NICK", n),
            ClientCommand::CapReq(cap) => write_cmd_freeform(f, "CAP", &["REQ", cap.as_ref()]),
            ClientCommand::Join(c) => write_cmd(f, "JOIN", c),
            ClientCommand::Part(c) => write_cmd(f, "PART", c),
            ClientCommand::Pong(s) => write_cmd(f, "PONG", s),
            ClientCommand::Privmsg { channel, text } => {
                write_cmd_freeform(f, "PRIVMSG", &[channel.as_str(), text.as_str()])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::caps::Capability;
    use crate::command::ClientCommand;

    #[test]
    fn test_handshake_wire_forms() {
        assert_eq!(
            ClientCommand::Pass("oauth:abc".into()).to_string(),
            "PASS oauth:abc"
        );
        assert_eq!(ClientCommand::Nick("bot".into()).to_string(), "NICK bot");
        assert_eq!(
            ClientCommand::CapReq(Capability::Membership).to_string(),
            "CAP REQ :twitch.tv/membership"
        );
        assert_eq!(ClientCommand::Join("#chan".into()).to_string(), "JOIN #chan");
    }

    #[test]
    fn test_pong_echoes_server_verbatim() {
        assert_eq!(
            ClientCommand::pong(":tmi.twitch.tv").to_string(),
            "PONG :tmi.twitch.tv"
        );
    }

    #[test]
    fn test_constructors_cut_at_nul() {
        assert_eq!(ClientCommand::pong(":tmi\0x").to_string(), "PONG :tmi");
        assert_eq!(
            ClientCommand::privmsg("#chan", "hi\0there").to_string(),
            "PRIVMSG #chan :hi"
        );
    }

    #[test]
    fn test_privmsg_always_has_colon() {
        assert_eq!(
            ClientCommand::privmsg("#chan", "hi").to_string(),
            "PRIVMSG #chan :hi"
        );
        assert_eq!(
            ClientCommand::privmsg("#chan", "").to_string(),
            "PRIVMSG #chan :"
        );
    }

    #[test]
    fn test_privmsg_cannot_inject_commands() {
        let cmd = ClientCommand::privmsg("#chan", "hi\r\nPART #chan");
        assert_eq!(cmd.to_string(), "PRIVMSG #chan :hi");
    }

    #[test]
    fn test_pass_is_sensitive() {
        assert!(ClientCommand::Pass("oauth:x".into()).is_sensitive());
        assert!(!ClientCommand::Nick("bot".into()).is_sensitive());
        assert_eq!(ClientCommand::Part("#c".into()).name(), "PART");
    }
}
