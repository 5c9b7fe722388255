// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    crate::ctrl::{CtrlError, CtrlRequest},
    failure::{bail, Error},
    std::{io::Write, path::PathBuf},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    /// Verb followed by the arguments.
    Request,
    /// `status driver` asks for the driver status instead.
    Status,
    /// First argument is the verb.
    Raw,
    AllSta,
    ListSta,
    Help,
    HeParse,
    HeElements,
}

pub struct Command {
    pub name: &'static str,
    verb: &'static str,
    min_args: usize,
    kind: Kind,
    pub usage: &'static str,
}

macro_rules! cmd {
    ($name:expr, $verb:expr, $min_args:expr, $kind:ident, $usage:expr) => {
        Command { name: $name, verb: $verb, min_args: $min_args, kind: Kind::$kind, usage: $usage }
    };
}

#[rustfmt::skip]
pub const COMMANDS: &[Command] = &[
    cmd!("ping", "PING", 0, Request, "= pings the daemon"),
    cmd!("mib", "MIB", 0, Request, "= get MIB variables (dot1x, dot11, radius)"),
    cmd!("status", "STATUS", 0, Status, "[driver] = show interface status info"),
    cmd!("sta", "STA", 1, Request, "<addr> = get MIB variables for one station"),
    cmd!("all_sta", "STA-FIRST", 1, AllSta, "<bss> = get MIB variables for all stations of a bss"),
    cmd!("list_sta", "STA-FIRST", 0, ListSta, "= list all stations"),
    cmd!("new_sta", "NEW_STA", 1, Request, "<addr> = add a new station"),
    cmd!("deauthenticate", "DEAUTHENTICATE", 2, Request, "<bss> <addr> = deauthenticate a station"),
    cmd!("disassociate", "DISASSOCIATE", 2, Request, "<bss> <addr> = disassociate a station"),
    cmd!("get_config", "GET_CONFIG", 1, Request, "<bss> = show current configuration"),
    cmd!("set", "SET", 2, Request, "<name> <value> = set runtime variables"),
    cmd!("get", "GET", 1, Request, "<name> = get runtime info"),
    cmd!("reload", "RELOAD", 0, Request, "= reload configuration for current interface"),
    cmd!("enable", "ENABLE", 0, Request, "= enable the current interface"),
    cmd!("disable", "DISABLE", 0, Request, "= disable the current interface"),
    cmd!("update_beacon", "UPDATE_BEACON", 0, Request, "= update beacon"),
    cmd!("raw", "", 1, Raw, "<params..> = send unprocessed command"),
    cmd!("get_last_assoc_req", "GET_LAST_ASSOC_REQ", 1, Request,
         "<addr> = get last association request frame for a station"),
    cmd!("get_he_phy_channel_width_set", "GET_HE_PHY_CHANNEL_WIDTH_SET", 1, Request,
         "<addr> = get HE PHY channel width set of a station"),
    cmd!("get_sta_he_caps", "GET_STA_HE_CAPS", 1, Request, "<addr> = get HE capabilities of a station"),
    cmd!("increment_mu_edca_counter_and_reload", "UPDATE_EDCA_CNTR", 0, Request,
         "= reload configuration and increment the EDCA parameter set update counter"),
    cmd!("help", "", 0, Help, "[command] = show this usage help"),
    cmd!("he_parse", "", 1, HeParse, "<hex> = decode an HE capabilities element body offline"),
    cmd!("he_elements", "", 2, HeElements,
         "<iface.json> <hw_mode.json> = print the HE elements a configuration advertises"),
];

/// What to do for one command line.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Request(String),
    AllSta { bss: String },
    ListSta,
    Help(Option<String>),
    HeParse(String),
    HeElements { iface: PathBuf, hw_mode: PathBuf },
}

impl Action {
    /// Whether the action needs a connection to the daemon.
    pub fn is_online(&self) -> bool {
        match self {
            Action::Request(_) | Action::AllSta { .. } | Action::ListSta => true,
            Action::Help(_) | Action::HeParse(_) | Action::HeElements { .. } => false,
        }
    }
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|c| c.name == name)
}

fn join_request(verb: &str, args: &[String]) -> String {
    let mut request = verb.to_string();
    for arg in args {
        request.push(' ');
        request.push_str(arg);
    }
    request
}

pub fn parse_command(name: &str, args: &[String]) -> Result<Action, Error> {
    let cmd = match find_command(name) {
        Some(cmd) => cmd,
        None => bail!("Unknown command '{}'", name),
    };
    if args.len() < cmd.min_args {
        bail!(
            "Invalid {} command - at least {} argument{} required.",
            cmd.name,
            cmd.min_args,
            if cmd.min_args > 1 { "s are" } else { " is" }
        );
    }
    Ok(match cmd.kind {
        Kind::Request => Action::Request(join_request(cmd.verb, args)),
        Kind::Status if args.first().map(|a| a == "driver").unwrap_or(false) => {
            Action::Request("STATUS-DRIVER".to_string())
        }
        Kind::Status => Action::Request(cmd.verb.to_string()),
        Kind::Raw => Action::Request(join_request(&args[0], &args[1..])),
        Kind::AllSta => Action::AllSta { bss: args[0].clone() },
        Kind::ListSta => Action::ListSta,
        Kind::Help => Action::Help(args.first().cloned()),
        Kind::HeParse => Action::HeParse(args[0].clone()),
        Kind::HeElements => {
            Action::HeElements { iface: PathBuf::from(&args[0]), hw_mode: PathBuf::from(&args[1]) }
        }
    })
}

pub fn write_help<W: Write>(out: &mut W, name: Option<&str>) -> Result<(), Error> {
    for cmd in COMMANDS.iter().filter(|c| name.map(|n| n == c.name).unwrap_or(true)) {
        writeln!(out, "   {} {}", cmd.name, cmd.usage)?;
    }
    Ok(())
}

/// Sends `cmd` and returns the reply. Failures are reported on `out` and yield None.
fn request<C: CtrlRequest, W: Write>(
    conn: &mut C,
    cmd: &str,
    out: &mut W,
) -> Result<Option<String>, Error> {
    match conn.request(cmd) {
        Ok(reply) => Ok(Some(reply)),
        Err(CtrlError::Timeout) => {
            writeln!(out, "'{}' command timed out.", cmd)?;
            Ok(None)
        }
        Err(CtrlError::Io(e)) => {
            log::debug!("'{}' failed: {}", cmd, e);
            writeln!(out, "'{}' command failed.", cmd)?;
            Ok(None)
        }
    }
}

/// Station address on the first line of a STA reply. None once the daemon runs out of
/// stations.
fn sta_addr(reply: &str) -> Option<String> {
    if reply.starts_with("FAIL") {
        return None;
    }
    reply.lines().next().filter(|line| !line.is_empty()).map(|line| line.to_string())
}

/// Runs an online action. Returns false if the daemon could not be reached or timed out.
pub fn run_online<C: CtrlRequest, W: Write>(
    conn: &mut C,
    action: &Action,
    out: &mut W,
) -> Result<bool, Error> {
    match action {
        Action::Request(cmd) => match request(conn, cmd, out)? {
            Some(reply) => {
                write!(out, "{}", reply)?;
                Ok(true)
            }
            None => Ok(false),
        },
        Action::AllSta { bss } => {
            let mut cmd = format!("STA-FIRST {}", bss);
            loop {
                let reply = match request(conn, &cmd, out)? {
                    Some(reply) => reply,
                    None => return Ok(false),
                };
                let addr = match sta_addr(&reply) {
                    Some(addr) => addr,
                    None => return Ok(true),
                };
                write!(out, "{}", reply)?;
                cmd = format!("STA-NEXT {} {}", bss, addr);
            }
        }
        Action::ListSta => {
            let mut cmd = "STA-FIRST".to_string();
            loop {
                let reply = match request(conn, &cmd, out)? {
                    Some(reply) => reply,
                    None => return Ok(false),
                };
                let addr = match sta_addr(&reply) {
                    Some(addr) => addr,
                    None => return Ok(true),
                };
                writeln!(out, "{}", addr)?;
                cmd = format!("STA-NEXT {}", addr);
            }
        }
        _ => bail!("{:?} does not talk to the daemon", action),
    }
}
