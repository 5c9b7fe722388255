// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    crate::{commands::Action, ctrl::CtrlConnection, logger::StderrLogger},
    failure::Error,
    std::{env, io, path::PathBuf, process, time::Duration},
    structopt::{clap::AppSettings, StructOpt},
};

mod commands;
mod ctrl;
mod logger;
mod offline;

static LOGGER: StderrLogger = StderrLogger;

#[derive(StructOpt, Debug)]
#[structopt(name = "hapctl", setting = AppSettings::TrailingVarArg)]
/// Sends control commands to the access point daemon and prints its replies.
struct Opt {
    /// Directory of the daemon's control sockets.
    #[structopt(
        short = "p",
        long = "ctrl-dir",
        default_value = "/var/run/hostapd",
        parse(from_os_str)
    )]
    ctrl_dir: PathBuf,

    /// Interface to talk to. Defaults to the first socket in the control directory.
    #[structopt(short = "i", long = "ifname")]
    ifname: Option<String>,

    /// Directory for the client socket.
    #[structopt(short = "s", long = "client-dir", parse(from_os_str))]
    client_dir: Option<PathBuf>,

    /// Seconds to wait for a reply.
    #[structopt(short = "t", long = "timeout", default_value = "10")]
    timeout_secs: u64,

    /// Increases log verbosity, may be repeated.
    #[structopt(short = "d", parse(from_occurrences))]
    verbosity: u8,

    #[structopt(name = "command")]
    command: String,

    #[structopt(name = "args")]
    args: Vec<String>,
}

fn main() {
    match main_res() {
        Ok(true) => (),
        Ok(false) => process::exit(1),
        Err(e) => {
            println!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn main_res() -> Result<bool, Error> {
    let opt = Opt::from_args();
    log::set_logger(&LOGGER)
        .map_err(|e| failure::format_err!("failed to install logger: {}", e))?;
    log::set_max_level(logger::level_filter(opt.verbosity));

    let action = commands::parse_command(&opt.command, &opt.args)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if !action.is_online() {
        return run_offline(&action, &mut out);
    }

    let ifname = match opt.ifname {
        Some(ifname) => ifname,
        None => ctrl::default_ifname(&opt.ctrl_dir)?,
    };
    let client_dir = opt.client_dir.unwrap_or_else(env::temp_dir);
    let mut conn = CtrlConnection::open(
        &opt.ctrl_dir.join(&ifname),
        &client_dir,
        Duration::from_secs(opt.timeout_secs),
    )?;
    log::info!("Selected interface '{}'", ifname);
    commands::run_online(&mut conn, &action, &mut out)
}

fn run_offline<W: io::Write>(action: &Action, out: &mut W) -> Result<bool, Error> {
    match action {
        Action::Help(name) => commands::write_help(out, name.as_ref().map(|n| n.as_str()))?,
        Action::HeParse(body_hex) => write!(out, "{}", offline::he_parse(body_hex)?)?,
        Action::HeElements { iface, hw_mode } => {
            write!(out, "{}", offline::he_elements(iface, hw_mode)?)?
        }
        _ => failure::bail!("{:?} needs a connection to the daemon", action),
    }
    Ok(true)
}
