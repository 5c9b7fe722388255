// Copyright 2019 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use {
    failure::{Error, Fail, ResultExt},
    log::{debug, trace},
    std::{
        fs, io,
        os::unix::net::UnixDatagram,
        path::{Path, PathBuf},
        process,
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    },
};

const REPLY_MAX_LEN: usize = 8192;

static CLIENT_COUNTER: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Fail)]
pub enum CtrlError {
    #[fail(display = "timed out")]
    Timeout,
    #[fail(display = "{}", _0)]
    Io(#[cause] io::Error),
}

impl From<io::Error> for CtrlError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => CtrlError::Timeout,
            _ => CtrlError::Io(e),
        }
    }
}

/// Sends one command and returns the daemon's reply.
pub trait CtrlRequest {
    fn request(&mut self, cmd: &str) -> Result<String, CtrlError>;
}

/// Datagram connection to the control socket of one interface.
pub struct CtrlConnection {
    sock: UnixDatagram,
    local_path: PathBuf,
}

impl CtrlConnection {
    pub fn open(ctrl_path: &Path, client_dir: &Path, timeout: Duration) -> Result<Self, Error> {
        let local_path = client_dir.join(format!(
            "hapctl_{}-{}",
            process::id(),
            CLIENT_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        // A stale socket from an earlier run with the same pid would make bind fail.
        let _ = fs::remove_file(&local_path);
        let sock = UnixDatagram::bind(&local_path)
            .with_context(|_| format!("failed to bind {}", local_path.display()))?;
        let conn = CtrlConnection { sock, local_path };
        conn.sock
            .connect(ctrl_path)
            .with_context(|_| format!("failed to connect to {}", ctrl_path.display()))?;
        conn.sock.set_read_timeout(Some(timeout)).context("failed to set reply timeout")?;
        debug!("Connected {} to {}", conn.local_path.display(), ctrl_path.display());
        Ok(conn)
    }
}

impl CtrlRequest for CtrlConnection {
    fn request(&mut self, cmd: &str) -> Result<String, CtrlError> {
        trace!("> {}", cmd);
        self.sock.send(cmd.as_bytes())?;
        let mut buf = vec![0u8; REPLY_MAX_LEN];
        loop {
            let n = self.sock.recv(&mut buf[..])?;
            let reply = String::from_utf8_lossy(&buf[..n]).into_owned();
            // Unsolicited events look like "<3>AP-STA-CONNECTED ...".
            if reply.starts_with('<') {
                debug!("Skipping event {}", reply.trim_end());
                continue;
            }
            trace!("< {}", reply.trim_end());
            return Ok(reply);
        }
    }
}

impl Drop for CtrlConnection {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.local_path) {
            debug!("Failed to remove {}: {}", self.local_path.display(), e);
        }
    }
}

/// First interface socket in `ctrl_dir`, in name order.
pub fn default_ifname(ctrl_dir: &Path) -> Result<String, Error> {
    let mut names = fs::read_dir(ctrl_dir)
        .with_context(|_| format!("failed to read {}", ctrl_dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.'))
        .collect::<Vec<_>>();
    names.sort();
    names
        .into_iter()
        .next()
        .ok_or_else(|| failure::format_err!("no interfaces in {}", ctrl_dir.display()))
}

#[cfg(test)]
mod tests {
    use {super::*, std::thread};

    fn fake_daemon(dir: &Path, replies: Vec<&'static str>) -> thread::JoinHandle<Vec<String>> {
        let server = UnixDatagram::bind(dir.join("wlan0")).expect("bind daemon socket");
        thread::spawn(move || {
            let mut buf = [0u8; 256];
            let (n, client) = server.recv_from(&mut buf[..]).expect("receive command");
            let client = client.as_pathname().expect("client address").to_path_buf();
            for reply in replies {
                server.send_to(reply.as_bytes(), &client).expect("send reply");
            }
            vec![String::from_utf8_lossy(&buf[..n]).into_owned()]
        })
    }

    #[test]
    fn request_skips_events() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let daemon = fake_daemon(dir.path(), vec!["<3>AP-STA-CONNECTED 02:00:00:00:00:01", "PONG\n"]);
        let mut conn = CtrlConnection::open(&dir.path().join("wlan0"), dir.path(), Duration::from_secs(5))
            .expect("open connection");
        assert_eq!("PONG\n", conn.request("PING").expect("reply"));
        assert_eq!(vec!["PING".to_string()], daemon.join().expect("daemon thread"));
    }

    #[test]
    fn request_times_out() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let _server = UnixDatagram::bind(dir.path().join("wlan0")).expect("bind daemon socket");
        let mut conn =
            CtrlConnection::open(&dir.path().join("wlan0"), dir.path(), Duration::from_millis(50))
                .expect("open connection");
        match conn.request("PING") {
            Err(CtrlError::Timeout) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn client_socket_removed_on_drop() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let _server = UnixDatagram::bind(dir.path().join("wlan0")).expect("bind daemon socket");
        let client_dir = tempfile::tempdir().expect("create temp dir");
        let conn = CtrlConnection::open(
            &dir.path().join("wlan0"),
            client_dir.path(),
            Duration::from_secs(1),
        )
        .expect("open connection");
        assert_eq!(1, fs::read_dir(client_dir.path()).expect("read dir").count());
        drop(conn);
        assert_eq!(0, fs::read_dir(client_dir.path()).expect("read dir").count());
    }

    #[test]
    fn connect_to_missing_daemon_fails() {
        let dir = tempfile::tempdir().expect("create temp dir");
        assert!(CtrlConnection::open(&dir.path().join("wlan0"), dir.path(), Duration::from_secs(1))
            .is_err());
    }

    #[test]
    fn first_interface_by_name() {
        let dir = tempfile::tempdir().expect("create temp dir");
        for name in &["wlan2", "wlan0", ".hidden"] {
            fs::write(dir.path().join(name), b"").expect("create file");
        }
        assert_eq!("wlan0", default_ifname(dir.path()).expect("interface"));

        let empty = tempfile::tempdir().expect("create temp dir");
        assert!(default_ifname(empty.path()).is_err());
    }
}
