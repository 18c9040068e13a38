#![allow(dead_code)]

use std::cell::Cell;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use system_analyzer::app::{Decision, Settings, UnreachableMode};
use system_analyzer::config::Config;
use system_analyzer::error::{AnalyzerError, Result};
use system_analyzer::notify::{Notification, Notifier};
use system_analyzer::system::bandwidth::BandwidthClient;
use system_analyzer::system::snapshot::Bandwidth;

/// Minimal HTTP server answering every connection with `200 OK`.
pub fn spawn_http_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
    let addr = listener.local_addr().expect("local addr");
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
            );
        }
    });
    format!("http://{addr}")
}

/// Address of a port nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

pub struct CountingBandwidth {
    pub calls: Cell<usize>,
    pub result: Option<Bandwidth>,
}

impl CountingBandwidth {
    pub fn answering(download_mbps: f64, upload_mbps: f64) -> Self {
        CountingBandwidth {
            calls: Cell::new(0),
            result: Some(Bandwidth {
                download_mbps,
                upload_mbps,
            }),
        }
    }

    pub fn failing() -> Self {
        CountingBandwidth {
            calls: Cell::new(0),
            result: None,
        }
    }
}

impl BandwidthClient for CountingBandwidth {
    fn measure(&self) -> Result<Bandwidth> {
        self.calls.set(self.calls.get() + 1);
        self.result.ok_or_else(|| {
            AnalyzerError::invalid_output(
                "speedtest-cli",
                "Cannot retrieve speedtest configuration",
            )
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: std::cell::RefCell<Vec<Notification>>,
}

impl Notifier for RecordingNotifier {
    fn send(&self, notification: &Notification) {
        self.sent.borrow_mut().push(notification.clone());
    }
}

pub fn temp_output(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("system_analyzer_it_{}_{name}", std::process::id()))
        .join("results.json")
}

/// Non-interactive settings that never touch the package manager or the network
/// beyond the given target.
pub fn quiet_settings(target: Option<String>, output: PathBuf) -> Settings {
    let mut settings = Settings::from_config(&Config::default());
    settings.target = target;
    settings.latency_timeout = Duration::from_secs(3);
    settings.on_unreachable = UnreachableMode::Ask;
    settings.check_updates = false;
    settings.apply_updates = Decision::No;
    settings.speed_test = Decision::No;
    settings.output = output;
    settings.color = false;
    settings.notifications = false;
    settings
}
