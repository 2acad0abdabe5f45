#![allow(dead_code)]

use axum::Router;
use feed_scout::Config;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

/// Request counters shared between a test and its server
#[derive(Clone, Default)]
pub struct Counters {
    pub logins: Arc<AtomicUsize>,
    pub searches: Arc<AtomicUsize>,
}

impl Counters {
    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

/// Serves `app` on an ephemeral port and returns its base URL (with slash)
///
/// The server runs on its own runtime thread so tests can use the blocking
/// client directly.
pub fn start_server(app: Router) -> String {
    let (addr_tx, addr_rx) = mpsc::channel();

    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            addr_tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    let addr = addr_rx.recv().unwrap();
    format!("http://{}/", addr)
}

/// Log sink collecting formatted events in memory
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a debug-level subscriber on this thread, returning its logs
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let value = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();

    (value, logs)
}

/// Configuration with both sites enabled and pointed at `base_url`
pub fn config_for(base_url: &str) -> Config {
    let mut config = Config::default();

    config.torrentleech.enabled = true;
    config.torrentleech.base_url = base_url.to_string();
    config.torrentleech.username = "detective".to_string();
    config.torrentleech.password = "secret".to_string();

    config.torrentz.enabled = true;
    config.torrentz.base_url = base_url.to_string();
    config.torrentz.page_delay_ms = 10;

    config.http.request_timeout_secs = 5;
    config.http.login_timeout_secs = 5;

    config
}

pub const RESULT_PAGE: &str = r#"<html><body>
<table id="torrenttable">
  <tr>
    <td class="name"><span class="title"><a href="/torrent/1">Show.A.S03E07.720p</a></span></td>
    <td class="quickdownload">
      <a href="http://tracker.example/download/1/Show.A.S03E07.720p.torrent"><img></a>
    </td>
  </tr>
  <tr>
    <td class="name"><span class="title"><a href="/torrent/2">Show.A.S03E08.720p</a></span></td>
    <td class="quickdownload">
      <a href="http://tracker.example/download/2/Show.A.S03E08.720p.torrent"><img></a>
    </td>
  </tr>
</table>
</body></html>"#;
