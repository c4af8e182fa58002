//! Minimal HTTP/1.1 responder on a local socket for exercising the client.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Canned answer for a request target.
#[derive(Debug, Clone)]
pub struct Reply {
  pub status: u16,
  pub body: String,
  pub delay: Duration,
}

impl Reply {
  pub fn json(status: u16, body: impl ToString) -> Self {
    Self {
      status,
      body: body.to_string(),
      delay: Duration::ZERO,
    }
  }

  pub fn delayed(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }
}

type Router = Arc<dyn Fn(&str) -> Reply + Send + Sync>;

pub struct TestServer {
  pub base_url: String,
  hits: Arc<AtomicUsize>,
  requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
  /// Start a server answering every request through `route`, which gets
  /// the request target (path and query).
  pub async fn start<F>(route: F) -> Self
  where
    F: Fn(&str) -> Reply + Send + Sync + 'static,
  {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let route: Router = Arc::new(route);

    let hits_task = hits.clone();
    let requests_task = requests.clone();
    tokio::spawn(async move {
      loop {
        let Ok((mut socket, _)) = listener.accept().await else {
          break;
        };
        let route = route.clone();
        let hits = hits_task.clone();
        let requests = requests_task.clone();

        tokio::spawn(async move {
          let mut raw = Vec::new();
          let mut buf = [0u8; 1024];
          while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
              Ok(0) | Err(_) => return,
              Ok(n) => raw.extend_from_slice(&buf[..n]),
            }
          }
          let head = String::from_utf8_lossy(&raw).to_string();
          let target = head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or("/")
            .to_string();

          hits.fetch_add(1, Ordering::SeqCst);
          requests.lock().unwrap().push(head);

          let reply = route(&target);
          if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
          }

          let reason = reqwest::StatusCode::from_u16(reply.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown");
          let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            reply.status,
            reason,
            reply.body.len(),
            reply.body
          );
          let _ = socket.write_all(response.as_bytes()).await;
          let _ = socket.shutdown().await;
        });
      }
    });

    Self {
      base_url: format!("http://{}", addr),
      hits,
      requests,
    }
  }

  /// Number of requests received so far.
  pub fn hits(&self) -> usize {
    self.hits.load(Ordering::SeqCst)
  }

  /// Raw request heads received so far, in arrival order.
  pub fn requests(&self) -> Vec<String> {
    self.requests.lock().unwrap().clone()
  }

  /// Request target of the n-th request.
  pub fn target(&self, n: usize) -> Option<String> {
    self.requests().get(n).and_then(|head| {
      head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .map(String::from)
    })
  }
}

/// A base URL nothing is listening on.
pub async fn unreachable_base_url() -> String {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);
  format!("http://{}", addr)
}
