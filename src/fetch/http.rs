use std::time::Duration;

use log::trace;
use reqwest::blocking::Client;

use super::Fetcher;
use crate::{config, core::StreamResult};

/// Blocking HTTP fetcher
///
/// Must not be called from inside an async task; run it through
/// `subscribe_on` with an [`IoScheduler`](crate::scheduler::IoScheduler).
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

/// Request timeout used when the config leaves `timeout_secs` unset
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

impl HttpFetcher {
    pub fn new(config: &config::Fetch) -> StreamResult<Self> {
        let timeout = config
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> StreamResult<String> {
        let response = self.client.get(url).send()?.error_for_status()?;
        trace!("{url} responded {}", response.status());
        Ok(response.text()?)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufRead, BufReader, Write},
        net::TcpListener,
        thread,
        time::Instant,
    };

    use super::*;
    use crate::{
        core::{
            testing::{error_of, init_log, is_completed, recorder, values},
            StreamError,
        },
        fetch::deferred_fetch,
    };

    /// One-shot HTTP server answering a single request with `status` and `body`.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            loop {
                line.clear();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\n\
                 Content-Type: text/plain; charset=utf-8\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        format!("http://{addr}/")
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&config::Fetch {
            timeout_secs: Some(5),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_fetch_body() {
        init_log();
        let url = serve_once("200 OK", "hello world");
        assert_eq!(fetcher().fetch(&url).unwrap(), "hello world");
    }

    #[test]
    fn test_deferred_fetch_over_http() {
        let url = serve_once("200 OK", "<html>rx</html>");

        let (observer, events) = recorder();
        deferred_fetch(fetcher(), url).subscribe(observer);

        let events = events.snapshot();
        assert_eq!(values(&events), vec!["15".to_string()]);
        assert!(is_completed(&events));
    }

    #[test]
    fn test_error_status_is_an_error() {
        let url = serve_once("503 Service Unavailable", "busy");
        assert!(matches!(fetcher().fetch(&url), Err(StreamError::Http(_))));
    }

    #[test]
    fn test_unset_timeout_falls_back_to_default() {
        let defaults = HttpFetcher::new(&config::Fetch::default()).unwrap();
        assert_eq!(defaults.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(fetcher().timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_stalled_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        thread::spawn(move || {
            // Accept and hold the connection without answering.
            let _held = listener.accept().unwrap();
            let _ = release_rx.recv();
        });

        let fetcher = HttpFetcher::new(&config::Fetch {
            timeout_secs: Some(1),
            ..Default::default()
        })
        .unwrap();
        let started = Instant::now();
        let result = fetcher.fetch(&format!("http://{addr}/"));

        assert!(matches!(result, Err(StreamError::Http(_))));
        assert!(started.elapsed() < Duration::from_secs(10));
        let _ = release_tx.send(());
    }

    #[test]
    fn test_unreachable_endpoint_yields_error_only() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let (observer, events) = recorder();
        deferred_fetch(fetcher(), format!("http://{addr}/")).subscribe(observer);

        let events = events.snapshot();
        assert!(values(&events).is_empty());
        assert!(!is_completed(&events));
        assert!(matches!(error_of(&events), Some(StreamError::Http(_))));
    }
}
